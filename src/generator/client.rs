use super::GenerationError;
use async_trait::async_trait;

/// Capacité de complétion de texte : un prompt en entrée, un texte brut en sortie.
///
/// Les implémentations doivent être `Send + Sync` ; aucune réponse partielle
/// n'est consommée.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Box<T> {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).complete(prompt).await
    }
}

#[async_trait]
impl<'a, T: CompletionClient + ?Sized> CompletionClient for &'a T {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).complete(prompt).await
    }
}

/// Réponse figée, rejouée à chaque appel (fichier enregistré, tests).
#[derive(Debug, Clone)]
pub struct CannedCompletion {
    text: String,
}

impl CannedCompletion {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl CompletionClient for CannedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        if self.text.trim().is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }
        Ok(self.text.clone())
    }
}

#[cfg(feature = "http")]
pub use http::{HttpClientConfig, HttpCompletionClient};

#[cfg(feature = "http")]
mod http {
    use super::{CompletionClient, GenerationError};
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;
    use tracing::debug;

    #[derive(Debug, Clone)]
    pub struct HttpClientConfig {
        pub endpoint: String,
        pub api_key: Option<String>,
        /// Aucun délai par défaut : un appel bloqué bloque l'appelant.
        pub timeout: Option<Duration>,
    }

    impl HttpClientConfig {
        pub fn new<S: Into<String>>(endpoint: S) -> Self {
            Self {
                endpoint: endpoint.into(),
                api_key: None,
                timeout: None,
            }
        }
    }

    /// Client HTTP : `POST {"prompt": ...}`, réponse JSON avec un champ `text`.
    #[derive(Debug, Clone)]
    pub struct HttpCompletionClient {
        client: reqwest::Client,
        config: HttpClientConfig,
    }

    #[derive(Serialize)]
    struct CompletionRequest<'a> {
        prompt: &'a str,
    }

    #[derive(Deserialize)]
    struct CompletionBody {
        #[serde(default)]
        text: Option<String>,
    }

    impl HttpCompletionClient {
        pub fn new(config: HttpClientConfig) -> Result<Self, GenerationError> {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = config.timeout {
                builder = builder.timeout(timeout);
            }
            let client = builder
                .build()
                .map_err(|e| GenerationError::Transport(e.to_string()))?;
            Ok(Self { client, config })
        }
    }

    #[async_trait]
    impl CompletionClient for HttpCompletionClient {
        async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
            let mut request = self
                .client
                .post(&self.config.endpoint)
                .json(&CompletionRequest { prompt });
            if let Some(key) = &self.config.api_key {
                request = request.bearer_auth(key);
            }

            let response = request
                .send()
                .await
                .map_err(|e| GenerationError::Unreachable(e.to_string()))?;
            let status = response.status();
            debug!(status = status.as_u16(), "completion response received");
            if !status.is_success() {
                return Err(GenerationError::Status(status.as_u16()));
            }

            let body: CompletionBody = response
                .json()
                .await
                .map_err(|e| GenerationError::Malformed(e.to_string()))?;
            body.text
                .filter(|text| !text.trim().is_empty())
                .ok_or(GenerationError::EmptyCompletion)
        }
    }
}
