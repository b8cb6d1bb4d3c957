mod client;
mod parse;
mod prompt;
mod types;
mod validate;

#[cfg(feature = "http")]
pub use client::{HttpClientConfig, HttpCompletionClient};
pub use client::{CannedCompletion, CompletionClient};
pub use parse::{extract_json_object, parse_completion, ParsedCompletion};
pub use prompt::build_prompt;
pub use types::{GeneratedSchedule, GenerationError, GenerationInput, ValidatorOptions};
pub use validate::{validate, OutputValidator, Validation};

use tracing::{info, warn};

/// Générateur : prompt → complétion externe → lecture non fiable → validation.
#[derive(Debug, Clone)]
pub struct ScheduleGenerator<C> {
    client: C,
    validator: OutputValidator,
}

impl<C: CompletionClient> ScheduleGenerator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            validator: OutputValidator::default(),
        }
    }

    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.validator = OutputValidator::new(options);
        self
    }

    /// Ne lève jamais : un échec devient un planning vide expliqué dans `reasoning`.
    pub async fn generate(&self, input: &GenerationInput<'_>) -> GeneratedSchedule {
        match self.try_generate(input).await {
            Ok(schedule) => schedule,
            Err(err) => {
                warn!(error = %err, "schedule generation degraded");
                GeneratedSchedule::degraded(&err)
            }
        }
    }

    async fn try_generate(
        &self,
        input: &GenerationInput<'_>,
    ) -> Result<GeneratedSchedule, GenerationError> {
        let prompt = build_prompt(input);
        info!(
            staff = input.staff.len(),
            roles = input.roles.len(),
            days = input.days.len(),
            existing = input.existing.len(),
            custom_rules = input.rules.is_custom(),
            "requesting schedule generation"
        );

        let text = self.client.complete(&prompt).await?;
        let parsed = parse_completion(&text, input.staff, input.roles)?;
        let validation = self.validator.check(parsed.shifts, input);

        info!(
            accepted = validation.accepted.len(),
            rejected = parsed.rejected + validation.rejected_count,
            "schedule generated"
        );
        Ok(GeneratedSchedule {
            schedule: validation.accepted,
            reasoning: parsed.reasoning,
            rejected_count: parsed.rejected + validation.rejected_count,
            degraded: false,
        })
    }
}
