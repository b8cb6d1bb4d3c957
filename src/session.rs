//! Orchestration autour du cœur : possède le `Board`, applique les gestes et
//! fusionne les plannings générés.
//!
//! Le store n'impose aucune exclusion mutuelle : deux générations qui se
//! chevauchent sur les mêmes jours se résolvent en « dernière écriture gagne ».
//! Seul `RequestState` refuse un déclenchement pendant qu'un appel est en cours.

use crate::edit::{DragSubject, DropTarget, EditEngine, EditOutcome};
use crate::generator::{
    CompletionClient, GeneratedSchedule, GenerationError, GenerationInput, ScheduleGenerator,
};
use crate::model::{Board, DayOffsets};
use crate::rules::ConstraintRules;
use crate::store::MergeReport;
use chrono::NaiveDate;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

/// Cycle de vie d'une demande de génération, indépendant de toute UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

impl RequestState {
    /// Le déclencheur est désactivé tant qu'un appel est en cours.
    pub fn can_trigger(&self) -> bool {
        !matches!(self, RequestState::Pending)
    }

    pub fn begin(&mut self) -> Result<(), GenerationError> {
        if !self.can_trigger() {
            return Err(GenerationError::Transport(
                "a generation request is already pending".to_string(),
            ));
        }
        *self = RequestState::Pending;
        Ok(())
    }

    pub fn succeed(&mut self) {
        *self = RequestState::Succeeded;
    }

    pub fn fail<S: Into<String>>(&mut self, message: S) {
        *self = RequestState::Failed(message.into());
    }
}

/// Demande en cours : sort de `Pending` même si le futur est abandonné
/// (`tokio::time::timeout`, `select!`).
struct PendingRequest<'a> {
    state: &'a mut RequestState,
    settled: bool,
}

impl<'a> PendingRequest<'a> {
    fn begin(state: &'a mut RequestState) -> Result<Self, GenerationError> {
        state.begin()?;
        Ok(Self {
            state,
            settled: false,
        })
    }

    fn succeed(mut self) {
        self.state.succeed();
        self.settled = true;
    }

    fn fail(mut self, message: String) {
        self.state.fail(message);
        self.settled = true;
    }
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("schedule generation cancelled before completion");
            self.state.fail("generation cancelled");
        }
    }
}

/// Paramètres d'une génération demandée par l'opérateur.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub days: DayOffsets,
    pub week_start: NaiveDate,
    pub rules: ConstraintRules,
}

impl GenerationRequest {
    /// Semaine complète, règles par défaut.
    pub fn full_week(week_start: NaiveDate) -> Self {
        Self {
            days: DayOffsets::full_week(),
            week_start,
            rules: ConstraintRules::Default,
        }
    }
}

/// Résultat remonté à l'appelant : `{success, data?, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<GeneratedSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Effet de la fusion sur le store (absent si rien n'a été fusionné).
    #[serde(skip)]
    pub merge: Option<MergeReport>,
}

impl GenerationResponse {
    fn failure(err: &GenerationError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(format!("Failed to generate schedule: {err}. Please try again.")),
            merge: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    board: Board,
    engine: EditEngine,
    request: RequestState,
}

impl Session {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            engine: EditEngine::new(),
            request: RequestState::Idle,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn request_state(&self) -> &RequestState {
        &self.request
    }

    pub fn edit_engine(&self) -> &EditEngine {
        &self.engine
    }

    /// Applique un geste complet au store du board.
    pub fn drag(&mut self, subject: DragSubject, target: DropTarget) -> EditOutcome {
        self.engine.apply(subject, target, &mut self.board.shifts)
    }

    /// Génère puis fusionne les jours demandés.
    ///
    /// Un résultat dégradé laisse le store intact ; seules les défaillances de
    /// l'orchestration (demande déjà en cours, panique pendant l'appel) donnent
    /// `success: false`. Un appel abandonné laisse `RequestState::Failed`.
    pub async fn generate<C: CompletionClient>(
        &mut self,
        generator: &ScheduleGenerator<C>,
        request: GenerationRequest,
    ) -> GenerationResponse {
        let pending = match PendingRequest::begin(&mut self.request) {
            Ok(pending) => pending,
            Err(err) => return GenerationResponse::failure(&err),
        };

        let days = request.days.clone();
        let outcome = {
            let input = GenerationInput::from_board(
                &self.board,
                request.days,
                request.week_start,
                request.rules,
            );
            AssertUnwindSafe(generator.generate(&input))
                .catch_unwind()
                .await
        };

        match outcome {
            Ok(generated) => {
                let merge = (!generated.degraded)
                    .then(|| self.board.shifts.replace_days(&days, generated.schedule.clone()));
                if let Some(report) = &merge {
                    info!(
                        removed = report.removed,
                        inserted = report.inserted,
                        discarded = report.discarded,
                        "generated schedule merged"
                    );
                }
                pending.succeed();
                GenerationResponse {
                    success: true,
                    data: Some(generated),
                    error: None,
                    merge,
                }
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "generation task panicked".to_string());
                error!(%message, "schedule generation aborted");
                let err = GenerationError::Transport(message);
                pending.fail(err.to_string());
                GenerationResponse::failure(&err)
            }
        }
    }
}
