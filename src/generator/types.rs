use crate::model::{Board, DayOffsets, LeaveRequest, Role, Shift, Staff};
use crate::rules::ConstraintRules;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contrôles optionnels après génération.
///
/// Par défaut seuls les congés sont revérifiés ; le plafond de jours travaillés
/// et la couverture par slot restent des consignes du prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Nombre maximal de jours distincts travaillés par personne sur la semaine.
    pub max_workdays: Option<u8>,
    /// Écarte les shifts au-delà de `required_agents` pour un même slot.
    pub enforce_coverage: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("completion service unreachable: {0}")]
    Unreachable(String),
    #[error("completion service answered with status {0}")]
    Status(u16),
    #[error("completion service returned no text")]
    EmptyCompletion,
    #[error("no JSON object found in the completion")]
    NoJsonObject,
    #[error("malformed completion: {0}")]
    Malformed(String),
    #[error("generation request failed: {0}")]
    Transport(String),
}

impl GenerationError {
    /// Erreurs de l'orchestration (remontées en `success: false`).
    pub fn is_transport(&self) -> bool {
        matches!(self, GenerationError::Transport(_))
    }
}

/// Tout ce que le générateur lit ; emprunté au `Board` de l'appelant.
#[derive(Debug, Clone)]
pub struct GenerationInput<'a> {
    pub staff: &'a [Staff],
    pub roles: &'a [Role],
    /// Shifts de toute la semaine, pour le décompte des jours travaillés.
    pub existing: &'a [Shift],
    pub days: DayOffsets,
    pub leave_requests: &'a [LeaveRequest],
    /// Dimanche de la semaine (offset 0).
    pub week_start: NaiveDate,
    pub rules: ConstraintRules,
}

impl<'a> GenerationInput<'a> {
    pub fn from_board(
        board: &'a Board,
        days: DayOffsets,
        week_start: NaiveDate,
        rules: ConstraintRules,
    ) -> Self {
        Self {
            staff: &board.staff,
            roles: &board.roles,
            existing: board.shifts.as_slice(),
            days,
            leave_requests: &board.leave_requests,
            week_start,
            rules,
        }
    }
}

/// Résultat d'une génération : toujours « réussi » dans sa forme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSchedule {
    pub schedule: Vec<Shift>,
    pub reasoning: String,
    /// Entrées écartées (invalides, références inconnues, congés, plafonds).
    #[serde(default)]
    pub rejected_count: usize,
    /// Vrai quand la génération a échoué et que `reasoning` l'explique.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

impl GeneratedSchedule {
    pub fn degraded(err: &GenerationError) -> Self {
        Self {
            schedule: Vec::new(),
            reasoning: format!(
                "The schedule could not be generated ({err}). Existing shifts were left unchanged; please try again."
            ),
            rejected_count: 0,
            degraded: true,
        }
    }
}
