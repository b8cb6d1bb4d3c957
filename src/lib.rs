#![forbid(unsafe_code)]
//! Permanence : planification des permanences d'une équipe support.
//!
//! - Modèle hebdomadaire : shifts par (jour, rôle, fenêtre), jours 0 = dimanche.
//! - Édition par gestes (assigner, remplacer, échanger, déplacer, supprimer).
//! - Génération déléguée à un service de complétion externe, sortie revalidée
//!   contre les congés approuvés et les références connues.
//! - Stockage fichier (JSON), import/export CSV.

pub mod edit;
pub mod generator;
pub mod io;
pub mod leave;
pub mod model;
pub mod rules;
pub mod session;
pub mod storage;
pub mod store;

pub use edit::{DragSubject, DropTarget, EditEngine, EditOutcome, EditState, NoOpReason};
pub use generator::{
    CannedCompletion, CompletionClient, GeneratedSchedule, GenerationError, GenerationInput,
    OutputValidator, ScheduleGenerator, ValidatorOptions,
};
pub use leave::{is_on_leave, unavailable_days, Unavailability};
pub use model::{
    Board, DayOffsets, LeaveId, LeaveKind, LeaveRequest, LeaveStatus, Role, RoleId, Shift,
    ShiftId, ShiftWindow, Slot, Staff, StaffId,
};
pub use rules::{ConstraintRules, DEFAULT_RULES};
pub use session::{GenerationRequest, GenerationResponse, RequestState, Session};
pub use storage::{JsonStorage, Storage};
pub use store::{MergeReport, ScheduleStore};
