use super::{GenerationInput, ValidatorOptions};
use crate::leave::is_on_leave;
use crate::model::{LeaveRequest, Shift, Slot, StaffId};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Shifts acceptés et nombre d'entrées écartées.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub accepted: Vec<Shift>,
    pub rejected_count: usize,
}

/// Écarte tout shift posé sur une date couverte par un congé approuvé de la
/// personne. Les entrées écartées ne sont ni réparées ni remontées en erreur.
pub fn validate(
    schedule: Vec<Shift>,
    leave_requests: &[LeaveRequest],
    week_start: NaiveDate,
) -> Validation {
    let mut out = Validation::default();
    for shift in schedule {
        let blocked = match shift.date(week_start) {
            Some(date) => is_on_leave(&shift.staff_id, date, leave_requests),
            None => true,
        };
        if blocked {
            debug!(staff = %shift.staff_id, day = shift.day, "shift dropped: approved leave");
            out.rejected_count += 1;
        } else {
            out.accepted.push(shift);
        }
    }
    out
}

/// Second niveau de contrôle des sorties du générateur.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputValidator {
    options: ValidatorOptions,
}

impl OutputValidator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    pub fn check(&self, schedule: Vec<Shift>, input: &GenerationInput<'_>) -> Validation {
        let mut validation = validate(schedule, input.leave_requests, input.week_start);

        if let Some(max) = self.options.max_workdays {
            let dropped = cap_workdays(&mut validation.accepted, input, max);
            validation.rejected_count += dropped;
        }
        if self.options.enforce_coverage {
            let dropped = cap_coverage(&mut validation.accepted, input);
            validation.rejected_count += dropped;
        }

        if validation.rejected_count > 0 {
            warn!(
                rejected = validation.rejected_count,
                accepted = validation.accepted.len(),
                "generated schedule trimmed by validation"
            );
        }
        validation
    }
}

/// Plafond de jours distincts, shifts conservés (hors jours régénérés) inclus.
fn cap_workdays(accepted: &mut Vec<Shift>, input: &GenerationInput<'_>, max: u8) -> usize {
    let mut worked: HashMap<StaffId, BTreeSet<u8>> = HashMap::new();
    for shift in input.existing.iter().filter(|s| !input.days.contains(s.day)) {
        worked
            .entry(shift.staff_id.clone())
            .or_default()
            .insert(shift.day);
    }

    let before = accepted.len();
    accepted.retain(|shift| {
        let days = worked.entry(shift.staff_id.clone()).or_default();
        if days.contains(&shift.day) || days.len() < usize::from(max) {
            days.insert(shift.day);
            true
        } else {
            debug!(staff = %shift.staff_id, day = shift.day, "shift dropped: workday cap");
            false
        }
    });
    before - accepted.len()
}

/// Au plus `required_agents` shifts générés par slot.
fn cap_coverage(accepted: &mut Vec<Shift>, input: &GenerationInput<'_>) -> usize {
    let mut filled: HashMap<Slot, u32> = HashMap::new();
    let before = accepted.len();
    accepted.retain(|shift| {
        let required = input
            .roles
            .iter()
            .find(|r| r.id == shift.role_id)
            .map_or(0, |r| r.required_agents);
        let count = filled.entry(shift.slot()).or_insert(0);
        if *count < required {
            *count += 1;
            true
        } else {
            debug!(role = %shift.role_id, day = shift.day, "shift dropped: slot already covered");
            false
        }
    });
    before - accepted.len()
}
