//! Disponibilité dérivée des congés approuvés.

use crate::model::{offset_date, DayOffsets, LeaveRequest, Staff, StaffId};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Jours bloqués par des congés pour une personne, sur une semaine donnée.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unavailability {
    pub blocked: BTreeSet<u8>,
    /// Texte lisible (type de congé + jours), destiné uniquement au prompt.
    pub explanation: Option<String>,
}

impl Unavailability {
    pub fn is_blocked(&self, day: u8) -> bool {
        self.blocked.contains(&day)
    }

    /// Vrai si tous les jours demandés sont bloqués.
    pub fn covers_all(&self, days: &DayOffsets) -> bool {
        days.iter().all(|d| self.blocked.contains(&d))
    }
}

fn approved_for<'a>(
    staff_id: &'a StaffId,
    leave_requests: &'a [LeaveRequest],
) -> impl Iterator<Item = &'a LeaveRequest> + 'a {
    leave_requests
        .iter()
        .filter(move |l| &l.staff_id == staff_id && l.is_approved())
}

/// Vrai si `date` tombe dans un congé approuvé de `staff_id` (bornes incluses).
pub fn is_on_leave(staff_id: &StaffId, date: NaiveDate, leave_requests: &[LeaveRequest]) -> bool {
    approved_for(staff_id, leave_requests).any(|l| l.covers(date))
}

/// Calcule les jours de `days` bloqués par un congé approuvé de `staff`.
pub fn unavailable_days(
    staff: &Staff,
    days: &DayOffsets,
    week_start: NaiveDate,
    leave_requests: &[LeaveRequest],
) -> Unavailability {
    let mut blocked = BTreeSet::new();
    let mut by_kind: BTreeMap<&'static str, BTreeSet<u8>> = BTreeMap::new();

    for day in days.iter() {
        let Some(date) = offset_date(week_start, day) else {
            continue;
        };
        for leave in approved_for(&staff.id, leave_requests).filter(|l| l.covers(date)) {
            blocked.insert(day);
            by_kind.entry(leave.kind.as_str()).or_default().insert(day);
        }
    }

    let explanation = (!by_kind.is_empty()).then(|| {
        by_kind
            .iter()
            .map(|(kind, days)| format!("{kind} leave on days {}", join_days(days.iter().copied())))
            .collect::<Vec<_>>()
            .join("; ")
    });

    Unavailability {
        blocked,
        explanation,
    }
}

pub(crate) fn join_days<I: IntoIterator<Item = u8>>(days: I) -> String {
    days.into_iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LeaveKind, LeaveStatus, StaffId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn partial_overlap_blocks_only_intersecting_days() {
        let staff = Staff::new(StaffId::new("s1"), "Sam");
        // semaine du dimanche 2024-06-09 ; congé du jeudi au mardi suivant
        let leave = LeaveRequest::new(
            staff.id.clone(),
            LeaveKind::Sick,
            date(2024, 6, 13),
            date(2024, 6, 18),
            LeaveStatus::Approved,
        )
        .unwrap();
        let out = unavailable_days(&staff, &DayOffsets::full_week(), date(2024, 6, 9), &[leave]);
        assert_eq!(out.blocked, BTreeSet::from([4, 5, 6]));
        insta::assert_snapshot!(out.explanation.unwrap(), @"sick leave on days 4, 5, 6");
    }

    #[test]
    fn pending_and_foreign_leaves_are_ignored() {
        let staff = Staff::new(StaffId::new("s1"), "Sam");
        let pending = LeaveRequest::new(
            staff.id.clone(),
            LeaveKind::Vacation,
            date(2024, 6, 9),
            date(2024, 6, 15),
            LeaveStatus::Pending,
        )
        .unwrap();
        let other = LeaveRequest::new(
            StaffId::new("s2"),
            LeaveKind::Vacation,
            date(2024, 6, 9),
            date(2024, 6, 15),
            LeaveStatus::Approved,
        )
        .unwrap();
        let out = unavailable_days(
            &staff,
            &DayOffsets::full_week(),
            date(2024, 6, 9),
            &[pending, other],
        );
        assert!(out.blocked.is_empty());
        assert!(out.explanation.is_none());
    }
}
