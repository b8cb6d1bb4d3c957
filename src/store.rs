//! Collection autoritaire des shifts de la semaine.
//!
//! Chaque mutation est une opération explicite qui déclare les champs touchés ;
//! aucune ne change un `ShiftId` existant, et aucune n'introduit deux shifts
//! identiques (même slot, même personne).

use crate::model::{DayOffsets, Shift, ShiftId, Slot, StaffId};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Shift>", into = "Vec<Shift>")]
pub struct ScheduleStore {
    shifts: Vec<Shift>,
}

/// Bilan d'une fusion de shifts générés.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub removed: usize,
    pub inserted: usize,
    /// Shifts écartés : jour hors de la sélection ou doublon.
    pub discarded: usize,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construit un store depuis une liste non vérifiée (fichier édité à la main) :
    /// le premier shift gagne en cas d'id répété ou de doublon (slot, personne).
    pub fn from_shifts(shifts: Vec<Shift>) -> Self {
        let mut store = Self::new();
        for shift in shifts {
            if store.get(&shift.id).is_some()
                || store.is_booked(&shift.slot(), &shift.staff_id, None)
            {
                debug!(shift = %shift.id, "duplicate shift skipped while loading");
                continue;
            }
            store.shifts.push(shift);
        }
        store
    }

    pub fn as_slice(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shift> {
        self.shifts.iter()
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    pub fn get(&self, id: &ShiftId) -> Option<&Shift> {
        self.shifts.iter().find(|s| &s.id == id)
    }

    pub fn in_slot<'a>(&'a self, slot: &'a Slot) -> impl Iterator<Item = &'a Shift> + 'a {
        self.shifts.iter().filter(move |s| s.occupies(slot))
    }

    fn position(&self, id: &ShiftId) -> Option<usize> {
        self.shifts.iter().position(|s| &s.id == id)
    }

    /// Vrai si `staff` occupe déjà `slot` (hors shift `except`).
    fn is_booked(&self, slot: &Slot, staff: &StaffId, except: Option<&ShiftId>) -> bool {
        self.shifts
            .iter()
            .any(|s| Some(&s.id) != except && &s.staff_id == staff && s.occupies(slot))
    }

    /// Crée un shift pour `staff` dans `slot`. `None` si la personne y est déjà.
    pub fn create(&mut self, slot: Slot, staff: StaffId) -> Option<ShiftId> {
        if self.is_booked(&slot, &staff, None) {
            debug!(staff = %staff, day = slot.day, "create refused: already booked in slot");
            return None;
        }
        let shift = Shift::assign(slot, staff);
        let id = shift.id.clone();
        self.shifts.push(shift);
        Some(id)
    }

    /// Remplace la personne affectée ; ne touche que `staff_id`.
    pub fn replace_staff(&mut self, id: &ShiftId, staff: StaffId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let slot = self.shifts[pos].slot();
        if self.shifts[pos].staff_id == staff || self.is_booked(&slot, &staff, Some(id)) {
            return false;
        }
        self.shifts[pos].staff_id = staff;
        true
    }

    /// Échange les `staff_id` de deux shifts distincts, en une seule mutation.
    pub fn swap_staff(&mut self, a: &ShiftId, b: &ShiftId) -> bool {
        if a == b {
            return false;
        }
        let (Some(ia), Some(ib)) = (self.position(a), self.position(b)) else {
            return false;
        };
        let (staff_a, slot_a) = (self.shifts[ia].staff_id.clone(), self.shifts[ia].slot());
        let (staff_b, slot_b) = (self.shifts[ib].staff_id.clone(), self.shifts[ib].slot());

        // chaque personne ne doit pas déjà occuper le slot d'arrivée via un tiers
        let clash = |store: &Self, slot: &Slot, staff: &StaffId| {
            store
                .shifts
                .iter()
                .any(|s| &s.id != a && &s.id != b && &s.staff_id == staff && s.occupies(slot))
        };
        if clash(self, &slot_b, &staff_a) || clash(self, &slot_a, &staff_b) {
            return false;
        }

        self.shifts[ia].staff_id = staff_b;
        self.shifts[ib].staff_id = staff_a;
        true
    }

    /// Déplace un shift vers `slot` ; `id` et `staff_id` inchangés.
    pub fn move_to(&mut self, id: &ShiftId, slot: Slot) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let staff = self.shifts[pos].staff_id.clone();
        if self.is_booked(&slot, &staff, Some(id)) {
            return false;
        }
        let shift = &mut self.shifts[pos];
        shift.day = slot.day;
        shift.role_id = slot.role_id;
        shift.start_time = slot.start_time;
        shift.end_time = slot.end_time;
        true
    }

    pub fn remove(&mut self, id: &ShiftId) -> Option<Shift> {
        let pos = self.position(id)?;
        Some(self.shifts.remove(pos))
    }

    /// Suppression en cascade des shifts d'une personne.
    pub fn remove_staff(&mut self, staff: &StaffId) -> usize {
        let before = self.shifts.len();
        self.shifts.retain(|s| &s.staff_id != staff);
        before - self.shifts.len()
    }

    /// Remplace les shifts des jours `days` par `generated`.
    ///
    /// Les jours hors sélection restent intacts ; un shift généré hors sélection
    /// ou en doublon est écarté.
    pub fn replace_days(&mut self, days: &DayOffsets, generated: Vec<Shift>) -> MergeReport {
        let before = self.shifts.len();
        self.shifts.retain(|s| !days.contains(s.day));
        let mut report = MergeReport {
            removed: before - self.shifts.len(),
            ..MergeReport::default()
        };

        for shift in generated {
            if !days.contains(shift.day) || self.is_booked(&shift.slot(), &shift.staff_id, None) {
                report.discarded += 1;
                continue;
            }
            self.shifts.push(shift);
            report.inserted += 1;
        }
        report
    }
}

impl From<Vec<Shift>> for ScheduleStore {
    fn from(shifts: Vec<Shift>) -> Self {
        Self::from_shifts(shifts)
    }
}

impl From<ScheduleStore> for Vec<Shift> {
    fn from(store: ScheduleStore) -> Self {
        store.shifts
    }
}

impl<'a> IntoIterator for &'a ScheduleStore {
    type Item = &'a Shift;
    type IntoIter = std::slice::Iter<'a, Shift>;

    fn into_iter(self) -> Self::IntoIter {
        self.shifts.iter()
    }
}
