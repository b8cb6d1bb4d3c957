//! Machine d'états des gestes de glisser-déposer.
//!
//! `Idle → Dragging(sujet) → Resolved(issue) → Idle`. Chaque geste produit
//! exactement une issue ; un geste indéfini ou ambigu se résout en `NoOp`.

use crate::model::{Shift, ShiftId, Slot, StaffId};
use crate::store::ScheduleStore;
use tracing::debug;

/// Ce qui est saisi : un membre depuis la liste, ou un shift existant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSubject {
    Staff(StaffId),
    Shift(ShiftId),
}

/// Où le sujet est lâché.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    EmptySlot(Slot),
    Shift(ShiftId),
    /// Hors de toute zone de dépôt.
    Nowhere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    NotDragging,
    SelfDrop,
    StaffDroppedOutside,
    UnknownShift,
    /// La personne occupe déjà le slot visé.
    AlreadyAssigned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Created(ShiftId),
    Replaced(ShiftId),
    Swapped(ShiftId, ShiftId),
    Moved(ShiftId),
    Deleted(Shift),
    NoOp(NoOpReason),
}

impl EditOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, EditOutcome::NoOp(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Dragging(DragSubject),
    Resolved(EditOutcome),
}

#[derive(Debug, Default)]
pub struct EditEngine {
    state: EditState,
}

impl EditEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// Démarre un geste ; un geste précédent non lâché est abandonné.
    pub fn begin_drag(&mut self, subject: DragSubject) {
        self.state = EditState::Dragging(subject);
    }

    pub fn cancel(&mut self) {
        self.state = EditState::Idle;
    }

    /// Lâche le sujet courant sur `target` et applique l'issue au store.
    pub fn drop_on(&mut self, target: DropTarget, store: &mut ScheduleStore) -> EditOutcome {
        let outcome = match std::mem::take(&mut self.state) {
            EditState::Dragging(subject) => resolve(&subject, target, store),
            _ => EditOutcome::NoOp(NoOpReason::NotDragging),
        };
        if let EditOutcome::NoOp(reason) = &outcome {
            debug!(?reason, "gesture resolved to no-op");
        }
        self.state = EditState::Resolved(outcome.clone());
        outcome
    }

    /// Retour à `Idle` ; rend l'issue du dernier geste s'il y en a une.
    pub fn finish(&mut self) -> Option<EditOutcome> {
        match std::mem::take(&mut self.state) {
            EditState::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Geste complet en un appel.
    pub fn apply(
        &mut self,
        subject: DragSubject,
        target: DropTarget,
        store: &mut ScheduleStore,
    ) -> EditOutcome {
        self.begin_drag(subject);
        self.drop_on(target, store);
        self.finish()
            .unwrap_or(EditOutcome::NoOp(NoOpReason::NotDragging))
    }
}

fn resolve(subject: &DragSubject, target: DropTarget, store: &mut ScheduleStore) -> EditOutcome {
    // un shift lâché sur lui-même : rien avant toute mutation
    if let (DragSubject::Shift(id), DropTarget::Shift(target_id)) = (subject, &target) {
        if id == target_id {
            return EditOutcome::NoOp(NoOpReason::SelfDrop);
        }
    }

    match (subject, target) {
        (DragSubject::Staff(_), DropTarget::Nowhere) => {
            EditOutcome::NoOp(NoOpReason::StaffDroppedOutside)
        }
        (DragSubject::Staff(staff), DropTarget::EmptySlot(slot)) => {
            match store.create(slot, staff.clone()) {
                Some(id) => EditOutcome::Created(id),
                None => EditOutcome::NoOp(NoOpReason::AlreadyAssigned),
            }
        }
        (DragSubject::Staff(staff), DropTarget::Shift(target_id)) => {
            if store.get(&target_id).is_none() {
                return EditOutcome::NoOp(NoOpReason::UnknownShift);
            }
            if store.replace_staff(&target_id, staff.clone()) {
                EditOutcome::Replaced(target_id)
            } else {
                EditOutcome::NoOp(NoOpReason::AlreadyAssigned)
            }
        }
        (DragSubject::Shift(id), target) => {
            if store.get(id).is_none() {
                return EditOutcome::NoOp(NoOpReason::UnknownShift);
            }
            match target {
                DropTarget::Nowhere => store
                    .remove(id)
                    .map_or(EditOutcome::NoOp(NoOpReason::UnknownShift), EditOutcome::Deleted),
                DropTarget::EmptySlot(slot) => {
                    if store.move_to(id, slot) {
                        EditOutcome::Moved(id.clone())
                    } else {
                        EditOutcome::NoOp(NoOpReason::AlreadyAssigned)
                    }
                }
                DropTarget::Shift(target_id) => {
                    if store.get(&target_id).is_none() {
                        return EditOutcome::NoOp(NoOpReason::UnknownShift);
                    }
                    if store.swap_staff(id, &target_id) {
                        EditOutcome::Swapped(id.clone(), target_id)
                    } else {
                        EditOutcome::NoOp(NoOpReason::AlreadyAssigned)
                    }
                }
            }
        }
    }
}
