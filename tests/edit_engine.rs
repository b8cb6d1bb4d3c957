#![forbid(unsafe_code)]
use permanence::{
    DragSubject, DropTarget, EditEngine, EditOutcome, EditState, NoOpReason, RoleId,
    ScheduleStore, ShiftId, Slot, StaffId,
};

fn slot(day: u8, role: &str, window: &str) -> Slot {
    Slot::new(day, RoleId::new(role), window.parse().unwrap()).unwrap()
}

fn staff(id: &str) -> DragSubject {
    DragSubject::Staff(StaffId::new(id))
}

/// Store avec deux shifts : (alice, jour 1) et (bob, jour 2).
fn two_shifts() -> (ScheduleStore, ShiftId, ShiftId) {
    let mut store = ScheduleStore::new();
    let a = store
        .create(slot(1, "role-1", "09:00-18:00"), StaffId::new("alice"))
        .unwrap();
    let b = store
        .create(slot(2, "role-1", "11:00-20:00"), StaffId::new("bob"))
        .unwrap();
    (store, a, b)
}

#[test]
fn staff_on_empty_slot_creates_fresh_shift() {
    let mut store = ScheduleStore::new();
    let mut engine = EditEngine::new();
    let target = slot(2, "role-2", "09:00-18:00");

    let outcome = engine.apply(
        staff("staff-1"),
        DropTarget::EmptySlot(target.clone()),
        &mut store,
    );
    let EditOutcome::Created(id) = outcome else {
        panic!("expected creation, got {outcome:?}");
    };

    assert_eq!(store.len(), 1);
    let shift = store.get(&id).unwrap();
    assert_eq!(shift.staff_id.as_str(), "staff-1");
    assert_eq!(shift.slot(), target);
    assert_eq!(shift.start_time.format("%H:%M").to_string(), "09:00");
    assert_eq!(shift.end_time.format("%H:%M").to_string(), "18:00");

    // un second geste identique pour une autre personne donne un autre id
    let outcome = engine.apply(staff("staff-2"), DropTarget::EmptySlot(target), &mut store);
    let EditOutcome::Created(other) = outcome else {
        panic!("expected creation");
    };
    assert_ne!(other, id);
}

#[test]
fn staff_on_filled_slot_replaces_only_staff() {
    let (mut store, a, _) = two_shifts();
    let before = store.get(&a).unwrap().clone();

    let outcome =
        EditEngine::new().apply(staff("carol"), DropTarget::Shift(a.clone()), &mut store);
    assert_eq!(outcome, EditOutcome::Replaced(a.clone()));

    let after = store.get(&a).unwrap();
    assert_eq!(after.staff_id.as_str(), "carol");
    assert_eq!(after.id, before.id);
    assert_eq!(after.slot(), before.slot());
    assert_eq!(store.len(), 2);
}

#[test]
fn swap_is_self_inverse() {
    let (mut store, a, b) = two_shifts();
    let original = store.clone();
    let mut engine = EditEngine::new();

    let outcome = engine.apply(
        DragSubject::Shift(a.clone()),
        DropTarget::Shift(b.clone()),
        &mut store,
    );
    assert_eq!(outcome, EditOutcome::Swapped(a.clone(), b.clone()));
    assert_eq!(store.get(&a).unwrap().staff_id.as_str(), "bob");
    assert_eq!(store.get(&b).unwrap().staff_id.as_str(), "alice");
    assert_eq!(store.get(&a).unwrap().day, 1);

    engine.apply(DragSubject::Shift(a), DropTarget::Shift(b), &mut store);
    assert_eq!(store, original);
}

#[test]
fn move_preserves_identity_and_is_idempotent() {
    let (mut store, a, _) = two_shifts();
    let mut engine = EditEngine::new();
    let target = slot(5, "role-3", "12:00-21:00");

    let first = engine.apply(
        DragSubject::Shift(a.clone()),
        DropTarget::EmptySlot(target.clone()),
        &mut store,
    );
    assert_eq!(first, EditOutcome::Moved(a.clone()));
    let after_first = store.clone();

    let moved = store.get(&a).unwrap();
    assert_eq!(moved.id, a);
    assert_eq!(moved.staff_id.as_str(), "alice");
    assert_eq!(moved.slot(), target);

    let second = engine.apply(
        DragSubject::Shift(a.clone()),
        DropTarget::EmptySlot(target),
        &mut store,
    );
    assert_eq!(second, EditOutcome::Moved(a));
    assert_eq!(store, after_first);
}

#[test]
fn drop_outside_deletes_exactly_one_shift() {
    let (mut store, a, b) = two_shifts();
    let c = store
        .create(slot(3, "role-2", "09:00-18:00"), StaffId::new("carol"))
        .unwrap();
    let before: Vec<_> = store.iter().cloned().collect();

    let outcome =
        EditEngine::new().apply(DragSubject::Shift(b.clone()), DropTarget::Nowhere, &mut store);
    let EditOutcome::Deleted(removed) = outcome else {
        panic!("expected deletion");
    };
    assert_eq!(removed.id, b);

    let expected: Vec<_> = before.into_iter().filter(|s| s.id != b).collect();
    assert_eq!(store.as_slice(), expected.as_slice());
    assert!(store.get(&a).is_some() && store.get(&c).is_some());
}

#[test]
fn self_drop_and_staff_outside_never_mutate() {
    let (mut store, a, _) = two_shifts();
    let snapshot = store.clone();
    let mut engine = EditEngine::new();

    let outcome = engine.apply(
        DragSubject::Shift(a.clone()),
        DropTarget::Shift(a.clone()),
        &mut store,
    );
    assert_eq!(outcome, EditOutcome::NoOp(NoOpReason::SelfDrop));

    let outcome = engine.apply(staff("alice"), DropTarget::Nowhere, &mut store);
    assert_eq!(outcome, EditOutcome::NoOp(NoOpReason::StaffDroppedOutside));

    // la personne occupe déjà ce slot
    let outcome = engine.apply(staff("alice"), DropTarget::Shift(a), &mut store);
    assert_eq!(outcome, EditOutcome::NoOp(NoOpReason::AlreadyAssigned));

    let outcome = engine.apply(
        DragSubject::Shift(ShiftId::new("missing")),
        DropTarget::Nowhere,
        &mut store,
    );
    assert_eq!(outcome, EditOutcome::NoOp(NoOpReason::UnknownShift));

    assert_eq!(store, snapshot);
}

#[test]
fn staff_sharing_a_shift_id_string_still_replaces() {
    let (mut store, a, _) = two_shifts();
    // identifiants de natures différentes : aucune confusion avec un self-drop
    let lookalike = DragSubject::Staff(StaffId::new(a.as_str()));

    let outcome = EditEngine::new().apply(lookalike, DropTarget::Shift(a.clone()), &mut store);
    assert_eq!(outcome, EditOutcome::Replaced(a.clone()));
    assert_eq!(store.get(&a).unwrap().staff_id.as_str(), a.as_str());
}

#[test]
fn state_machine_walks_idle_dragging_resolved_idle() {
    let mut store = ScheduleStore::new();
    let mut engine = EditEngine::new();
    assert_eq!(engine.state(), &EditState::Idle);

    // lâcher sans saisir : rien
    let outcome = engine.drop_on(DropTarget::Nowhere, &mut store);
    assert_eq!(outcome, EditOutcome::NoOp(NoOpReason::NotDragging));
    engine.finish();

    engine.begin_drag(staff("dana"));
    assert_eq!(engine.state(), &EditState::Dragging(staff("dana")));
    engine.cancel();
    assert_eq!(engine.state(), &EditState::Idle);

    engine.begin_drag(staff("dana"));
    let outcome = engine.drop_on(
        DropTarget::EmptySlot(slot(0, "role-1", "09:00-18:00")),
        &mut store,
    );
    assert!(matches!(engine.state(), EditState::Resolved(EditOutcome::Created(_))));
    assert_eq!(engine.finish(), Some(outcome));
    assert_eq!(engine.state(), &EditState::Idle);
    assert_eq!(store.len(), 1);
}
