#![forbid(unsafe_code)]
#![cfg(feature = "http")]
use assert_cmd::Command;
use permanence::{Board, JsonStorage, Storage};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const BOARD: &str = r#"{
  "staff": [
    {"id": "staff-1", "name": "Alice", "skills": ["LiveChat"]},
    {"id": "staff-2", "name": "Bob", "skills": ["Email"]}
  ],
  "roles": [
    {"id": "role-1", "name": "LiveChat", "requiredAgents": 1},
    {"id": "role-2", "name": "Email", "requiredAgents": 1}
  ],
  "leaveRequests": [
    {"id": "l1", "staffId": "staff-1", "type": "vacation",
     "startDate": "2024-06-10", "endDate": "2024-06-14", "status": "approved"}
  ]
}"#;

fn cli(board: &Path) -> Command {
    let mut cmd = Command::cargo_bin("permanence-cli").unwrap();
    cmd.arg("--board").arg(board);
    cmd
}

fn load(board: &Path) -> Board {
    JsonStorage::open(board).unwrap().load().unwrap()
}

#[test]
fn assign_then_delete_through_gestures() {
    let dir = tempdir().unwrap();
    let board = dir.path().join("board.json");
    fs::write(&board, BOARD).unwrap();

    cli(&board)
        .args(["assign", "--staff", "staff-1", "--day", "2", "--role", "role-2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("created shift-"));

    let saved = load(&board);
    assert_eq!(saved.shifts.len(), 1);
    let shift = saved.shifts.iter().next().unwrap().clone();
    assert_eq!(shift.day, 2);
    assert_eq!(shift.staff_id.as_str(), "staff-1");

    cli(&board)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("09:00-18:00 | role-2 | staff-1 (Alice)"));

    // même geste une seconde fois : la personne occupe déjà le slot
    cli(&board)
        .args(["assign", "--staff", "staff-1", "--day", "2", "--role", "role-2"])
        .assert()
        .code(2);

    cli(&board)
        .args(["delete", "--shift", shift.id.as_str()])
        .assert()
        .success();
    assert!(load(&board).shifts.is_empty());
}

#[test]
fn unknown_references_are_refused() {
    let dir = tempdir().unwrap();
    let board = dir.path().join("board.json");
    fs::write(&board, BOARD).unwrap();

    cli(&board)
        .args(["assign", "--staff", "ghost", "--day", "2", "--role", "role-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown staff"));
    cli(&board)
        .args(["assign", "--staff", "staff-1", "--day", "9", "--role", "role-2"])
        .assert()
        .failure();
}

#[test]
fn generate_replays_recorded_completion() {
    let dir = tempdir().unwrap();
    let board = dir.path().join("board.json");
    fs::write(&board, BOARD).unwrap();
    let replay = dir.path().join("completion.txt");
    fs::write(
        &replay,
        r#"Sure. {"schedule": [
            {"day": 1, "startTime": "09:00", "endTime": "18:00", "roleId": "role-1", "staffId": "staff-1"},
            {"day": 1, "startTime": "11:00", "endTime": "20:00", "roleId": "role-2", "staffId": "staff-2"}
        ], "reasoning": "Bob covers Monday."}"#,
    )
    .unwrap();

    cli(&board)
        .args(["generate", "--week-start", "2024-06-09", "--days", "1", "--replay"])
        .arg(&replay)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bob covers Monday."))
        .stdout(predicate::str::contains("1 inserted"));

    let saved = load(&board);
    assert_eq!(saved.shifts.len(), 1);
    assert_eq!(saved.shifts.iter().next().unwrap().staff_id.as_str(), "staff-2");
}

#[test]
fn generate_requires_sunday_and_endpoint() {
    let dir = tempdir().unwrap();
    let board = dir.path().join("board.json");
    fs::write(&board, BOARD).unwrap();

    cli(&board)
        .args(["generate", "--week-start", "2024-06-10", "--print-prompt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sunday"));

    cli(&board)
        .env_remove("PERMANENCE_ENDPOINT")
        .args(["generate", "--week-start", "2024-06-09"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no completion endpoint"));

    cli(&board)
        .args(["generate", "--week-start", "2024-06-09", "--days", "1", "--print-prompt"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Staff staff-1 (Alice) must NOT be scheduled on Day 1 (Monday)",
        ));
}
