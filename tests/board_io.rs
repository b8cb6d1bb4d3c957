#![forbid(unsafe_code)]
use chrono::NaiveDate;
use permanence::{
    io, Board, JsonStorage, LeaveKind, LeaveStatus, Role, RoleId, ShiftId, Slot, StaffId,
    Storage,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn csv_imports_and_json_roundtrip() {
    let dir = tempdir().unwrap();
    let staff_csv = dir.path().join("staff.csv");
    fs::write(
        &staff_csv,
        "id,name,skills,availability\nstaff-1,Alice Martin,LiveChat;Email,prefers mornings\nstaff-2,Bob Durand\n",
    )
    .unwrap();
    let leave_csv = dir.path().join("leave.csv");
    fs::write(
        &leave_csv,
        "id,staff_id,type,start_date,end_date,status,reason\n,staff-1,vacation,2024-06-10,2024-06-14,approved,summer\nL2,staff-2,sick,2024-06-11,2024-06-11,pending,\n",
    )
    .unwrap();

    let mut board = Board::default();
    for s in io::import_staff_csv(&staff_csv).unwrap() {
        board.upsert_staff(s);
    }
    board.leave_requests = io::import_leave_csv(&leave_csv).unwrap();
    board.upsert_role(Role {
        id: RoleId::new("role-1"),
        name: "LiveChat".into(),
        required_agents: 2,
    });

    assert_eq!(board.staff[0].skills, vec!["LiveChat", "Email"]);
    assert_eq!(board.staff[0].availability, "prefers mornings");
    assert!(board.staff[1].skills.is_empty());
    assert_eq!(board.leave_requests[0].kind, LeaveKind::Vacation);
    assert_eq!(board.leave_requests[0].reason.as_deref(), Some("summer"));
    assert!(board.leave_requests[0].id.as_str().starts_with("leave-"));
    assert_eq!(board.leave_requests[1].id.as_str(), "L2");
    assert_eq!(board.leave_requests[1].status, LeaveStatus::Pending);

    let slot = Slot::new(1, RoleId::new("role-1"), "11:00-20:00".parse().unwrap()).unwrap();
    board.shifts.create(slot, StaffId::new("staff-1")).unwrap();

    let path = dir.path().join("board.json");
    let storage = JsonStorage::open(&path).unwrap();
    storage.save(&board).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"leaveRequests\""));
    assert!(raw.contains("\"startTime\": \"11:00\""));
    assert!(raw.contains("\"type\": \"vacation\""));

    let loaded = storage.load().unwrap();
    assert_eq!(loaded.shifts, board.shifts);
    assert_eq!(loaded.leave_requests, board.leave_requests);

    // le shift de staff-1 le lundi 10 juin tombe sur son congé
    let week_start = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
    assert_eq!(loaded.leave_conflicts(week_start).len(), 1);
}

#[test]
fn removing_staff_cascades_to_shifts_and_leave() {
    let mut board: Board = serde_json::from_str(
        r#"{
          "staff": [{"id": "a", "name": "A"}, {"id": "b", "name": "B"}],
          "roles": [{"id": "r", "name": "Phone", "requiredAgents": 1}],
          "leaveRequests": [{"id": "l", "staffId": "a", "type": "sick",
                             "startDate": "2024-06-10", "endDate": "2024-06-10", "status": "approved"}],
          "shifts": [
            {"id": "s1", "day": 1, "startTime": "09:00", "endTime": "18:00", "roleId": "r", "staffId": "a"},
            {"id": "s2", "day": 2, "startTime": "09:00", "endTime": "18:00", "roleId": "r", "staffId": "a"},
            {"id": "s3", "day": 2, "startTime": "09:00", "endTime": "18:00", "roleId": "r", "staffId": "b"}
          ]
        }"#,
    )
    .unwrap();

    assert_eq!(board.remove_staff(&StaffId::new("a")), Some(2));
    assert_eq!(board.shifts.len(), 1);
    assert!(board.leave_requests.is_empty());
    assert_eq!(board.remove_staff(&StaffId::new("ghost")), None);
}

#[test]
fn leave_csv_rejects_inverted_range() {
    let dir = tempdir().unwrap();
    let leave_csv = dir.path().join("leave.csv");
    fs::write(
        &leave_csv,
        "id,staff_id,type,start_date,end_date,status\nL1,staff-1,vacation,2024-06-14,2024-06-10,approved\n",
    )
    .unwrap();
    assert!(io::import_leave_csv(&leave_csv).is_err());
}

#[test]
fn hand_edited_duplicates_are_dropped_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.json");
    fs::write(
        &path,
        r#"{"shifts": [
          {"id": "s1", "day": 1, "startTime": "09:00", "endTime": "18:00",
           "roleId": "r", "staffId": "a"},
          {"id": "s2", "day": 1, "startTime": "09:00", "endTime": "18:00",
           "roleId": "r", "staffId": "a"},
          {"id": "s1", "day": 4, "startTime": "11:00", "endTime": "20:00",
           "roleId": "r", "staffId": "b"},
          {"id": "s3", "day": 1, "startTime": "09:00", "endTime": "18:00",
           "roleId": "r", "staffId": "b"}
        ]}"#,
    )
    .unwrap();

    let board = JsonStorage::open(&path).unwrap().load().unwrap();
    let ids: Vec<&str> = board.shifts.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["s1", "s3"]);
    assert_eq!(board.shifts.get(&ShiftId::new("s1")).unwrap().staff_id.as_str(), "a");
}
