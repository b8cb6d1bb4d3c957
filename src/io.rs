use crate::model::{Board, LeaveId, LeaveKind, LeaveRequest, LeaveStatus, Staff, StaffId};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// Import de l'équipe depuis CSV: header `id,name[,skills][,availability]`
/// (compétences séparées par `;`).
pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Staff>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing id")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        if id.is_empty() || name.is_empty() {
            bail!("invalid staff row (empty)");
        }
        let mut staff = Staff::new(StaffId::new(id), name);
        if let Some(skills) = rec.get(2) {
            staff.skills = skills
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(note) = rec.get(3) {
            staff.availability = note.trim().to_string();
        }
        out.push(staff);
    }
    Ok(out)
}

/// Import de congés: header `id,staff_id,type,start_date,end_date,status[,reason]`
/// (dates `YYYY-MM-DD`, bornes incluses ; `id` vide = id généré).
pub fn import_leave_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<LeaveRequest>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let field = |idx: usize, name: &str| -> anyhow::Result<String> {
            Ok(rec
                .get(idx)
                .with_context(|| format!("missing {name}"))?
                .trim()
                .to_string())
        };
        let staff_id = field(1, "staff_id")?;
        if staff_id.is_empty() {
            bail!("invalid leave row (empty staff_id)");
        }
        let kind: LeaveKind = field(2, "type")?.parse().map_err(anyhow::Error::msg)?;
        let start = parse_date(&field(3, "start_date")?)?;
        let end = parse_date(&field(4, "end_date")?)?;
        let status: LeaveStatus = field(5, "status")?.parse().map_err(anyhow::Error::msg)?;

        let mut leave = LeaveRequest::new(StaffId::new(staff_id), kind, start, end, status)
            .map_err(anyhow::Error::msg)?;
        let id = field(0, "id")?;
        if !id.is_empty() {
            leave.id = LeaveId::new(id);
        }
        leave.reason = rec
            .get(6)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        out.push(leave);
    }
    Ok(out)
}

pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date: {raw}"))
}

/// Export CSV des shifts: header `id,day,start_time,end_time,role_id,staff_id,staff_name`
pub fn export_shifts_csv<P: AsRef<Path>>(path: P, board: &Board) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "id",
        "day",
        "start_time",
        "end_time",
        "role_id",
        "staff_id",
        "staff_name",
    ])?;
    for s in board.shifts.iter() {
        let name = board
            .find_staff(&s.staff_id)
            .map(|p| p.name.as_str())
            .unwrap_or("");
        let day = s.day.to_string();
        let start = s.start_time.format("%H:%M").to_string();
        let end = s.end_time.format("%H:%M").to_string();
        w.write_record([
            s.id.as_str(),
            day.as_str(),
            start.as_str(),
            end.as_str(),
            s.role_id.as_str(),
            s.staff_id.as_str(),
            name,
        ])?;
    }
    w.flush()?;
    Ok(())
}
