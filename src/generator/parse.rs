//! Lecture d'une complétion non fiable.
//!
//! Le texte brut peut contenir de la prose autour de l'objet JSON : on isole le
//! premier span `{...}` équilibré, puis chaque entrée est vérifiée (champs,
//! types, références) avant de devenir un `Shift` avec un id frais.

use super::GenerationError;
use crate::model::{parse_hhmm, Role, RoleId, Shift, Slot, Staff, StaffId};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

#[derive(Deserialize)]
struct RawCompletion {
    schedule: Vec<serde_json::Value>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Entrée telle que décrite au générateur ; un éventuel `id` est ignoré.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawShift {
    day: u8,
    start_time: String,
    end_time: String,
    role_id: String,
    staff_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCompletion {
    pub shifts: Vec<Shift>,
    pub reasoning: String,
    /// Entrées invalides ou aux références inconnues.
    pub rejected: usize,
}

/// Premier objet `{...}` équilibré du texte (chaînes JSON et échappements respectés).
///
/// Une seule passe à partir du premier `{` : les ouvrantes sont empilées et la
/// fermeture d'une ouvrante donne un span candidat ; on garde celui qui commence
/// le plus tôt. Dès que la pile se vide, aucun span antérieur ne peut plus se
/// fermer.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let first = text.find('{')?;
    let mut open: Vec<usize> = Vec::new();
    let mut best: Option<(usize, usize)> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[first..].char_indices() {
        let idx = first + offset;
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => open.push(idx),
            '}' => {
                // accolade fermante orpheline : ignorée
                let Some(start) = open.pop() else {
                    continue;
                };
                if best.map_or(true, |(b, _)| start < b) {
                    best = Some((start, idx + 1));
                }
                if open.is_empty() {
                    break;
                }
            }
            _ => {}
        }
    }
    best.map(|(start, end)| &text[start..end])
}

pub fn parse_completion(
    text: &str,
    staff: &[Staff],
    roles: &[Role],
) -> Result<ParsedCompletion, GenerationError> {
    let json = extract_json_object(text).ok_or(GenerationError::NoJsonObject)?;
    let raw: RawCompletion =
        serde_json::from_str(json).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    let known_staff: HashSet<&StaffId> = staff.iter().map(|s| &s.id).collect();
    let known_roles: HashSet<&RoleId> = roles.iter().map(|r| &r.id).collect();

    let mut shifts = Vec::with_capacity(raw.schedule.len());
    let mut rejected = 0usize;
    for (idx, value) in raw.schedule.into_iter().enumerate() {
        match to_shift(value, &known_staff, &known_roles) {
            Ok(shift) => shifts.push(shift),
            Err(reason) => {
                debug!(entry = idx, reason, "generated entry rejected");
                rejected += 1;
            }
        }
    }

    let reasoning = raw
        .reasoning
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| "No reasoning was provided by the generator.".to_string());

    Ok(ParsedCompletion {
        shifts,
        reasoning,
        rejected,
    })
}

fn to_shift(
    value: serde_json::Value,
    known_staff: &HashSet<&StaffId>,
    known_roles: &HashSet<&RoleId>,
) -> Result<Shift, &'static str> {
    let raw: RawShift = serde_json::from_value(value).map_err(|_| "missing or mistyped field")?;
    if raw.day > 6 {
        return Err("day out of range");
    }
    let (Some(start_time), Some(end_time)) =
        (parse_hhmm(&raw.start_time), parse_hhmm(&raw.end_time))
    else {
        return Err("time is not HH:MM");
    };
    if start_time == end_time {
        return Err("empty time window");
    }
    let staff_id = StaffId::new(raw.staff_id.trim());
    if !known_staff.contains(&staff_id) {
        return Err("unknown staffId");
    }
    let role_id = RoleId::new(raw.role_id.trim());
    if !known_roles.contains(&role_id) {
        return Err("unknown roleId");
    }

    let slot = Slot {
        day: raw.day,
        role_id,
        start_time,
        end_time,
    };
    Ok(Shift::assign(slot, staff_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_balanced_object_around_prose() {
        let text = r#"Sure! Here it is: {"a": {"b": "}"}, "c": 1} trailing {"x": 2}"#;
        assert_eq!(extract_json_object(text), Some(r#"{"a": {"b": "}"}, "c": 1}"#));
    }

    #[test]
    fn unbalanced_prefix_is_skipped() {
        let text = r#"use { carefully: {"schedule": [], "reasoning": "ok"}"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"schedule": [], "reasoning": "ok"}"#)
        );
        assert_eq!(extract_json_object("no braces here"), None);
        assert_eq!(extract_json_object("{ never closed"), None);
        assert_eq!(extract_json_object(r#"} stray {"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn unclosed_brace_flood_is_linear() {
        let text = "{".repeat(100_000);
        let started = std::time::Instant::now();
        assert_eq!(extract_json_object(&text), None);

        let mut text = "{ x ".repeat(50_000);
        text.push_str(r#"{"schedule": [], "reasoning": "late"}"#);
        assert_eq!(
            extract_json_object(&text),
            Some(r#"{"schedule": [], "reasoning": "late"}"#)
        );
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn untrusted_entries_are_filtered_and_ids_replaced() {
        let staff = vec![Staff::new(StaffId::new("s1"), "Sam")];
        let roles = vec![Role {
            id: RoleId::new("r1"),
            name: "Phone".into(),
            required_agents: 1,
        }];
        let text = r#"```json
{"schedule": [
  {"id": "evil", "day": 2, "startTime": "09:00", "endTime": "18:00", "roleId": "r1", "staffId": "s1"},
  {"day": 2, "startTime": "09:00", "endTime": "18:00", "roleId": "r1", "staffId": "ghost"},
  {"day": 9, "startTime": "09:00", "endTime": "18:00", "roleId": "r1", "staffId": "s1"},
  {"day": "2", "startTime": "09:00", "endTime": "18:00", "roleId": "r1", "staffId": "s1"},
  {"day": 3, "startTime": "9h", "endTime": "18:00", "roleId": "r1", "staffId": "s1"}
], "reasoning": "done"}
```"#;
        let parsed = parse_completion(text, &staff, &roles).unwrap();
        assert_eq!(parsed.shifts.len(), 1);
        assert_eq!(parsed.rejected, 4);
        assert_ne!(parsed.shifts[0].id.as_str(), "evil");
        assert!(parsed.shifts[0].id.as_str().starts_with("shift-"));
        assert_eq!(parsed.reasoning, "done");
    }

    #[test]
    fn missing_schedule_is_malformed() {
        let err = parse_completion(r#"{"reasoning": "nope"}"#, &[], &[]).unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
        let err = parse_completion("I cannot help with that.", &[], &[]).unwrap_err();
        assert_eq!(err, GenerationError::NoJsonObject);
    }
}
