use super::GenerationInput;
use crate::leave::{join_days, unavailable_days, Unavailability};
use crate::model::Staff;
use std::fmt::Write;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub(crate) fn day_name(day: u8) -> &'static str {
    DAY_NAMES.get(usize::from(day)).copied().unwrap_or("?")
}

/// Indisponibilités de chaque membre sur les jours demandés.
pub(crate) fn staff_availability<'a>(
    input: &GenerationInput<'a>,
) -> Vec<(&'a Staff, Unavailability)> {
    input
        .staff
        .iter()
        .map(|staff| {
            let unavailable =
                unavailable_days(staff, &input.days, input.week_start, input.leave_requests);
            (staff, unavailable)
        })
        .collect()
}

/// Compose la requête en langage naturel envoyée au générateur.
pub fn build_prompt(input: &GenerationInput<'_>) -> String {
    let availability = staff_availability(input);
    let mut out = String::new();

    let days = input
        .days
        .iter()
        .map(|d| format!("Day {d} ({})", day_name(d)))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(
        out,
        "You are an expert shift scheduler for a customer support team. \
         Generate shift assignments for the following days only: {days} (Sunday=0, Saturday=6)."
    );
    out.push('\n');
    out.push_str(input.rules.text().trim_end());
    out.push_str("\n\n");

    if input.existing.is_empty() {
        out.push_str("No shifts are assigned yet this week.\n");
    } else {
        out.push_str(
            "Shifts already assigned for the entire week (count them toward each staff member's working days):\n",
        );
        for shift in input.existing {
            let _ = writeln!(
                out,
                "- Staff {} works Day {} from {} to {} as role {}.",
                shift.staff_id,
                shift.day,
                shift.start_time.format("%H:%M"),
                shift.end_time.format("%H:%M"),
                shift.role_id
            );
        }
    }
    out.push_str(
        "\nGenerate shifts ONLY for the requested days; never create shifts for any other day. \
         Shifts you generate replace the existing ones on those days. \
         Including existing shifts, no staff member may work more than 5 distinct days this week.\n",
    );

    let restricted: Vec<_> = availability
        .iter()
        .filter(|(_, u)| !u.blocked.is_empty())
        .collect();
    if !restricted.is_empty() {
        out.push_str(
            "\nNON-NEGOTIABLE LEAVE RESTRICTIONS (approved leave; any violating shift will be discarded):\n",
        );
        for (staff, unavailable) in &restricted {
            let reason = unavailable.explanation.as_deref().unwrap_or("approved leave");
            for day in &unavailable.blocked {
                let _ = writeln!(
                    out,
                    "- Staff {} ({}) must NOT be scheduled on Day {day} ({}): {reason}.",
                    staff.id,
                    staff.name,
                    day_name(*day)
                );
            }
        }
    }

    out.push_str("\nRoles and staffing needs:\n");
    for role in input.roles {
        let _ = writeln!(
            out,
            "- Role: {} (ID: {}) requires {} agents on duty every hour.",
            role.name, role.id, role.required_agents
        );
    }

    out.push_str("\nAvailable staff:\n");
    for (staff, unavailable) in &availability {
        if unavailable.covers_all(&input.days) {
            continue;
        }
        let _ = write!(
            out,
            "- Staff ID: {}, Name: {}, Skills: {}, Availability notes: {}",
            staff.id,
            staff.name,
            staff.skills.join(", "),
            if staff.availability.trim().is_empty() {
                "none"
            } else {
                staff.availability.trim()
            }
        );
        if !unavailable.blocked.is_empty() {
            let _ = write!(
                out,
                ", unavailable on days: [{}]",
                join_days(unavailable.blocked.iter().copied())
            );
        }
        out.push('\n');
    }

    out.push_str(
        "\nAnswer with a single JSON object and nothing else, shaped as:\n\
         {\"schedule\": [{\"day\": 1, \"startTime\": \"09:00\", \"endTime\": \"18:00\", \
         \"roleId\": \"<role id>\", \"staffId\": \"<staff id>\"}], \"reasoning\": \"<short explanation>\"}\n",
    );
    out
}
