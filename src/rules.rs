use anyhow::Context;
use std::fs;
use std::path::Path;

/// Règles opérationnelles par défaut, transmises telles quelles au générateur.
pub const DEFAULT_RULES: &str = "\
Operational requirements:
- The support team operates every day from 09:00 to 21:00.
- Exactly three shift windows exist: 09:00-18:00, 11:00-20:00 and 12:00-21:00.
- Each staff member works exactly 5 days per week.
- Every role must have its required number of agents on duty during every operational hour.

Instructions:
1. Assign each working staff member to one of the three shift windows for each of their 5 working days.
2. For each hour between 09:00 and 21:00, the number of staff on duty for a role must reach its requiredAgents count.
3. Spread the two rest days of each staff member across the week.
4. Prefer staff whose skills match the role (a staff member with the 'LiveChat' skill suits the LiveChat role).
5. Take availability notes into account, but coverage comes first.
6. Output one schedule entry per staff member per working day.
7. Explain briefly in 'reasoning' how the schedule meets these requirements.";

/// Jeu de règles textuel ; jamais analysé structurellement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConstraintRules {
    #[default]
    Default,
    Custom(String),
}

impl ConstraintRules {
    /// Texte fourni par l'opérateur ; vide ou blanc = règles par défaut.
    pub fn from_operator(text: Option<String>) -> Self {
        match text {
            Some(text) if !text.trim().is_empty() => ConstraintRules::Custom(text),
            _ => ConstraintRules::Default,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ConstraintRules::Default => DEFAULT_RULES,
            ConstraintRules::Custom(text) => text,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ConstraintRules::Custom(_))
    }
}

/// Charge un fichier de règles texte.
pub fn load_rules_file<P: AsRef<Path>>(path: P) -> anyhow::Result<ConstraintRules> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).with_context(|| format!("reading rules {}", path.display()))?;
    Ok(ConstraintRules::from_operator(Some(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_operator_text_falls_back_to_default() {
        assert_eq!(
            ConstraintRules::from_operator(Some("  \n".into())),
            ConstraintRules::Default
        );
        assert!(ConstraintRules::Default.text().contains("09:00-18:00"));
        let custom = ConstraintRules::from_operator(Some("Only weekdays.".into()));
        assert_eq!(custom.text(), "Only weekdays.");
    }
}
