//! Top-condition → specialist mapping.

use crate::models::{DifferentialItem, Referral};

const DEFAULT_SPECIALIST: &str = "Primary Care";

const SPECIALISTS: &[(&str, &str)] = &[
    ("Upper respiratory infection", "Primary Care / ENT"),
    ("Influenza", "Primary Care"),
    ("COVID-19", "Infectious disease / Primary Care"),
    ("Acute coronary syndrome", "Cardiology (ER)"),
    ("Gastroesophageal reflux disease", "Gastroenterology"),
];

/// Suggest a specialist for the highest-ranked condition.
pub fn suggest_specialist(differential: &[DifferentialItem]) -> Referral {
    let Some(top) = differential.first() else {
        return Referral {
            suggested_specialist: DEFAULT_SPECIALIST.into(),
            notes: "No strong condition".into(),
        };
    };

    let specialist = SPECIALISTS
        .iter()
        .find(|(condition, _)| *condition == top.condition)
        .map(|(_, specialist)| *specialist)
        .unwrap_or(DEFAULT_SPECIALIST);

    Referral {
        suggested_specialist: specialist.into(),
        notes: format!("Top condition: {}", top.condition),
    }
}
