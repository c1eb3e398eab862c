//! Keyword-based symptom extraction from free text.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::ParsedInput;

/// Recognized symptom vocabulary. Output keeps this order.
pub const COMMON_SYMPTOMS: &[&str] = &[
    "fever",
    "cough",
    "headache",
    "chest pain",
    "shortness of breath",
    "rash",
    "nausea",
    "vomiting",
    "diarrhea",
    "abdominal pain",
    "dizziness",
    "bleeding",
];

// Longer unit spellings first so "3 days" is captured whole; with the
// singular listed first the match stops at "3 day".
static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\s*(?:days|day|hours|hour|weeks|week)").expect("Invalid duration regex")
});

/// Parse free text into recognized symptoms and an optional duration.
pub fn parse_symptoms(text: &str) -> ParsedInput {
    let lowered = text.to_lowercase();
    let symptoms = COMMON_SYMPTOMS
        .iter()
        .filter(|s| lowered.contains(*s))
        .map(|s| s.to_string())
        .collect();
    let duration = DURATION.find(&lowered).map(|m| m.as_str().to_string());
    ParsedInput::new(symptoms, duration, text)
}
