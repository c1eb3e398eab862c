use serde::{Deserialize, Serialize};

/// Structured view of one free-text symptom description.
///
/// Produced once per request by the symptom parser and never modified
/// afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInput {
    /// Recognized symptoms, in vocabulary order, without duplicates.
    pub symptoms: Vec<String>,
    /// Duration phrase such as "3 days", when one was found.
    pub duration: Option<String>,
    /// The text exactly as the patient wrote it.
    pub raw_text: String,
}

impl ParsedInput {
    pub fn new(symptoms: Vec<String>, duration: Option<String>, raw_text: impl Into<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(symptoms.len());
        for symptom in symptoms {
            if !unique.contains(&symptom) {
                unique.push(symptom);
            }
        }
        Self {
            symptoms: unique,
            duration,
            raw_text: raw_text.into(),
        }
    }

    pub fn has_symptom(&self, term: &str) -> bool {
        self.symptoms.iter().any(|s| s == term)
    }
}
