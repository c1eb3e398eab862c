use serde::{Deserialize, Serialize};

use super::enums::Severity;

/// One candidate condition in a differential diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentialItem {
    pub condition: String,
    /// Clamped to [0.0, 1.0] by the normalizer.
    pub confidence: f64,
    pub evidence: String,
}

impl DifferentialItem {
    pub fn new(condition: &str, confidence: f64, evidence: &str) -> Self {
        Self {
            condition: condition.to_string(),
            confidence,
            evidence: evidence.to_string(),
        }
    }
}

/// A matched red-flag keyword with its static explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedFlag {
    pub term: String,
    pub note: String,
}

/// Outcome of triaging one parsed input.
///
/// Always recomputable from the parsed input and the model response; only
/// ever persisted inside its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    /// Confidence-descending; never empty.
    pub differential: Vec<DifferentialItem>,
    pub severity: Severity,
    pub red_flags: Vec<RedFlag>,
    /// Set when the differential came from a canned payload rather than the
    /// model (carries the note or error that caused it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}
