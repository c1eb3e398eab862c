use crate::models::{DifferentialItem, RedFlag, Severity};

/// Top confidence at or above which a flag-free case is urgent.
pub const URGENT_CONFIDENCE: f64 = 0.5;

/// Any red flag is an emergency; otherwise the top confidence decides.
/// An empty differential reads as confidence 0.0.
pub fn assess_severity(red_flags: &[RedFlag], differential: &[DifferentialItem]) -> Severity {
    if !red_flags.is_empty() {
        return Severity::Emergency;
    }
    let top = differential.first().map(|d| d.confidence).unwrap_or(0.0);
    if top >= URGENT_CONFIDENCE {
        Severity::Urgent
    } else {
        Severity::Stable
    }
}
