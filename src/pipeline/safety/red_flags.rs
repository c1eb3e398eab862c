//! Red-flag keyword scan over parsed symptom input.
//!
//! Fires on the patient's own words, not on model output: a red flag forces
//! escalation whatever the model says.

use crate::models::{ParsedInput, RedFlag};

/// (term, note) pairs. Output follows this order.
pub const RED_FLAGS: &[(&str, &str)] = &[
    ("chest pain", "possible heart attack / immediate ER"),
    ("shortness of breath", "respiratory distress / immediate ER"),
    ("severe bleeding", "immediate ER"),
    ("loss of consciousness", "immediate ER"),
    ("sudden severe headache", "possible stroke / immediate ER"),
];

/// Red flags present in `parsed`, in table order.
///
/// A term matches when it occurs in the lower-cased raw text or is exactly
/// one of the parsed symptoms.
pub fn detect_red_flags(parsed: &ParsedInput) -> Vec<RedFlag> {
    let text = parsed.raw_text.to_lowercase();
    RED_FLAGS
        .iter()
        .filter(|(term, _)| text.contains(term) || parsed.has_symptom(term))
        .map(|(term, note)| RedFlag {
            term: term.to_string(),
            note: note.to_string(),
        })
        .collect()
}
