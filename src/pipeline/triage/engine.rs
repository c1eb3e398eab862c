use std::sync::Arc;

use serde_json::Value;

use super::normalize::{fallback_differential, interpret_payload, normalize_confidences, to_items};
use super::prompt::build_triage_prompt;
use super::severity::assess_severity;
use crate::config::DEFAULT_MAX_TOKENS;
use crate::models::{ParsedInput, TriageResult};
use crate::pipeline::model::{generate_structured, LlmClient};
use crate::pipeline::safety::detect_red_flags;

/// Builds a triage result from parsed input using the configured model.
///
/// Holds no per-call state, so one engine can serve concurrent callers.
pub struct TriageEngine {
    client: Arc<dyn LlmClient>,
    max_tokens: u32,
}

impl TriageEngine {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Triage one input. Never fails: model trouble degrades to a canned
    /// differential and is recorded in `TriageResult::fallback`.
    pub fn triage(&self, parsed: &ParsedInput) -> TriageResult {
        let prompt = build_triage_prompt(parsed);
        let payload = generate_structured(self.client.as_ref(), &prompt, self.max_tokens).into_payload();

        let mut fallback = fallback_marker(&payload);
        let mut differential = to_items(&interpret_payload(&payload));
        if differential.is_empty() {
            tracing::warn!("Model returned no usable differential, using fallback list");
            fallback.get_or_insert_with(|| "empty differential".to_string());
            differential = fallback_differential();
        }
        normalize_confidences(&mut differential);

        let red_flags = detect_red_flags(parsed);
        let severity = assess_severity(&red_flags, &differential);
        tracing::debug!(
            %severity,
            red_flags = red_flags.len(),
            conditions = differential.len(),
            "Triage complete"
        );

        TriageResult {
            differential,
            severity,
            red_flags,
            fallback,
        }
    }
}

/// The `note` or `error` marker of a mock payload.
fn fallback_marker(payload: &Value) -> Option<String> {
    if payload.get("mock").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    ["note", "error"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
