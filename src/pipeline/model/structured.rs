use serde_json::{json, Value};

use super::types::LlmClient;
use super::ModelError;
use crate::models::FallbackKind;

/// What a structured-generation call produced. Consumed immediately by the
/// triage normalizer; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelCallOutcome {
    /// Model text that did not parse as JSON.
    RawText(String),
    /// Model text that parsed as JSON.
    Structured(Value),
    /// The model could not be used; a canned differential stands in.
    MockFallback { kind: FallbackKind, reason: String },
}

impl ModelCallOutcome {
    /// Classify a generation result. Never fails.
    pub fn from_result(result: Result<String, ModelError>) -> Self {
        match result {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => Self::Structured(value),
                Err(_) => Self::RawText(text),
            },
            Err(ModelError::Configuration(reason)) => Self::MockFallback {
                kind: FallbackKind::Unconfigured,
                reason: format!("mock fallback - no gemini client configured ({reason})"),
            },
            Err(err) => {
                tracing::error!("Final model call failed: {err}");
                Self::MockFallback {
                    kind: FallbackKind::Exhausted,
                    reason: err.to_string(),
                }
            }
        }
    }

    /// The payload the normalizer interprets.
    ///
    /// Raw text is wrapped as `{"text": ...}`; a mock becomes
    /// `{"mock": true, "ddx": [...]}` with a `note` (unconfigured) or `error`
    /// (exhausted) marker.
    pub fn into_payload(self) -> Value {
        match self {
            Self::RawText(text) => json!({ "text": text }),
            Self::Structured(value) => value,
            Self::MockFallback { kind, reason } => {
                let marker = match kind {
                    FallbackKind::Unconfigured => "note",
                    FallbackKind::Exhausted => "error",
                };
                let mut payload = json!({
                    "mock": true,
                    "ddx": mock_differential(),
                });
                payload[marker] = Value::String(reason);
                payload
            }
        }
    }
}

/// Canned differential substituted when the model cannot be called.
pub fn mock_differential() -> Value {
    json!([
        {"condition": "Viral illness", "confidence": 0.6, "evidence": "fever + cough common"},
        {"condition": "Bacterial infection", "confidence": 0.3, "evidence": "differential fallback"}
    ])
}

/// Run one generation and classify the outcome. Every failure becomes a
/// mock payload; nothing propagates.
pub fn generate_structured(client: &dyn LlmClient, prompt: &str, max_tokens: u32) -> ModelCallOutcome {
    ModelCallOutcome::from_result(client.generate(prompt, max_tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::model::{MockLlmClient, OfflineClient};

    #[test]
    fn json_text_is_structured() {
        let outcome = generate_structured(&MockLlmClient::new(r#"[{"condition":"Flu"}]"#), "p", 16);
        assert!(matches!(outcome, ModelCallOutcome::Structured(Value::Array(_))));
    }

    #[test]
    fn prose_is_raw_text() {
        let outcome = generate_structured(&MockLlmClient::new("Here you go: [1]"), "p", 16);
        assert_eq!(outcome, ModelCallOutcome::RawText("Here you go: [1]".into()));
        assert_eq!(outcome.into_payload(), json!({"text": "Here you go: [1]"}));
    }

    #[test]
    fn unconfigured_client_gives_noted_mock() {
        let outcome = generate_structured(&OfflineClient::new("GEMINI_API_KEY is not set"), "p", 16);
        assert!(matches!(outcome, ModelCallOutcome::MockFallback { kind: FallbackKind::Unconfigured, .. }));
        let payload = outcome.into_payload();
        assert_eq!(payload["mock"], true);
        assert_eq!(payload["ddx"], mock_differential());
        assert!(payload["note"].as_str().unwrap().contains("no gemini client configured"));
        assert!(payload.get("error").is_none());
    }

    #[test]
    fn exhausted_call_gives_error_mock() {
        let err = ModelError::Exhausted {
            attempts: 3,
            last: Box::new(ModelError::Transient {
                variant: "generate_content",
                status: Some(503),
                detail: "unavailable".into(),
            }),
        };
        let payload = ModelCallOutcome::from_result(Err(err)).into_payload();
        assert_eq!(payload["mock"], true);
        assert!(payload["error"].as_str().unwrap().contains("unavailable"));
    }

    #[test]
    fn mock_differential_is_viral_then_bacterial() {
        let ddx = mock_differential();
        assert_eq!(ddx[0]["condition"], "Viral illness");
        assert_eq!(ddx[0]["confidence"], 0.6);
        assert_eq!(ddx[1]["condition"], "Bacterial infection");
        assert_eq!(ddx[1]["confidence"], 0.3);
    }
}
