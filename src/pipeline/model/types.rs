use serde_json::Value;

use super::ModelError;

/// Upstream response body, captured at the transport boundary.
///
/// The service does not promise a shape, so the body is kept as an untyped
/// JSON value. A body that is not JSON at all is held as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    body: Value,
}

impl ModelResponse {
    pub fn from_json(body: Value) -> Self {
        Self { body }
    }

    /// Parse a raw HTTP body, keeping it verbatim when it is not JSON.
    pub fn from_body(raw: &str) -> Self {
        let body = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Self { body }
    }

    /// SDK-style response exposing a direct `text` field.
    pub fn with_text(text: &str) -> Self {
        Self {
            body: serde_json::json!({ "text": text }),
        }
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

/// One way of invoking the upstream service.
///
/// Deployments disagree on which request shape they accept, so the caller
/// holds several of these and tries them in order.
pub trait CallVariant: Send + Sync {
    /// Stable name for logs and errors.
    fn name(&self) -> &'static str;

    /// Issue one request. Must return `ModelError::SignatureMismatch` when the
    /// deployment rejects the request shape itself.
    fn attempt(&self, prompt: &str, max_tokens: u32) -> Result<ModelResponse, ModelError>;
}

/// Text-generation client abstraction (allows mocking).
pub trait LlmClient: Send + Sync {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ModelError>;
}

/// Stand-in used when no upstream client could be configured.
///
/// Never touches the network; every call reports the configuration error.
pub struct OfflineClient {
    reason: String,
}

impl OfflineClient {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl LlmClient for OfflineClient {
    fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String, ModelError> {
        Err(ModelError::Configuration(self.reason.clone()))
    }
}

/// Mock LLM client for testing: returns a configurable response.
pub struct MockLlmClient {
    response: String,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String, ModelError> {
        Ok(self.response.clone())
    }
}
