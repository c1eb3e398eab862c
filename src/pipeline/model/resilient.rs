use std::sync::Arc;
use std::thread;

use super::extract::extract_with_shape;
use super::gemini::{gemini_variants, GeminiTransport};
use super::types::{CallVariant, LlmClient, OfflineClient};
use super::ModelError;
use crate::config::{ModelSettings, RetryPolicy};

/// Retries a generation request across call variants with exponential backoff.
///
/// Per attempt, variants run in order. A signature mismatch moves straight on
/// to the next variant; any other failure ends the attempt and triggers a
/// backoff sleep before the next one. The first success returns at once.
pub struct ResilientCaller {
    variants: Vec<Box<dyn CallVariant>>,
    policy: RetryPolicy,
}

impl ResilientCaller {
    pub fn new(variants: Vec<Box<dyn CallVariant>>, policy: RetryPolicy) -> Self {
        Self { variants, policy }
    }

    /// Build a Gemini-backed caller. Fails with `ModelError::Configuration`
    /// when no client can be constructed; nothing is sent in that case.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self, ModelError> {
        let transport = Arc::new(GeminiTransport::new(settings)?);
        tracing::info!(model = transport.model(), vertex = settings.use_vertex, "Gemini client configured");
        Ok(Self::new(gemini_variants(transport), settings.retry))
    }

    /// Generate text, or fail with `ModelError::Exhausted` carrying the last
    /// underlying error.
    pub fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ModelError> {
        if self.variants.is_empty() {
            return Err(ModelError::Configuration("no call variants available".into()));
        }

        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error: Option<ModelError> = None;

        for attempt in 1..=max_attempts {
            for variant in &self.variants {
                match variant.attempt(prompt, max_tokens) {
                    Ok(response) => {
                        let (shape, text) = extract_with_shape(&response);
                        tracing::debug!(
                            variant = variant.name(),
                            attempt,
                            ?shape,
                            chars = text.len(),
                            "Model call succeeded"
                        );
                        return Ok(text);
                    }
                    Err(err) if err.is_signature_mismatch() => {
                        tracing::debug!(variant = variant.name(), "Skipping variant: {err}");
                        last_error = Some(err);
                    }
                    Err(err) => {
                        last_error = Some(err);
                        break;
                    }
                }
            }

            let reason = last_error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            if attempt < max_attempts {
                let wait = self.policy.backoff(attempt);
                tracing::warn!(
                    "Model call failed (attempt {attempt}/{max_attempts}): {reason}. Retrying in {:.1}s",
                    wait.as_secs_f64()
                );
                thread::sleep(wait);
            } else {
                tracing::warn!("Model call failed (attempt {attempt}/{max_attempts}): {reason}");
            }
        }

        let last = last_error
            .unwrap_or_else(|| ModelError::Configuration("no call variants attempted".into()));
        tracing::error!("Model call exhausted: {last}");
        Err(ModelError::Exhausted {
            attempts: max_attempts,
            last: Box::new(last),
        })
    }
}

impl LlmClient for ResilientCaller {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ModelError> {
        ResilientCaller::generate(self, prompt, max_tokens)
    }
}

/// Build the upstream client once, falling back to offline mode when it
/// cannot be configured. Never fails.
pub fn connect(settings: &ModelSettings) -> Arc<dyn LlmClient> {
    match ResilientCaller::from_settings(settings) {
        Ok(caller) => Arc::new(caller),
        Err(err) => {
            tracing::warn!("{err}. Falling back to offline mock responses.");
            Arc::new(OfflineClient::new(err.to_string()))
        }
    }
}
