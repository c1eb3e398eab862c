//! Model-call resilience layer around the Gemini text-generation API.
//!
//! `gemini` speaks HTTP, `extract` turns whatever body comes back into text,
//! `resilient` retries across call variants with backoff, and `structured`
//! maps every failure onto a deterministic mock payload.

pub mod types;
pub mod extract;
pub mod gemini;
pub mod resilient;
pub mod structured;

pub use types::*;
pub use extract::*;
pub use gemini::*;
pub use resilient::*;
pub use structured::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// No upstream client can be built. Selects offline mode; never fatal.
    #[error("Model client is not configured: {0}")]
    Configuration(String),

    /// The deployment does not accept this call shape. Skipped without delay.
    #[error("{variant} call signature was rejected: {detail}")]
    SignatureMismatch { variant: &'static str, detail: String },

    /// Anything else that went wrong during a call. Retried with backoff.
    #[error("{variant} call failed{}: {detail}", status_suffix(.status))]
    Transient {
        variant: &'static str,
        status: Option<u16>,
        detail: String,
    },

    #[error("Model call failed after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        last: Box<ModelError>,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl ModelError {
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, Self::SignatureMismatch { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_message_includes_status_when_known() {
        let err = ModelError::Transient {
            variant: "generate_content",
            status: Some(503),
            detail: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "generate_content call failed (status 503): overloaded");
    }

    #[test]
    fn transient_message_without_status() {
        let err = ModelError::Transient {
            variant: "generate_content",
            status: None,
            detail: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "generate_content call failed: connection refused");
    }

    #[test]
    fn exhausted_carries_last_error() {
        let err = ModelError::Exhausted {
            attempts: 3,
            last: Box::new(ModelError::Configuration("x".into())),
        };
        assert!(err.to_string().contains("after 3 attempt(s)"));
        assert!(err.to_string().contains("not configured"));
    }
}
