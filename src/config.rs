use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "TriageAssist";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default Gemini model used for differential generation.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Public Gemini REST endpoint (non-Vertex deployments).
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Vertex region for the project endpoint when `GOOGLE_CLOUD_LOCATION` is unset.
pub const DEFAULT_VERTEX_LOCATION: &str = "us-central1";

/// Per-request HTTP timeout for model calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Token budget requested from the model for one triage prompt.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

const DATABASE_FILE: &str = "triage_memory.db";
const EXPORT_FILE: &str = "sessions_export.csv";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,triage_assist=debug"
}

/// Get the application data directory.
///
/// `TRIAGE_DATA_DIR` wins; otherwise `~/TriageAssist/`, falling back to the
/// working directory when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = non_empty_env("TRIAGE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// SQLite file holding patients and sessions.
pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// Default destination of the session CSV export.
pub fn export_path() -> PathBuf {
    app_data_dir().join(EXPORT_FILE)
}

// ═══════════════════════════════════════════════════════════
// Model settings
// ═══════════════════════════════════════════════════════════

/// Upstream generation settings, read from the process environment once at
/// client construction.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// `GEMINI_API_KEY`. Absent means offline mode, never an error.
    pub api_key: Option<String>,
    /// `GOOGLE_GENAI_USE_VERTEXAI` in {1, true, yes}, case-insensitive.
    pub use_vertex: bool,
    pub model: String,
    pub base_url: String,
    /// Optional in Vertex mode: selects the regional project endpoint
    /// instead of the global express endpoint.
    pub vertex_project: Option<String>,
    pub vertex_location: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl ModelSettings {
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty_env("GEMINI_API_KEY"),
            use_vertex: non_empty_env("GOOGLE_GENAI_USE_VERTEXAI")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            model: non_empty_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_empty_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            vertex_project: non_empty_env("GOOGLE_CLOUD_PROJECT"),
            vertex_location: non_empty_env("GOOGLE_CLOUD_LOCATION")
                .unwrap_or_else(|| DEFAULT_VERTEX_LOCATION.to_string()),
            timeout_secs: non_empty_env("GEMINI_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }

    /// Settings with no credentials: always resolves to offline mode.
    pub fn offline() -> Self {
        Self {
            api_key: None,
            use_vertex: false,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            vertex_project: None,
            vertex_location: DEFAULT_VERTEX_LOCATION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }
}

/// Retry behavior for model calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts in total, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt following `attempt` (1-based):
    /// `base * 2^(attempt - 1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
