use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::types::{CallVariant, ModelResponse};
use super::ModelError;
use crate::config::ModelSettings;

/// Body fragments that mean "this deployment does not understand the request
/// shape", as opposed to a failure of a well-formed call.
const SIGNATURE_MISMATCH_MARKERS: &[&str] = &[
    "Unknown name",
    "Invalid JSON payload",
    "Cannot find field",
    "is not supported for",
];

const VERTEX_GLOBAL_HOST: &str = "aiplatform.googleapis.com";

/// Where requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    /// Gemini Developer API (`generativelanguage.googleapis.com`).
    Public { base_url: String },
    /// Vertex AI express mode: the global publisher endpoint, keyed by API key.
    Vertex,
    /// Vertex AI publisher models under one project and region.
    VertexRegional { project: String, location: String },
}

/// Shared HTTP plumbing for every Gemini call variant.
///
/// Built once and reused across calls; construction is where configuration
/// problems surface.
pub struct GeminiTransport {
    http: reqwest::blocking::Client,
    endpoint: Endpoint,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiTransport {
    pub fn new(settings: &ModelSettings) -> Result<Self, ModelError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| ModelError::Configuration("GEMINI_API_KEY is not set".into()))?;

        let endpoint = if settings.use_vertex {
            match &settings.vertex_project {
                Some(project) => Endpoint::VertexRegional {
                    project: project.clone(),
                    location: settings.vertex_location.clone(),
                },
                None => Endpoint::Vertex,
            }
        } else {
            Endpoint::Public {
                base_url: settings.base_url.trim_end_matches('/').to_string(),
            }
        };

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ModelError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            api_key,
            model: settings.model.clone(),
            timeout_secs: settings.timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full URL for a model method such as `generateContent`.
    fn method_url(&self, method: &str) -> String {
        match &self.endpoint {
            Endpoint::Public { base_url } => {
                format!("{base_url}/v1beta/models/{}:{method}", self.model)
            }
            Endpoint::Vertex => format!(
                "https://{VERTEX_GLOBAL_HOST}/v1/publishers/google/models/{}:{method}",
                self.model
            ),
            Endpoint::VertexRegional { project, location } => format!(
                "https://{location}-aiplatform.googleapis.com/v1/projects/{project}/locations/{location}/publishers/google/models/{}:{method}",
                self.model
            ),
        }
    }

    fn post<B: Serialize>(
        &self,
        variant: &'static str,
        method: &str,
        body: &B,
    ) -> Result<ModelResponse, ModelError> {
        let url = self.method_url(method);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .map_err(|e| {
                let detail = if e.is_connect() {
                    format!("cannot connect to {}", self.host())
                } else if e.is_timeout() {
                    format!("request timed out after {}s", self.timeout_secs)
                } else {
                    e.to_string()
                };
                ModelError::Transient {
                    variant,
                    status: None,
                    detail,
                }
            })?;

        let status = response.status();
        let text = response.text().map_err(|e| ModelError::Transient {
            variant,
            status: Some(status.as_u16()),
            detail: format!("failed to read body: {e}"),
        })?;

        if !status.is_success() {
            return Err(classify_http_failure(variant, status.as_u16(), &text));
        }

        Ok(ModelResponse::from_body(&text))
    }

    fn host(&self) -> String {
        match &self.endpoint {
            Endpoint::Public { base_url } => base_url.clone(),
            Endpoint::Vertex => VERTEX_GLOBAL_HOST.to_string(),
            Endpoint::VertexRegional { location, .. } => format!("{location}-aiplatform.googleapis.com"),
        }
    }
}

/// Map a non-success HTTP status onto the retry taxonomy.
///
/// 404 means the method is not served by this deployment; a 400 whose body
/// names an unknown or invalid field means the request shape is wrong. Both
/// are signature mismatches. Everything else is transient.
pub fn classify_http_failure(variant: &'static str, status: u16, body: &str) -> ModelError {
    let detail = truncate(body, 300);
    let shape_rejected = status == 404
        || (status == 400 && SIGNATURE_MISMATCH_MARKERS.iter().any(|m| body.contains(m)));

    if shape_rejected {
        ModelError::SignatureMismatch { variant, detail }
    } else {
        ModelError::Transient {
            variant,
            status: Some(status),
            detail,
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════
// Request bodies
// ═══════════════════════════════════════════════════════════

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

/// Legacy `generateText` body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTextRequest<'a> {
    prompt: TextPrompt<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
}

fn content_request(prompt: &str, max_tokens: Option<u32>) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: [Content {
            role: "user",
            parts: [Part { text: prompt }],
        }],
        generation_config: max_tokens.map(|max_output_tokens| GenerationConfig { max_output_tokens }),
    }
}

fn text_request(prompt: &str, max_tokens: Option<u32>) -> GenerateTextRequest<'_> {
    GenerateTextRequest {
        prompt: TextPrompt { text: prompt },
        max_output_tokens: max_tokens,
    }
}

// ═══════════════════════════════════════════════════════════
// Call variants
// ═══════════════════════════════════════════════════════════

/// The request shapes tried against a deployment, most modern first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiCallKind {
    /// `generateContent` with `generationConfig.maxOutputTokens`.
    ContentWithLimit,
    /// `generateContent` without a token limit.
    Content,
    /// Legacy `generateText` with `maxOutputTokens`.
    TextWithLimit,
    /// Legacy `generateText` without a token limit.
    Text,
}

impl GeminiCallKind {
    pub const ALL: [GeminiCallKind; 4] = [
        Self::ContentWithLimit,
        Self::Content,
        Self::TextWithLimit,
        Self::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentWithLimit => "generate_content_with_limit",
            Self::Content => "generate_content",
            Self::TextWithLimit => "generate_text_with_limit",
            Self::Text => "generate_text",
        }
    }
}

/// One Gemini request shape bound to the shared transport.
pub struct GeminiVariant {
    transport: Arc<GeminiTransport>,
    kind: GeminiCallKind,
}

impl GeminiVariant {
    pub fn new(transport: Arc<GeminiTransport>, kind: GeminiCallKind) -> Self {
        Self { transport, kind }
    }
}

impl CallVariant for GeminiVariant {
    fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    fn attempt(&self, prompt: &str, max_tokens: u32) -> Result<ModelResponse, ModelError> {
        let name = self.name();
        match self.kind {
            GeminiCallKind::ContentWithLimit => {
                self.transport
                    .post(name, "generateContent", &content_request(prompt, Some(max_tokens)))
            }
            GeminiCallKind::Content => {
                self.transport
                    .post(name, "generateContent", &content_request(prompt, None))
            }
            GeminiCallKind::TextWithLimit => {
                self.transport
                    .post(name, "generateText", &text_request(prompt, Some(max_tokens)))
            }
            GeminiCallKind::Text => {
                self.transport
                    .post(name, "generateText", &text_request(prompt, None))
            }
        }
    }
}

/// All Gemini call variants, in the order they should be tried.
pub fn gemini_variants(transport: Arc<GeminiTransport>) -> Vec<Box<dyn CallVariant>> {
    GeminiCallKind::ALL
        .into_iter()
        .map(|kind| Box::new(GeminiVariant::new(Arc::clone(&transport), kind)) as Box<dyn CallVariant>)
        .collect()
}
