//! Best-effort text extraction from an upstream response body.
//!
//! Strategies run in a fixed order and the first non-empty result wins.
//! Each works on a borrowed body and cannot fail, so a strategy that finds
//! nothing simply hands over to the next.

use serde::Serialize;
use serde_json::Value;

use super::types::ModelResponse;

/// Which response shape produced the extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// Top-level `text` field (SDK convenience accessor).
    DirectText,
    /// `output` / `outputs` field (Vertex-style).
    OutputList,
    /// `candidates[0].content` (REST generateContent).
    Candidate,
    /// The whole body, stringified.
    Opaque,
}

type Strategy = fn(&Value) -> Option<String>;

const STRATEGIES: &[(ResponseShape, Strategy)] = &[
    (ResponseShape::DirectText, direct_text),
    (ResponseShape::OutputList, output_field),
    (ResponseShape::Candidate, first_candidate),
    (ResponseShape::Opaque, whole_body),
];

/// Extract the generated text. Empty only when every strategy comes up empty.
pub fn extract_text(response: &ModelResponse) -> String {
    extract_with_shape(response).1
}

/// Like [`extract_text`], also reporting which strategy matched.
pub fn extract_with_shape(response: &ModelResponse) -> (ResponseShape, String) {
    for (shape, strategy) in STRATEGIES {
        if let Some(text) = strategy(response.body()) {
            if !text.is_empty() {
                return (*shape, text);
            }
        }
    }
    (ResponseShape::Opaque, String::new())
}

fn direct_text(body: &Value) -> Option<String> {
    body.get("text").filter(|v| is_truthy(v)).map(render_value)
}

fn output_field(body: &Value) -> Option<String> {
    let out = body
        .get("output")
        .filter(|v| is_truthy(v))
        .or_else(|| body.get("outputs"))
        .filter(|v| is_truthy(v))?;

    match out {
        Value::Array(items) => {
            let first = items.first()?;
            if let Value::Object(map) = first {
                for key in ["content", "text", "output"] {
                    if let Some(v) = map.get(key) {
                        return Some(render_value(v));
                    }
                }
            }
            serde_json::to_string(first).ok()
        }
        other => Some(render_value(other)),
    }
}

fn first_candidate(body: &Value) -> Option<String> {
    let first = body.get("candidates")?.as_array()?.first()?;
    match first.get("content") {
        Some(content) => Some(render_content(content)),
        None => Some(render_value(first)),
    }
}

fn whole_body(body: &Value) -> Option<String> {
    Some(render_value(body))
}

/// Render a candidate `content` value. Gemini nests text as
/// `{"parts": [{"text": ...}, ...]}`; the part texts are concatenated.
fn render_content(content: &Value) -> String {
    if let Some(parts) = content.get("parts").and_then(Value::as_array) {
        let joined: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect();
        if !joined.is_empty() {
            return joined;
        }
    }
    render_value(content)
}

/// Strings as-is, null as empty, everything else as compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn extract(body: Value) -> (ResponseShape, String) {
        extract_with_shape(&ModelResponse::from_json(body))
    }

    #[test]
    fn direct_text_wins() {
        let (shape, text) = extract(json!({"text": "[1]", "candidates": [{"content": "x"}]}));
        assert_eq!(shape, ResponseShape::DirectText);
        assert_eq!(text, "[1]");
    }

    #[test]
    fn empty_text_falls_through_to_candidates() {
        let (shape, text) = extract(json!({"text": "", "candidates": [{"content": "from candidate"}]}));
        assert_eq!(shape, ResponseShape::Candidate);
        assert_eq!(text, "from candidate");
    }

    #[test]
    fn outputs_list_prefers_content_key() {
        let (shape, text) = extract(json!({
            "outputs": [{"output": "third", "text": "second", "content": "first"}]
        }));
        assert_eq!(shape, ResponseShape::OutputList);
        assert_eq!(text, "first");
    }

    #[test]
    fn outputs_list_uses_text_then_output() {
        let (_, text) = extract(json!({"outputs": [{"output": "o", "text": "t"}]}));
        assert_eq!(text, "t");
        let (_, text) = extract(json!({"outputs": [{"output": "o"}]}));
        assert_eq!(text, "o");
    }

    #[test]
    fn outputs_element_without_known_keys_is_serialized() {
        let (_, text) = extract(json!({"outputs": [{"score": 1}]}));
        assert_eq!(text, r#"{"score":1}"#);
    }

    #[test]
    fn empty_output_falls_back_to_outputs() {
        let (_, text) = extract(json!({"output": [], "outputs": [{"text": "later"}]}));
        assert_eq!(text, "later");
    }

    #[test]
    fn non_list_output_is_stringified() {
        let (shape, text) = extract(json!({"output": "plain output"}));
        assert_eq!(shape, ResponseShape::OutputList);
        assert_eq!(text, "plain output");
    }

    #[test]
    fn gemini_candidate_parts_are_joined() {
        let (shape, text) = extract(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "[{\"condition\":"}, {"text": "\"Flu\"}]"}]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(shape, ResponseShape::Candidate);
        assert_eq!(text, r#"[{"condition":"Flu"}]"#);
    }

    #[test]
    fn candidate_without_content_is_stringified() {
        let (_, text) = extract(json!({"candidates": [{"output": "legacy"}]}));
        assert_eq!(text, r#"{"output":"legacy"}"#);
    }

    #[test]
    fn empty_candidates_fall_through_to_opaque() {
        let (shape, text) = extract(json!({"candidates": [], "promptFeedback": {"blockReason": "SAFETY"}}));
        assert_eq!(shape, ResponseShape::Opaque);
        assert!(text.contains("SAFETY"));
    }

    #[test]
    fn plain_string_body_is_returned_verbatim() {
        let resp = ModelResponse::from_body("not json at all");
        assert_eq!(extract_text(&resp), "not json at all");
    }

    #[test]
    fn null_body_yields_empty() {
        let (_, text) = extract(Value::Null);
        assert_eq!(text, "");
    }

    #[test]
    fn extraction_is_idempotent() {
        let resp = ModelResponse::from_json(json!({
            "outputs": [{"content": "same"}],
            "candidates": [{"content": "other"}]
        }));
        let before = resp.clone();
        let first = extract_text(&resp);
        let second = extract_text(&resp);
        assert_eq!(first, second);
        assert_eq!(resp, before);
    }
}
