//! Interpretation and repair of model payloads into a differential.

use serde_json::Value;
use thiserror::Error;

use crate::models::DifferentialItem;

const UNSPECIFIED_CONDITION: &str = "Unspecified condition";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("No JSON array found in model text")]
    NoArrayFound,
}

/// Pull the candidate differential out of a model payload.
///
/// Precedence: a bare array is used as-is; an object with `text` has that
/// text parsed (with substring salvage); an object with a `ddx` array uses
/// it. Anything else yields an empty list.
pub fn interpret_payload(payload: &Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items.clone(),
        Value::Object(map) => {
            if let Some(text) = map.get("text") {
                let text = match text {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                match parse_differential_text(&text) {
                    Ok(items) => items,
                    Err(err) => {
                        tracing::warn!("Could not recover a differential from model text: {err}");
                        Vec::new()
                    }
                }
            } else if let Some(Value::Array(items)) = map.get("ddx") {
                items.clone()
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

/// Parse model text as a JSON array, falling back to the span between the
/// first `[` and the last `]`.
pub fn parse_differential_text(text: &str) -> Result<Vec<Value>, NormalizeError> {
    parse_json_array(text).or_else(|_| salvage_array(text))
}

fn parse_json_array(text: &str) -> Result<Vec<Value>, NormalizeError> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(NormalizeError::JsonParsing("top-level value is not an array".into())),
        Err(e) => Err(NormalizeError::JsonParsing(e.to_string())),
    }
}

fn salvage_array(text: &str) -> Result<Vec<Value>, NormalizeError> {
    let start = text.find('[').ok_or(NormalizeError::NoArrayFound)?;
    let end = text.rfind(']').ok_or(NormalizeError::NoArrayFound)?;
    if end < start {
        return Err(NormalizeError::NoArrayFound);
    }
    parse_json_array(&text[start..=end])
}

/// Convert raw entries to items, skipping entries that are not objects.
pub fn to_items(entries: &[Value]) -> Vec<DifferentialItem> {
    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            Some(DifferentialItem {
                condition: text_field(obj.get("condition"))
                    .unwrap_or_else(|| UNSPECIFIED_CONDITION.to_string()),
                confidence: coerce_confidence(obj.get("confidence")),
                evidence: text_field(obj.get("evidence")).unwrap_or_default(),
            })
        })
        .collect()
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Numeric reading of a confidence value: numbers, numeric strings and
/// booleans are accepted, anything else (or NaN) reads as 0.0. Clamped to
/// [0.0, 1.0].
pub fn coerce_confidence(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    // NaN would survive a min/max clamp as 1.0; read it as no confidence.
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}

/// Clamp every confidence and sort descending. The sort is stable, so
/// equal confidences keep their incoming order.
pub fn normalize_confidences(items: &mut [DifferentialItem]) {
    for item in items.iter_mut() {
        item.confidence = if item.confidence.is_nan() {
            0.0
        } else {
            item.confidence.clamp(0.0, 1.0)
        };
    }
    items.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

/// Differential used when nothing usable came back from the model.
pub fn fallback_differential() -> Vec<DifferentialItem> {
    vec![
        DifferentialItem::new("Viral illness", 0.4, "non-specific viral symptoms"),
        DifferentialItem::new(
            "Bacterial infection",
            0.15,
            "possible bacterial cause depending on fever severity",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_array_is_used_directly() {
        let payload = json!([{"condition": "Flu", "confidence": 0.5}]);
        assert_eq!(interpret_payload(&payload).len(), 1);
    }

    #[test]
    fn text_field_is_parsed_as_array() {
        let payload = json!({"text": r#"[{"condition": "Flu", "confidence": 0.5}]"#});
        let items = to_items(&interpret_payload(&payload));
        assert_eq!(items[0].condition, "Flu");
    }

    #[test]
    fn embedded_array_is_salvaged_from_prose() {
        let text = r#"Sure! Here is the differential:
```json
[{"condition": "Migraine", "confidence": 0.7, "evidence": "throbbing"},
 {"condition": "Tension headache", "confidence": 0.2, "evidence": "band-like"}]
```
Let me know if you need more [details]."#;
        // The last ']' belongs to "[details]", so the salvaged span is not valid JSON.
        assert!(matches!(
            parse_differential_text(text),
            Err(NormalizeError::JsonParsing(_))
        ));

        let clean = r#"Here you go: [{"condition": "Migraine", "confidence": 0.7}] Hope that helps."#;
        let items = to_items(&parse_differential_text(clean).unwrap());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].condition, "Migraine");
        assert_eq!(items[0].confidence, 0.7);
    }

    #[test]
    fn salvage_recovers_exact_array() {
        let array = json!([
            {"condition": "Gastroenteritis", "confidence": 0.55, "evidence": "diarrhea"},
            {"condition": "Food poisoning", "confidence": 0.25, "evidence": "acute onset"}
        ]);
        let text = format!("The most likely conditions are {array} based on the input.");
        assert_eq!(parse_differential_text(&text).unwrap(), array.as_array().unwrap().clone());
    }

    #[test]
    fn text_without_brackets_is_no_array() {
        assert_eq!(parse_differential_text("no json here"), Err(NormalizeError::NoArrayFound));
        assert_eq!(interpret_payload(&json!({"text": "no json here"})), Vec::<Value>::new());
    }

    #[test]
    fn reversed_brackets_are_no_array() {
        assert_eq!(parse_differential_text("] then ["), Err(NormalizeError::NoArrayFound));
    }

    #[test]
    fn text_object_takes_precedence_over_ddx() {
        let payload = json!({"text": "garbage", "ddx": [{"condition": "Flu"}]});
        assert!(interpret_payload(&payload).is_empty());
    }

    #[test]
    fn ddx_list_is_used() {
        let payload = json!({"mock": true, "ddx": [{"condition": "A"}, {"condition": "B"}]});
        assert_eq!(interpret_payload(&payload).len(), 2);
    }

    #[test]
    fn ddx_that_is_not_a_list_is_ignored() {
        assert!(interpret_payload(&json!({"ddx": "Flu"})).is_empty());
    }

    #[test]
    fn other_shapes_yield_empty() {
        assert!(interpret_payload(&json!({"answer": 1})).is_empty());
        assert!(interpret_payload(&json!("just a string")).is_empty());
        assert!(interpret_payload(&json!(42)).is_empty());
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let items = to_items(&[json!("Flu"), json!({"condition": "Cold", "confidence": 0.3}), json!(7)]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].condition, "Cold");
    }

    #[test]
    fn missing_fields_get_defaults() {
        let items = to_items(&[json!({})]);
        assert_eq!(items[0].condition, "Unspecified condition");
        assert_eq!(items[0].confidence, 0.0);
        assert_eq!(items[0].evidence, "");
    }

    #[test]
    fn confidence_above_one_clamps_to_one() {
        assert_eq!(coerce_confidence(Some(&json!(1.7))), 1.0);
    }

    #[test]
    fn non_numeric_confidence_is_zero() {
        assert_eq!(coerce_confidence(Some(&json!("not-a-number"))), 0.0);
        assert_eq!(coerce_confidence(Some(&json!(null))), 0.0);
        assert_eq!(coerce_confidence(Some(&json!([0.5]))), 0.0);
        assert_eq!(coerce_confidence(None), 0.0);
    }

    #[test]
    fn numeric_strings_and_booleans_coerce() {
        assert_eq!(coerce_confidence(Some(&json!(" 0.35 "))), 0.35);
        assert_eq!(coerce_confidence(Some(&json!(true))), 1.0);
        assert_eq!(coerce_confidence(Some(&json!(false))), 0.0);
        assert_eq!(coerce_confidence(Some(&json!(-0.2))), 0.0);
    }

    #[test]
    fn nan_and_infinity_strings() {
        assert_eq!(coerce_confidence(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_confidence(Some(&json!("inf"))), 1.0);
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut items = vec![
            DifferentialItem::new("low", 0.1, ""),
            DifferentialItem::new("tie-first", 0.5, ""),
            DifferentialItem::new("high", 0.9, ""),
            DifferentialItem::new("tie-second", 0.5, ""),
        ];
        normalize_confidences(&mut items);
        let order: Vec<&str> = items.iter().map(|i| i.condition.as_str()).collect();
        assert_eq!(order, vec!["high", "tie-first", "tie-second", "low"]);
    }

    #[test]
    fn fallback_is_viral_then_bacterial() {
        let ddx = fallback_differential();
        assert_eq!(ddx[0].condition, "Viral illness");
        assert_eq!(ddx[0].confidence, 0.4);
        assert_eq!(ddx[1].condition, "Bacterial infection");
        assert_eq!(ddx[1].confidence, 0.15);
    }
}
