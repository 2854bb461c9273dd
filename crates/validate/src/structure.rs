//! Structural validation: find the JSON object in raw model output.
//!
//! Models wrap their JSON in prose or code fences ("Sure! Here is...").
//! The whole input is tried first; when it is not JSON, the first balanced
//! `{...}` span is cut out and parsed instead. Braces inside string literals
//! do not count towards the balance.
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::ContentError;

/// Keys every content object must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 3] = ["title", "description", "tags"];

/// Returns the first balanced top-level `{...}` span of `text`.
///
/// Returns `None` when there is no `{` or the first object never closes.
///
/// ```rust
/// use validate::extract_json_span;
///
/// let text = r#"Sure! {"title":"a {b}"} Hope that helps!"#;
/// assert_eq!(extract_json_span(text), Some(r#"{"title":"a {b}"}"#));
/// ```
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Proves `input` carries a JSON object with the required keys.
///
/// Failure kinds:
/// - `INVALID_JSON` when no object can be parsed or the top-level value is
///   not an object; the parser's message is kept as `cause`.
/// - `MISSING_INPUT` listing exactly the absent keys.
///
/// Key presence is all that is checked here. Types and values are left to
/// the schema stage.
pub fn validate_structure(input: &str) -> Result<Map<String, Value>, ContentError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ContentError::InvalidJson {
            reason: "input is empty".into(),
            cause: None,
        });
    }

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(whole_err) => match extract_json_span(trimmed) {
            Some(span) => {
                trace!(
                    span_len = span.len(),
                    input_len = trimmed.len(),
                    "extracted embedded json"
                );
                serde_json::from_str::<Value>(span).map_err(|err| ContentError::InvalidJson {
                    reason: "embedded JSON object does not parse".into(),
                    cause: Some(err.to_string()),
                })?
            }
            None => {
                return Err(ContentError::InvalidJson {
                    reason: "no JSON object found in input".into(),
                    cause: Some(whole_err.to_string()),
                })
            }
        },
    };

    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(ContentError::InvalidJson {
                reason: format!("expected a JSON object, found {}", json_type_name(&other)),
                cause: None,
            })
        }
    };

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|key| !object.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ContentError::MissingInput { missing });
    }

    Ok(object)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
