//! Parsing of untrusted oracle output into a raw field map.

use authmatch_core::RawFieldMap;
use serde_json::{Map, Value};

use crate::error::OracleError;

/// Parse the text an oracle produced into label → value pairs.
///
/// Accepted shapes:
/// - a JSON object, optionally inside a Markdown code fence
/// - the same object wrapped as `{"fields": {...}}`
///
/// Values are coerced: strings are kept, numbers and booleans stringified,
/// `null` and blank strings become absent, arrays of scalars are joined with
/// a space, anything else is kept as compact JSON.
pub fn parse_fields(output: &str) -> Result<RawFieldMap, OracleError> {
    let body = strip_code_fence(output);
    if body.is_empty() {
        return Err(OracleError::EmptyResponse);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| OracleError::Malformed(e.to_string()))?;
    let object = match value {
        Value::Object(object) => unwrap_fields(object),
        other => {
            return Err(OracleError::Malformed(format!(
                "expected a JSON object, got {}",
                kind(&other)
            )));
        }
    };

    Ok(object
        .into_iter()
        .map(|(label, value)| (label.trim().to_string(), coerce(value)))
        .collect())
}

fn unwrap_fields(mut object: Map<String, Value>) -> Map<String, Value> {
    if object.len() == 1
        && matches!(object.get("fields"), Some(Value::Object(_)))
        && let Some(Value::Object(inner)) = object.remove("fields")
    {
        return inner;
    }
    object
}

fn strip_code_fence(output: &str) -> &str {
    let trimmed = output.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().trim_end_matches("```").trim()
}

fn coerce(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) if items.iter().all(is_scalar) => {
            let joined: Vec<String> = items.into_iter().filter_map(coerce).collect();
            (!joined.is_empty()).then(|| joined.join(" "))
        }
        other => Some(other.to_string()),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
