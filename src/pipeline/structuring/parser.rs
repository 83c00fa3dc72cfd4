use serde_json::{Map, Value};

use super::StructuringError;
use crate::models::{ObservationValue, TestObservation};

/// Stand-in parsed when the model returns no content at all.
pub const EMPTY_COMPLETION_FALLBACK: &str = "{}";

/// Parse and validate the model's completion into observations.
///
/// The content must be a bare JSON array of objects. Code fences, prose or a
/// top-level object are rejected; nothing is salvaged from a bad response.
pub fn parse_observations(content: &str) -> Result<Vec<TestObservation>, StructuringError> {
    let trimmed = content.trim();
    let text = if trimmed.is_empty() {
        EMPTY_COMPLETION_FALLBACK
    } else {
        trimmed
    };

    let payload: Value =
        serde_json::from_str(text).map_err(|e| StructuringError::JsonParsing(e.to_string()))?;

    let Value::Array(items) = payload else {
        return Err(StructuringError::SchemaViolation(format!(
            "expected a JSON array, got {}",
            kind_of(&payload)
        )));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_item(index, item))
        .collect()
}

fn validate_item(index: usize, item: &Value) -> Result<TestObservation, StructuringError> {
    let Value::Object(fields) = item else {
        return Err(violation(index, format!("expected an object, got {}", kind_of(item))));
    };

    let test_type = match fields.get("test_type") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        other => {
            return Err(violation(
                index,
                format!(
                    "test_type must be a non-empty string, got {}",
                    other.map(kind_of).unwrap_or("nothing")
                ),
            ))
        }
    };

    let value = match field(fields, "value") {
        None => None,
        Some(Value::Number(n)) => n.as_f64().map(ObservationValue::Number),
        Some(Value::String(s)) => Some(ObservationValue::Text(s.clone())),
        Some(other) => {
            return Err(violation(
                index,
                format!("value must be a number or string, got {}", kind_of(other)),
            ))
        }
    };

    Ok(TestObservation {
        value,
        minlimit: bound(fields, "minlimit").map_err(|m| violation(index, m))?,
        maxlimit: bound(fields, "maxlimit").map_err(|m| violation(index, m))?,
        unit: optional_text(fields, "unit").map_err(|m| violation(index, m))?,
        timestamp: optional_text(fields, "timestamp").map_err(|m| violation(index, m))?,
        test_type,
    })
}

/// Field value, treating an explicit `null` the same as an absent key.
fn field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|v| !v.is_null())
}

/// Reference bound: a number or a numeric string. Text such as "N/A" counts
/// as no bound, so the observation is later skipped rather than rejected.
fn bound(fields: &Map<String, Value>, name: &str) -> Result<Option<f64>, String> {
    match field(fields, name) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => {
            let parsed = s.trim().parse::<f64>().ok().filter(|n| n.is_finite());
            if parsed.is_none() {
                tracing::debug!(field = name, raw = %s, "Non-numeric reference bound treated as absent");
            }
            Ok(parsed)
        }
        Some(other) => Err(format!(
            "{name} must be a number, got {}",
            kind_of(other)
        )),
    }
}

fn optional_text(fields: &Map<String, Value>, name: &str) -> Result<Option<String>, String> {
    match field(fields, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!(
            "{name} must be a string or null, got {}",
            kind_of(other)
        )),
    }
}

fn violation(index: usize, message: String) -> StructuringError {
    StructuringError::SchemaViolation(format!("item {index}: {message}"))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
