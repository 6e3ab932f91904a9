//! Dot-path extraction over JSON payloads.
//!
//! `extract` is total: a missing segment, a non-object intermediate value,
//! an absent path or a JSON `null` all yield `None`.

use serde_json::Value;

/// Resolve `path` (e.g. `endpoint.name`) inside `payload`.
pub fn extract<'a>(payload: &'a Value, path: Option<&str>) -> Option<&'a Value> {
    let path = path.filter(|p| !p.is_empty())?;

    let mut current = payload;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }

    if current.is_null() { None } else { Some(current) }
}

/// Render a scalar value as a node id.
///
/// Strings are used verbatim, numbers and booleans via their JSON form.
/// Empty strings, objects and arrays are not ids.
pub fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
