//! Text and metadata projection.
//!
//! The text blob is what gets embedded; the metadata travels with the
//! vector record and comes back verbatim on retrieval.

use kappa_types::ingestor::IngestorSpec;
use kappa_types::memory::{Metadata, NAMESPACE_KEY};
use serde_json::{Map, Value};

use super::path::extract;

/// Build the indexable text for `payload`.
///
/// Resolved fields are joined with newlines in declaration order. Returns an
/// empty string when no field resolves, which marks a graph-only entry.
pub fn project_text(spec: &IngestorSpec, payload: &Value) -> String {
    spec.text_fields
        .iter()
        .filter_map(|field| extract(payload, Some(field)))
        .map(stringify)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the flat metadata map for `payload`.
///
/// Unresolved paths are dropped; `namespace` is always present.
pub fn project_metadata(spec: &IngestorSpec, payload: &Value, namespace: &str) -> Metadata {
    let mut metadata: Metadata = spec
        .metadata
        .iter()
        .filter_map(|(key, path)| extract(payload, Some(path)).map(|v| (key.clone(), v.clone())))
        .collect();
    metadata.insert(NAMESPACE_KEY.to_string(), Value::String(namespace.to_string()));
    metadata
}

/// Strings verbatim; other scalars as JSON; containers as canonical JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => canonical_json(value),
        other => other.to_string(),
    }
}

/// Serialize with object keys sorted at every level.
pub fn canonical_json(value: &Value) -> String {
    canonicalize(value).to_string()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
