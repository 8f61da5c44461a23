//! Field projection over loosely-typed JSON.
//!
//! The typed records in [`crate::model`] are the normal decode path. These
//! helpers exist for renderers that work on raw rows whose schema is not
//! trusted.

use serde_json::{Map, Value};

/// Returns `source[field]`, or `default` when the field is missing or `null`.
///
/// A `None` source, or a source that is not a JSON object, yields `default`.
pub fn project_field(source: Option<&Value>, field: &str, default: &Value) -> Value {
    match source.and_then(|s| s.get(field)) {
        None | Some(Value::Null) => default.clone(),
        Some(v) => v.clone(),
    }
}

/// Builds a new object holding exactly `fields`, each projected with
/// [`project_field`].
pub fn project_fields(source: Option<&Value>, fields: &[&str], default: &Value) -> Map<String, Value> {
    fields
        .iter()
        .map(|field| (field.to_string(), project_field(source, field, default)))
        .collect()
}
