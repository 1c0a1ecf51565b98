//! Entity Model
//!
//! Typed representations of the Organization tree: [`Ruleset`]s own
//! [`Rule`]s, and every Rule carries exactly one [`TagSet`]. Entities are
//! built from raw JSON documents with validation, compare structurally
//! through [`Entity::content`], and serialize losslessly.

mod entity;
mod ids;
mod rule;
mod ruleset;
mod tags;

pub use entity::Entity;
pub use ids::{EntityId, EntityKind, LOCAL_ID_SUFFIX};
pub use rule::Rule;
pub use ruleset::Ruleset;
pub use tags::TagSet;

use serde_json::{Map, Value};

/// Fields the platform rewrites on every change; ignored by equality.
pub const VOLATILE_FIELDS: &[&str] = &["createdAt", "updatedAt"];

/// Copy of `map` without volatile fields.
pub(crate) fn strip_volatile(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !VOLATILE_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Require `doc` to be a JSON object.
pub(crate) fn expect_object<'a>(
    doc: &'a Value,
    what: &str,
) -> crate::Result<&'a Map<String, Value>> {
    doc.as_object()
        .ok_or_else(|| crate::Error::validation(format!("{what} document must be a JSON object")))
}

/// Extract a required, non-empty string field.
pub(crate) fn required_str(
    map: &Map<String, Value>,
    field: &str,
    what: &str,
) -> crate::Result<String> {
    match map.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(crate::Error::validation(format!(
            "{what} field '{field}' must not be empty"
        ))),
        Some(_) => Err(crate::Error::validation(format!(
            "{what} field '{field}' must be a string"
        ))),
        None => Err(crate::Error::validation(format!(
            "{what} is missing required field '{field}'"
        ))),
    }
}
