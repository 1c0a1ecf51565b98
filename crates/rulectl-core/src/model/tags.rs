//! Tag-set entity

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EntityId, expect_object};
use crate::{Error, Result};

/// Flat tag key -> value mapping attached 1:1 to a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSet {
    /// Local key of the rule these tags belong to.
    pub rule_id: EntityId,
    #[serde(default)]
    pub tags: BTreeMap<String, Value>,
}

impl TagSet {
    pub fn empty(rule_id: EntityId) -> Self {
        Self {
            rule_id,
            tags: BTreeMap::new(),
        }
    }

    /// Build a tag-set from a flat JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the document is not an object or any
    /// value is itself an object or array.
    pub fn from_json(rule_id: EntityId, doc: &Value) -> Result<Self> {
        let map = expect_object(doc, "tags")?;
        let mut tags = BTreeMap::new();
        for (key, value) in map {
            if value.is_object() || value.is_array() {
                return Err(Error::validation(format!(
                    "tag '{key}' must have a scalar value"
                )));
            }
            tags.insert(key.clone(), value.clone());
        }
        Ok(Self { rule_id, tags })
    }

    /// Build a tag-set from a platform response, dropping the `errors` field
    /// the platform attaches to tag responses.
    pub fn from_remote(rule_id: EntityId, doc: &Value) -> Result<Self> {
        let mut map = expect_object(doc, "tags")?.clone();
        map.remove("errors");
        Self::from_json(rule_id, &Value::Object(map))
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn content(&self) -> Value {
        Value::Object(self.tags.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Map<_, _>>())
    }

    pub fn to_payload(&self) -> Value {
        self.content()
    }
}
