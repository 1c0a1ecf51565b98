//! Ruleset entity

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EntityId, expect_object, required_str, strip_volatile};
use crate::{Error, Result};

/// Fields that describe membership or identity rather than ruleset content.
const NON_METADATA_FIELDS: &[&str] = &["id", "name", "rules", "ruleIds"];

/// A named group of rules, owned by one Organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    pub id: EntityId,
    /// Platform ID; `None` until the ruleset has been created remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub name: String,
    /// Every other field of the ruleset document, stored verbatim.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Ruleset {
    /// Build a ruleset from a user-supplied document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the document is not an object or has
    /// no usable `name`.
    pub fn from_json(id: EntityId, remote_id: Option<String>, doc: &Value) -> Result<Self> {
        let map = expect_object(doc, "ruleset")?;
        let name = required_str(map, "name", "ruleset")?;
        let metadata = map
            .iter()
            .filter(|(key, _)| !NON_METADATA_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            id,
            remote_id,
            name,
            metadata,
        })
    }

    /// Build a ruleset from a platform response, keyed by its platform ID.
    pub fn from_remote(doc: &Value) -> Result<Self> {
        let map = expect_object(doc, "ruleset")?;
        let remote_id = required_str(map, "id", "ruleset").map_err(|_| {
            Error::validation("remote ruleset is missing its 'id'".to_string())
        })?;
        Self::from_json(EntityId::new(remote_id.clone()), Some(remote_id), doc)
    }

    /// Comparable content: name plus non-volatile metadata.
    pub fn content(&self) -> Value {
        let mut content = Map::new();
        content.insert("name".into(), Value::String(self.name.clone()));
        content.insert("metadata".into(), Value::Object(strip_volatile(&self.metadata)));
        Value::Object(content)
    }

    /// Body sent to the platform on create/update.
    pub fn to_payload(&self) -> Value {
        let mut payload = strip_volatile(&self.metadata);
        payload.insert("name".into(), Value::String(self.name.clone()));
        Value::Object(payload)
    }
}
