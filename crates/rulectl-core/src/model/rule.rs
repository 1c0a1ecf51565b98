//! Rule entity

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EntityId, expect_object, required_str, strip_volatile};
use crate::{Error, Result};

const NON_BODY_FIELDS: &[&str] = &["id", "name", "rulesetId"];

/// A single security rule. Its body is an opaque document passed through to
/// the platform unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    /// Local key of the owning ruleset.
    pub ruleset_id: EntityId,
    pub name: String,
    pub body: Map<String, Value>,
}

impl Rule {
    /// Build a rule from a user-supplied document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the document is not an object, has
    /// no usable `name`, or has nothing besides identity fields.
    pub fn from_json(
        id: EntityId,
        remote_id: Option<String>,
        ruleset_id: EntityId,
        doc: &Value,
    ) -> Result<Self> {
        let map = expect_object(doc, "rule")?;
        let name = required_str(map, "name", "rule")?;
        let body: Map<String, Value> = map
            .iter()
            .filter(|(key, _)| !NON_BODY_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if body.is_empty() {
            return Err(Error::validation(format!("rule '{name}' has an empty body")));
        }

        Ok(Self {
            id,
            remote_id,
            ruleset_id,
            name,
            body,
        })
    }

    /// Build a rule from a platform response, keyed by its platform ID.
    pub fn from_remote(ruleset_id: EntityId, doc: &Value) -> Result<Self> {
        let map = expect_object(doc, "rule")?;
        let remote_id = required_str(map, "id", "rule")
            .map_err(|_| Error::validation("remote rule is missing its 'id'".to_string()))?;
        Self::from_json(EntityId::new(remote_id.clone()), Some(remote_id), ruleset_id, doc)
    }

    /// Comparable content: name plus non-volatile body.
    pub fn content(&self) -> Value {
        let mut content = Map::new();
        content.insert("name".into(), Value::String(self.name.clone()));
        content.insert("body".into(), Value::Object(strip_volatile(&self.body)));
        Value::Object(content)
    }

    /// Body sent to the platform on create/update.
    pub fn to_payload(&self) -> Value {
        let mut payload = strip_volatile(&self.body);
        payload.insert("name".into(), Value::String(self.name.clone()));
        Value::Object(payload)
    }

    /// The full document (name merged back into the body), as a user would
    /// edit it.
    pub fn to_document(&self) -> Value {
        let mut doc = self.body.clone();
        doc.insert("name".into(), Value::String(self.name.clone()));
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule_doc() -> Value {
        json!({
            "name": "Suspicious curl",
            "type": "File",
            "severityOfAlerts": 1,
            "filter": "command = \"curl\"",
            "rulesetId": "stale",
            "createdAt": "2021-01-01"
        })
    }

    #[test]
    fn body_is_kept_verbatim_minus_identity() {
        let rule = Rule::from_json(EntityId::new("r"), None, EntityId::new("rs"), &rule_doc())
            .unwrap();
        assert_eq!(rule.name, "Suspicious curl");
        assert_eq!(rule.body.get("filter"), Some(&json!("command = \"curl\"")));
        assert!(rule.body.contains_key("createdAt"));
        assert!(!rule.body.contains_key("rulesetId"));
    }

    #[test]
    fn payload_drops_volatile_fields() {
        let rule = Rule::from_json(EntityId::new("r"), None, EntityId::new("rs"), &rule_doc())
            .unwrap();
        let payload = rule.to_payload();
        assert_eq!(payload["name"], json!("Suspicious curl"));
        assert!(payload.get("createdAt").is_none());
    }

    #[test]
    fn name_only_document_is_rejected() {
        let err = Rule::from_json(
            EntityId::new("r"),
            None,
            EntityId::new("rs"),
            &json!({"name": "x"}),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Rule::from_json(
            EntityId::new("r"),
            None,
            EntityId::new("rs"),
            &json!({"name": "  ", "type": "File"}),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn document_round_trips_through_from_json() {
        let rule = Rule::from_json(EntityId::new("r"), None, EntityId::new("rs"), &rule_doc())
            .unwrap();
        let again = Rule::from_json(
            rule.id.clone(),
            None,
            rule.ruleset_id.clone(),
            &rule.to_document(),
        )
        .unwrap();
        assert_eq!(rule, again);
    }
}
