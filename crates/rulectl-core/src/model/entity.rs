//! Kind-erased entity

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EntityId, EntityKind, Rule, Ruleset, TagSet};

/// Any entity of the Organization tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Ruleset(Ruleset),
    Rule(Rule),
    Tags(TagSet),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Ruleset(_) => EntityKind::Ruleset,
            Self::Rule(_) => EntityKind::Rule,
            Self::Tags(_) => EntityKind::Tags,
        }
    }

    /// Local key. A tag-set shares the key of its rule.
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Ruleset(r) => &r.id,
            Self::Rule(r) => &r.id,
            Self::Tags(t) => &t.rule_id,
        }
    }

    /// Key of the owning entity, if any.
    pub fn parent(&self) -> Option<&EntityId> {
        match self {
            Self::Ruleset(_) => None,
            Self::Rule(r) => Some(&r.ruleset_id),
            Self::Tags(t) => Some(&t.rule_id),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Ruleset(r) => Some(&r.name),
            Self::Rule(r) => Some(&r.name),
            Self::Tags(_) => None,
        }
    }

    pub fn remote_id(&self) -> Option<&str> {
        match self {
            Self::Ruleset(r) => r.remote_id.as_deref(),
            Self::Rule(r) => r.remote_id.as_deref(),
            Self::Tags(_) => None,
        }
    }

    pub fn set_remote_id(&mut self, remote_id: String) {
        match self {
            Self::Ruleset(r) => r.remote_id = Some(remote_id),
            Self::Rule(r) => r.remote_id = Some(remote_id),
            Self::Tags(_) => {}
        }
    }

    /// Structural content used by the diff: name and body, without
    /// identity or volatile fields.
    pub fn content(&self) -> Value {
        match self {
            Self::Ruleset(r) => r.content(),
            Self::Rule(r) => r.content(),
            Self::Tags(t) => t.content(),
        }
    }

    pub fn to_payload(&self) -> Value {
        match self {
            Self::Ruleset(r) => r.to_payload(),
            Self::Rule(r) => r.to_payload(),
            Self::Tags(t) => t.to_payload(),
        }
    }
}

impl From<Ruleset> for Entity {
    fn from(value: Ruleset) -> Self {
        Self::Ruleset(value)
    }
}

impl From<Rule> for Entity {
    fn from(value: Rule) -> Self {
        Self::Rule(value)
    }
}

impl From<TagSet> for Entity {
    fn from(value: TagSet) -> Self {
        Self::Tags(value)
    }
}
