//! Entity identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Suffix marking keys generated for entities that do not exist remotely yet.
pub const LOCAL_ID_SUFFIX: &str = "-localonly";

/// Local key of an entity within a workspace.
///
/// Entities pulled by Refresh are keyed by their platform ID. Entities
/// created locally get a generated `<uuid>-localonly` key that is kept even
/// after a push assigns them a platform ID (held in `remote_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh key for a locally created entity.
    pub fn generate_local() -> Self {
        Self(format!("{}{}", Uuid::new_v4(), LOCAL_ID_SUFFIX))
    }

    pub fn is_local(&self) -> bool {
        self.0.ends_with(LOCAL_ID_SUFFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The three entity types that can be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Ruleset,
    Rule,
    Tags,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ruleset => "ruleset",
            Self::Rule => "rule",
            Self::Tags => "tags",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ruleset" | "rulesets" => Ok(Self::Ruleset),
            "rule" | "rules" => Ok(Self::Rule),
            "tags" | "tag" => Ok(Self::Tags),
            other => Err(crate::Error::validation(format!("unknown entity kind '{other}'"))),
        }
    }
}
