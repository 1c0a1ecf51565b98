//! A single remote operation

use std::fmt;

use serde::Serialize;

use crate::model::{Entity, EntityId, EntityKind};
use crate::store::BaselineEntry;

/// What a [`Change`] does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn symbol(&self) -> char {
        match self {
            Self::Create => '+',
            Self::Update => '~',
            Self::Delete => '-',
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// One remote operation needed to make the Organization match local state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub entity_type: EntityKind,
    /// Local key of the target. Tag changes target their rule's key.
    pub target: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    /// Remote ID of the owning ruleset (rules) or rule (tags), when known at
    /// plan time. A parent created earlier in the same push fills it in
    /// during Apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_remote_id: Option<String>,
    /// Entity as it will be sent; `None` for deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<Entity>,
}

impl Change {
    pub(crate) fn create(entity: &Entity, name: Option<String>, parent_remote_id: Option<String>) -> Self {
        Self {
            kind: ChangeKind::Create,
            entity_type: entity.kind(),
            target: entity.id().clone(),
            name,
            parent: entity.parent().cloned(),
            remote_id: None,
            parent_remote_id,
            entity: Some(entity.clone()),
        }
    }

    pub(crate) fn update(
        entity: &Entity,
        name: Option<String>,
        remote_id: Option<String>,
        parent_remote_id: Option<String>,
    ) -> Self {
        Self {
            kind: ChangeKind::Update,
            entity_type: entity.kind(),
            target: entity.id().clone(),
            name,
            parent: entity.parent().cloned(),
            remote_id,
            parent_remote_id,
            entity: Some(entity.clone()),
        }
    }

    pub(crate) fn delete(
        kind: EntityKind,
        id: &EntityId,
        entry: &BaselineEntry,
        parent_remote_id: Option<String>,
    ) -> Self {
        Self {
            kind: ChangeKind::Delete,
            entity_type: kind,
            target: id.clone(),
            name: entry.name.clone(),
            parent: entry.parent.clone(),
            remote_id: entry.remote_id.clone(),
            parent_remote_id,
            entity: None,
        }
    }

    /// Position of this change's group in the execution order.
    pub(crate) fn rank(&self) -> u8 {
        match (self.kind, self.entity_type) {
            (ChangeKind::Delete, EntityKind::Rule) => 0,
            (ChangeKind::Delete, EntityKind::Ruleset) => 1,
            (ChangeKind::Create, EntityKind::Ruleset) => 2,
            (ChangeKind::Update, EntityKind::Ruleset) => 3,
            (ChangeKind::Create, EntityKind::Rule) => 4,
            (ChangeKind::Update, EntityKind::Rule) => 5,
            (_, EntityKind::Tags) => 6,
        }
    }

    pub fn label(&self) -> String {
        match (&self.name, self.entity_type) {
            (Some(name), EntityKind::Tags) => format!("tags of rule \"{name}\" ({})", self.target),
            (None, EntityKind::Tags) => format!("tags of rule {}", self.target),
            (Some(name), kind) => format!("{kind} \"{name}\" ({})", self.target),
            (None, kind) => format!("{kind} {}", self.target),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.symbol(), self.label())
    }
}
