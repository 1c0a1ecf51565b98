//! Baseline: the last-synced view of the remote tree
//!
//! The diff engine compares live records against these entries. An entry
//! exists for every entity known to exist remotely as of the last Refresh
//! or the last committed Change.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Entity, EntityId, EntityKind};

/// Baseline format version
pub const BASELINE_VERSION: &str = "1";

/// What was last synced for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub checksum: String,
    pub content: Value,
}

impl BaselineEntry {
    pub fn from_entity(entity: &Entity) -> Self {
        let content = entity.content();
        Self {
            remote_id: entity.remote_id().map(str::to_string),
            parent: entity.parent().cloned(),
            name: entity.name().map(str::to_string),
            checksum: rulectl_fs::compute_json_checksum(&content),
            content,
        }
    }

    /// Whether `entity` still carries exactly the synced content.
    pub fn matches(&self, entity: &Entity) -> bool {
        self.content == entity.content()
    }
}

/// Per-workspace baseline document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    version: String,
    pub org_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    rulesets: BTreeMap<EntityId, BaselineEntry>,
    #[serde(default)]
    rules: BTreeMap<EntityId, BaselineEntry>,
    #[serde(default)]
    tags: BTreeMap<EntityId, BaselineEntry>,
}

impl Baseline {
    pub fn new(org_id: impl Into<String>) -> Self {
        Self {
            version: BASELINE_VERSION.to_string(),
            org_id: org_id.into(),
            refreshed_at: None,
            committed_at: None,
            rulesets: BTreeMap::new(),
            rules: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn entries(&self, kind: EntityKind) -> &BTreeMap<EntityId, BaselineEntry> {
        match kind {
            EntityKind::Ruleset => &self.rulesets,
            EntityKind::Rule => &self.rules,
            EntityKind::Tags => &self.tags,
        }
    }

    fn entries_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<EntityId, BaselineEntry> {
        match kind {
            EntityKind::Ruleset => &mut self.rulesets,
            EntityKind::Rule => &mut self.rules,
            EntityKind::Tags => &mut self.tags,
        }
    }

    pub fn get(&self, kind: EntityKind, id: &EntityId) -> Option<&BaselineEntry> {
        self.entries(kind).get(id)
    }

    pub fn contains(&self, kind: EntityKind, id: &EntityId) -> bool {
        self.entries(kind).contains_key(id)
    }

    /// Record `entity` as synced.
    pub fn record(&mut self, entity: &Entity) {
        self.entries_mut(entity.kind())
            .insert(entity.id().clone(), BaselineEntry::from_entity(entity));
    }

    pub fn remove(&mut self, kind: EntityKind, id: &EntityId) -> Option<BaselineEntry> {
        self.entries_mut(kind).remove(id)
    }

    /// Forget a ruleset together with its rules and their tags, which the
    /// platform removes along with it.
    pub fn remove_ruleset(&mut self, id: &EntityId) {
        self.rulesets.remove(id);
        let rules: Vec<EntityId> = self
            .rules
            .iter()
            .filter(|(_, entry)| entry.parent.as_ref() == Some(id))
            .map(|(rule, _)| rule.clone())
            .collect();
        for rule in &rules {
            self.rules.remove(rule);
            self.tags.remove(rule);
        }
    }

    /// Remote ID last synced for an entity. Tag-sets resolve to their rule.
    pub fn remote_id(&self, kind: EntityKind, id: &EntityId) -> Option<&str> {
        let kind = match kind {
            EntityKind::Tags => EntityKind::Rule,
            other => other,
        };
        self.get(kind, id).and_then(|e| e.remote_id.as_deref())
    }

    /// Status an entity with this content would have against the baseline.
    pub fn status_of(&self, entity: &Entity) -> super::EntityStatus {
        use super::EntityStatus;
        match self.get(entity.kind(), entity.id()) {
            Some(entry) if entry.matches(entity) => EntityStatus::Unmodified,
            Some(_) => EntityStatus::Modified,
            // An empty tag-set that was never synced is indistinguishable
            // from no tags at all.
            None if matches!(entity, Entity::Tags(t) if t.is_empty()) => {
                EntityStatus::Unmodified
            }
            None => EntityStatus::Created,
        }
    }
}
