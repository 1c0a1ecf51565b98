//! Snapshot diffing

use crate::model::{Entity, EntityKind, TagSet};
use crate::store::Snapshot;
use crate::Result;

use super::validate::validate_resulting_state;
use super::{Change, Plan};

/// Compute the plan for a snapshot.
///
/// Live entities without a baseline entry become creates, live entities
/// whose content differs become updates, and baseline entries with no live
/// entity become deletes. Tag-sets are never deleted on their own; an
/// unsynced empty tag-set produces nothing.
///
/// # Errors
///
/// Returns [`crate::Error::Conflict`] or [`crate::Error::Validation`] if the
/// state after applying the plan would break a uniqueness or ownership
/// rule.
pub fn compute_plan(snapshot: &Snapshot) -> Result<Plan> {
    validate_resulting_state(snapshot)?;

    let baseline = snapshot.baseline();
    let mut changes = Vec::new();

    for kind in [EntityKind::Ruleset, EntityKind::Rule] {
        for entity in snapshot.live(kind) {
            let name = entity.name().map(str::to_string);
            let parent_remote_id = parent_remote_id(snapshot, entity);
            match baseline.get(kind, entity.id()) {
                None => changes.push(Change::create(entity, name, parent_remote_id)),
                Some(entry) if !entry.matches(entity) => {
                    let remote_id = entry
                        .remote_id
                        .clone()
                        .or_else(|| entity.remote_id().map(str::to_string));
                    changes.push(Change::update(entity, name, remote_id, parent_remote_id));
                }
                Some(_) => {}
            }
        }

        for (id, entry) in baseline.entries(kind) {
            if snapshot.is_live(kind, id) {
                continue;
            }
            let parent_remote_id = entry
                .parent
                .as_ref()
                .and_then(|p| baseline.remote_id(EntityKind::Ruleset, p))
                .map(str::to_string);
            changes.push(Change::delete(kind, id, entry, parent_remote_id));
        }
    }

    for rule in snapshot.live(EntityKind::Rule) {
        let tags = match snapshot.record(EntityKind::Tags, rule.id()) {
            Some(record) if record.is_live() => record.entity.clone(),
            _ => Entity::Tags(TagSet::empty(rule.id().clone())),
        };
        let name = rule.name().map(str::to_string);
        let rule_remote_id = remote_id_of(snapshot, EntityKind::Rule, rule);

        match baseline.get(EntityKind::Tags, rule.id()) {
            None if matches!(&tags, Entity::Tags(t) if t.is_empty()) => {}
            None => changes.push(Change::create(&tags, name, rule_remote_id)),
            Some(entry) if !entry.matches(&tags) => {
                changes.push(Change::update(&tags, name, None, rule_remote_id));
            }
            Some(_) => {}
        }
    }

    changes.sort_by(|a, b| a.rank().cmp(&b.rank()).then_with(|| a.target.cmp(&b.target)));

    tracing::debug!(workspace = snapshot.org_id(), changes = changes.len(), "Plan computed");
    Ok(Plan {
        workspace: snapshot.org_id().to_string(),
        changes,
    })
}

/// Remote ID of the entity that owns `entity`, if it exists remotely.
fn parent_remote_id(snapshot: &Snapshot, entity: &Entity) -> Option<String> {
    let parent = entity.parent()?;
    let parent_kind = match entity.kind() {
        EntityKind::Rule => EntityKind::Ruleset,
        EntityKind::Tags => EntityKind::Rule,
        EntityKind::Ruleset => return None,
    };
    snapshot
        .record(parent_kind, parent)
        .and_then(|r| r.entity.remote_id().map(str::to_string))
        .or_else(|| {
            snapshot
                .baseline()
                .remote_id(parent_kind, parent)
                .map(str::to_string)
        })
}

fn remote_id_of(snapshot: &Snapshot, kind: EntityKind, entity: &Entity) -> Option<String> {
    entity
        .remote_id()
        .or_else(|| snapshot.baseline().remote_id(kind, entity.id()))
        .map(str::to_string)
}
