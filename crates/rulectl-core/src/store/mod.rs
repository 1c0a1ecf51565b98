//! Local Store
//!
//! File-backed mirror of one workspace. Every entity lives in its own JSON
//! record under `mirror/`, wrapped in a [`Record`] envelope carrying its
//! pending-change marker, next to the workspace [`Baseline`].
//!
//! All writes go through [`rulectl_fs::io::write_atomic`] while holding the
//! store lock exclusively; reads take it shared. Refresh and Push hold the
//! separate workspace lock for their whole duration (see
//! [`LocalStore::lock_workspace`]).

mod baseline;
mod layout;
mod record;
mod snapshot;

pub use baseline::{BASELINE_VERSION, Baseline, BaselineEntry};
pub use layout::StoreLayout;
pub use record::{EntityStatus, Record};
pub use snapshot::Snapshot;

pub(crate) use layout::validate_segment;

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use rulectl_fs::{FileLock, LockMode, NormalizedPath, io};

use crate::model::{Entity, EntityId, EntityKind, Rule, Ruleset, TagSet};
use crate::workspace::Workspace;
use crate::{Error, Result};

type RecordMap = BTreeMap<(EntityKind, EntityId), Record>;

/// A Change that the remote accepted, ready to fold into the baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedChange {
    /// Created or updated; the entity as sent, with its remote ID set.
    Upserted(Entity),
    /// Deleted remotely.
    Removed { kind: EntityKind, id: EntityId },
}

/// Complete remote tree fetched by Refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirrorTree {
    pub rulesets: Vec<Ruleset>,
    pub rules: Vec<Rule>,
    pub tags: Vec<TagSet>,
}

/// Held while a Refresh or Push runs against a workspace.
#[derive(Debug)]
pub struct WorkspaceLock {
    _lock: FileLock,
}

/// File-backed store for one workspace.
#[derive(Debug, Clone)]
pub struct LocalStore {
    workspace: Workspace,
    layout: StoreLayout,
}

impl LocalStore {
    /// Open the store rooted at `dir`, recovering from an interrupted
    /// Refresh if one left staging directories behind.
    pub fn open(dir: impl Into<NormalizedPath>, workspace: Workspace) -> Result<Self> {
        let store = Self {
            workspace,
            layout: StoreLayout::new(dir.into()),
        };
        store.recover()?;
        Ok(store)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Whether a Refresh has ever populated this workspace.
    pub fn has_mirror(&self) -> bool {
        StoreLayout::baseline_file(&self.layout.mirror()).exists()
    }

    /// Take the workspace lock without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkspaceLocked`] if another Refresh or Push holds it.
    pub fn lock_workspace(&self) -> Result<WorkspaceLock> {
        match FileLock::try_exclusive(&self.layout.workspace_lock()) {
            Ok(lock) => Ok(WorkspaceLock { _lock: lock }),
            Err(rulectl_fs::Error::LockHeld { .. }) => Err(Error::WorkspaceLocked {
                workspace: self.workspace.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a live entity.
    pub fn get(&self, kind: EntityKind, id: &EntityId) -> Result<Entity> {
        self.record(kind, id)?
            .filter(Record::is_live)
            .map(|r| r.entity)
            .ok_or_else(|| Error::not_found(kind, id))
    }

    /// Fetch a record, tombstones included.
    pub fn record(&self, kind: EntityKind, id: &EntityId) -> Result<Option<Record>> {
        let _lock = self.read_lock()?;
        let mut records = self.load_records(&self.layout.mirror())?;
        Ok(records.remove(&(kind, id.clone())))
    }

    /// Live entities of `kind`, optionally restricted to one parent.
    pub fn list(&self, kind: EntityKind, parent: Option<&EntityId>) -> Result<Vec<Entity>> {
        let _lock = self.read_lock()?;
        let records = self.load_records(&self.layout.mirror())?;
        Ok(records
            .into_values()
            .filter(|r| r.is_live() && r.entity.kind() == kind)
            .map(|r| r.entity)
            .filter(|e| parent.is_none() || e.parent() == parent)
            .collect())
    }

    /// Every record in the workspace, tombstones included.
    pub fn records(&self) -> Result<Vec<Record>> {
        let _lock = self.read_lock()?;
        Ok(self
            .load_records(&self.layout.mirror())?
            .into_values()
            .collect())
    }

    /// The current baseline; empty if the workspace was never refreshed.
    pub fn baseline(&self) -> Result<Baseline> {
        let _lock = self.read_lock()?;
        self.load_baseline(&self.layout.mirror())
    }

    /// Create or replace an entity, stamping its status against the
    /// baseline. A new rule gets an empty tag-set.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the key cannot name a directory
    /// - [`Error::NotFound`] if the owning ruleset or rule is not live
    /// - [`Error::Conflict`] if a name, ID or remote ID collides
    pub fn put(&self, entity: Entity) -> Result<EntityStatus> {
        validate_segment(entity.id().as_str(), "entity ID")?;

        let _lock = self.write_lock()?;
        let mirror = self.layout.mirror();
        let records = self.load_records(&mirror)?;
        let baseline = self.load_baseline(&mirror)?;

        check_put(&records, &entity)?;

        let status = baseline.status_of(&entity);
        let id = entity.id().clone();
        let kind = entity.kind();
        let record = Record::new(status, entity);
        self.write_record(&mirror, &records, &record)?;

        if kind == EntityKind::Rule && !records.contains_key(&(EntityKind::Tags, id.clone())) {
            let mut records = records;
            records.insert((kind, id.clone()), record);
            let tags = Entity::Tags(TagSet::empty(id.clone()));
            let tags_status = baseline.status_of(&tags);
            self.write_record(&mirror, &records, &Record::new(tags_status, tags))?;
        }

        tracing::debug!(workspace = %self.workspace, %kind, %id, ?status, "Entity staged");
        Ok(status)
    }

    /// Stage a batch of new entities as one edit.
    ///
    /// The whole batch is checked before anything is written, and a failed
    /// write removes the records already written, so the batch lands whole
    /// or not at all. Owners must precede what they own; rules without a
    /// tag-set in the batch get an empty one.
    ///
    /// # Errors
    ///
    /// As [`LocalStore::put`], plus [`Error::Conflict`] if a key is taken.
    pub fn put_new(&self, entities: Vec<Entity>) -> Result<()> {
        let _lock = self.write_lock()?;
        let mirror = self.layout.mirror();
        let mut records = self.load_records(&mirror)?;
        let baseline = self.load_baseline(&mirror)?;

        let mut batch: Vec<Record> = Vec::with_capacity(entities.len());
        for entity in entities {
            validate_segment(entity.id().as_str(), "entity ID")?;
            let key = (entity.kind(), entity.id().clone());
            if records.contains_key(&key) {
                return Err(Error::conflict(entity.kind(), "ID", entity.id().as_str()));
            }
            check_put(&records, &entity)?;
            let record = Record::new(baseline.status_of(&entity), entity);
            records.insert(key, record.clone());
            batch.push(record);
        }

        let untagged: Vec<EntityId> = batch
            .iter()
            .filter(|r| r.entity.kind() == EntityKind::Rule)
            .map(|r| r.entity.id().clone())
            .filter(|id| !records.contains_key(&(EntityKind::Tags, id.clone())))
            .collect();
        for id in untagged {
            let tags = Entity::Tags(TagSet::empty(id.clone()));
            let record = Record::new(baseline.status_of(&tags), tags);
            records.insert((EntityKind::Tags, id), record.clone());
            batch.push(record);
        }

        for (index, record) in batch.iter().enumerate() {
            if let Err(e) = self.write_record(&mirror, &records, record) {
                self.discard(&mirror, &batch[..=index]);
                return Err(e);
            }
        }

        tracing::debug!(workspace = %self.workspace, entities = batch.len(), "Entities staged");
        Ok(())
    }

    /// Remove records written by an unfinished batch of new entities.
    fn discard(&self, mirror: &NormalizedPath, written: &[Record]) {
        for record in written.iter().rev() {
            let dir = match &record.entity {
                Entity::Ruleset(ruleset) => StoreLayout::ruleset_dir(mirror, &ruleset.id),
                Entity::Rule(rule) => StoreLayout::rule_dir(mirror, &rule.ruleset_id, &rule.id),
                Entity::Tags(_) => continue,
            };
            if let Err(e) = io::remove_dir_all(&dir) {
                tracing::warn!(path = %dir, error = %e, "Failed to discard partial edit");
            }
        }
    }

    /// Delete an entity locally.
    ///
    /// Never-synced entities vanish at once; synced ones become tombstones
    /// until pushed. Deleting a ruleset deletes its rules. Deleting tags
    /// resets them to an empty set.
    pub fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<()> {
        let _lock = self.write_lock()?;
        let mirror = self.layout.mirror();
        let records = self.load_records(&mirror)?;
        let baseline = self.load_baseline(&mirror)?;

        let record = records
            .get(&(kind, id.clone()))
            .filter(|r| r.is_live())
            .ok_or_else(|| Error::not_found(kind, id))?;

        match &record.entity {
            Entity::Tags(_) => {
                let tags = Entity::Tags(TagSet::empty(id.clone()));
                let status = baseline.status_of(&tags);
                self.write_record(&mirror, &records, &Record::new(status, tags))?;
            }
            Entity::Rule(rule) => {
                self.remove_rule(&mirror, &baseline, rule)?;
            }
            Entity::Ruleset(ruleset) => {
                let rules: Vec<&Rule> = records
                    .values()
                    .filter_map(|r| match &r.entity {
                        Entity::Rule(rule) if rule.ruleset_id == *id => Some(rule),
                        _ => None,
                    })
                    .collect();
                for rule in rules {
                    self.remove_rule(&mirror, &baseline, rule)?;
                }
                if baseline.contains(EntityKind::Ruleset, id) {
                    let tombstone = Record::new(EntityStatus::Deleted, ruleset.clone().into());
                    self.write_record(&mirror, &records, &tombstone)?;
                } else {
                    io::remove_dir_all(&StoreLayout::ruleset_dir(&mirror, id))?;
                }
            }
        }

        tracing::debug!(workspace = %self.workspace, %kind, %id, "Entity deleted");
        Ok(())
    }

    /// Consistent view of all records and the baseline.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let _lock = self.read_lock()?;
        let mirror = self.layout.mirror();
        let records = self.load_records(&mirror)?;
        let baseline = self.load_baseline(&mirror)?;
        Ok(Snapshot::new(
            self.workspace.org_id(),
            records.into_values().collect(),
            baseline,
        ))
    }

    /// Fold remotely applied changes into the baseline.
    ///
    /// Entity records are rewritten first and `baseline.json` last, so a
    /// crash in between leaves the old baseline and the next plan simply
    /// recomputes the same changes. Edits staged after the plan was taken
    /// keep their pending marker.
    pub fn commit_baseline(&self, applied: &[AppliedChange]) -> Result<()> {
        if applied.is_empty() {
            return Ok(());
        }

        let _lock = self.write_lock()?;
        let mirror = self.layout.mirror();
        let mut records = self.load_records(&mirror)?;
        let mut baseline = self.load_baseline(&mirror)?;

        for change in applied {
            match change {
                AppliedChange::Upserted(entity) => {
                    baseline.record(entity);
                    let key = (entity.kind(), entity.id().clone());
                    let Some(record) = records.get(&key) else {
                        // Removed locally while in flight; the next plan
                        // deletes it remotely.
                        continue;
                    };
                    let mut current = record.entity.clone();
                    if current.remote_id().is_none()
                        && let Some(remote_id) = entity.remote_id()
                    {
                        current.set_remote_id(remote_id.to_string());
                    }
                    let status = if record.is_live() {
                        baseline.status_of(&current)
                    } else {
                        EntityStatus::Deleted
                    };
                    let updated = Record::new(status, current);
                    self.write_record(&mirror, &records, &updated)?;
                    records.insert(key, updated);
                }
                AppliedChange::Removed { kind, id } => {
                    match kind {
                        EntityKind::Ruleset => baseline.remove_ruleset(id),
                        EntityKind::Rule => {
                            baseline.remove(EntityKind::Rule, id);
                            baseline.remove(EntityKind::Tags, id);
                        }
                        EntityKind::Tags => {
                            baseline.remove(EntityKind::Tags, id);
                        }
                    }
                    self.commit_removal(&mirror, &mut records, *kind, id)?;
                }
            }
        }

        baseline.committed_at = Some(Utc::now());
        io::write_json(&StoreLayout::baseline_file(&mirror), &baseline)?;
        tracing::debug!(workspace = %self.workspace, changes = applied.len(), "Baseline committed");
        Ok(())
    }

    /// Replace the whole mirror and baseline with a freshly fetched tree.
    ///
    /// The new mirror is staged in full, then swapped in by directory
    /// renames; local edits are discarded.
    pub fn replace_all(&self, tree: &MirrorTree) -> Result<()> {
        let _lock = self.write_lock()?;
        self.swap_mirror(tree)
    }

    /// [`LocalStore::replace_all`], unless the workspace has pending edits
    /// at the moment of the swap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PendingChanges`] and leaves the store untouched if
    /// any edit is pending.
    pub fn replace_all_if_clean(&self, tree: &MirrorTree) -> Result<()> {
        let _lock = self.write_lock()?;
        let mirror = self.layout.mirror();
        let snapshot = Snapshot::new(
            self.workspace.org_id(),
            self.load_records(&mirror)?.into_values().collect(),
            self.load_baseline(&mirror)?,
        );
        if snapshot.has_pending() {
            return Err(Error::PendingChanges {
                workspace: self.workspace.to_string(),
            });
        }
        self.swap_mirror(tree)
    }

    fn swap_mirror(&self, tree: &MirrorTree) -> Result<()> {
        let incoming = self.layout.incoming();
        let previous = self.layout.previous();
        let mirror = self.layout.mirror();

        io::remove_dir_all(&incoming)?;
        let baseline = self.stage_tree(&incoming, tree)?;
        io::write_json(&StoreLayout::baseline_file(&incoming), &baseline)?;

        if mirror.exists() {
            io::remove_dir_all(&previous)?;
            io::rename(&mirror, &previous)?;
        }
        io::rename(&incoming, &mirror)?;
        io::remove_dir_all(&previous)?;

        tracing::info!(
            workspace = %self.workspace,
            rulesets = tree.rulesets.len(),
            rules = tree.rules.len(),
            "Mirror replaced"
        );
        Ok(())
    }

    fn stage_tree(&self, incoming: &NormalizedPath, tree: &MirrorTree) -> Result<Baseline> {
        let mut baseline = Baseline::new(self.workspace.org_id());
        baseline.refreshed_at = Some(Utc::now());

        let mut rule_parents: HashMap<&EntityId, &EntityId> = HashMap::new();

        for ruleset in &tree.rulesets {
            validate_segment(ruleset.id.as_str(), "ruleset ID")?;
            let entity = Entity::Ruleset(ruleset.clone());
            io::write_json(
                &StoreLayout::ruleset_file(incoming, &ruleset.id),
                &Record::new(EntityStatus::Unmodified, entity.clone()),
            )?;
            baseline.record(&entity);
        }

        for rule in &tree.rules {
            validate_segment(rule.id.as_str(), "rule ID")?;
            if !baseline.contains(EntityKind::Ruleset, &rule.ruleset_id) {
                return Err(Error::validation(format!(
                    "rule '{}' references unknown ruleset '{}'",
                    rule.id, rule.ruleset_id
                )));
            }
            let entity = Entity::Rule(rule.clone());
            io::write_json(
                &StoreLayout::rule_file(incoming, &rule.ruleset_id, &rule.id),
                &Record::new(EntityStatus::Unmodified, entity.clone()),
            )?;
            baseline.record(&entity);
            rule_parents.insert(&rule.id, &rule.ruleset_id);
        }

        let fetched: HashMap<&EntityId, &TagSet> =
            tree.tags.iter().map(|t| (&t.rule_id, t)).collect();
        for (rule_id, ruleset_id) in &rule_parents {
            let tags = fetched
                .get(rule_id)
                .map(|t| (*t).clone())
                .unwrap_or_else(|| TagSet::empty((*rule_id).clone()));
            let entity = Entity::Tags(tags);
            io::write_json(
                &StoreLayout::tags_file(incoming, ruleset_id, rule_id),
                &Record::new(EntityStatus::Unmodified, entity.clone()),
            )?;
            baseline.record(&entity);
        }

        if let Some(orphan) = tree
            .tags
            .iter()
            .find(|t| !rule_parents.contains_key(&t.rule_id))
        {
            return Err(Error::validation(format!(
                "tags reference unknown rule '{}'",
                orphan.rule_id
            )));
        }

        Ok(baseline)
    }

    fn recover(&self) -> Result<()> {
        let incoming = self.layout.incoming();
        let previous = self.layout.previous();
        if !incoming.exists() && !previous.exists() {
            return Ok(());
        }

        let _lock = self.write_lock()?;
        let mirror = self.layout.mirror();
        if previous.exists() {
            if mirror.exists() {
                tracing::warn!(workspace = %self.workspace, "Removing mirror left by an interrupted refresh");
                io::remove_dir_all(&previous)?;
            } else {
                tracing::warn!(workspace = %self.workspace, "Restoring mirror after an interrupted refresh");
                io::rename(&previous, &mirror)?;
            }
        }
        if incoming.exists() {
            tracing::warn!(workspace = %self.workspace, "Discarding incomplete refresh");
            io::remove_dir_all(&incoming)?;
        }
        Ok(())
    }

    fn commit_removal(
        &self,
        mirror: &NormalizedPath,
        records: &mut RecordMap,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<()> {
        let key = (kind, id.clone());
        let Some(record) = records.get(&key).cloned() else {
            return Ok(());
        };

        if record.is_live() {
            // Re-created under the same key after the plan was taken: it is
            // now a local-only entity again.
            let mut entity = record.entity;
            match &mut entity {
                Entity::Ruleset(r) => r.remote_id = None,
                Entity::Rule(r) => r.remote_id = None,
                Entity::Tags(_) => {}
            }
            let updated = Record::new(EntityStatus::Created, entity);
            self.write_record(mirror, records, &updated)?;
            records.insert(key, updated);
            return Ok(());
        }

        match &record.entity {
            Entity::Rule(rule) => {
                io::remove_dir_all(&StoreLayout::rule_dir(mirror, &rule.ruleset_id, &rule.id))?;
                records.remove(&(EntityKind::Tags, id.clone()));
            }
            Entity::Ruleset(_) => {
                io::remove_dir_all(&StoreLayout::ruleset_dir(mirror, id))?;
                let rules: Vec<EntityId> = records
                    .values()
                    .filter_map(|r| match &r.entity {
                        Entity::Rule(rule) if rule.ruleset_id == *id => Some(rule.id.clone()),
                        _ => None,
                    })
                    .collect();
                for rule in rules {
                    records.remove(&(EntityKind::Rule, rule.clone()));
                    records.remove(&(EntityKind::Tags, rule));
                }
            }
            Entity::Tags(_) => {}
        }
        records.remove(&key);
        Ok(())
    }

    fn remove_rule(&self, mirror: &NormalizedPath, baseline: &Baseline, rule: &Rule) -> Result<()> {
        if baseline.contains(EntityKind::Rule, &rule.id) {
            io::write_json(
                &StoreLayout::rule_file(mirror, &rule.ruleset_id, &rule.id),
                &Record::new(EntityStatus::Deleted, rule.clone().into()),
            )?;
        } else {
            io::remove_dir_all(&StoreLayout::rule_dir(mirror, &rule.ruleset_id, &rule.id))?;
        }
        Ok(())
    }

    fn write_record(&self, mirror: &NormalizedPath, records: &RecordMap, record: &Record) -> Result<()> {
        let path = record_path(
            mirror,
            records,
            record.entity.kind(),
            record.entity.id(),
            record.entity.parent(),
        )?;
        io::write_json(&path, record)?;
        Ok(())
    }

    fn load_baseline(&self, mirror: &NormalizedPath) -> Result<Baseline> {
        let path = StoreLayout::baseline_file(mirror);
        if path.exists() {
            Ok(io::read_json(&path)?)
        } else {
            Ok(Baseline::new(self.workspace.org_id()))
        }
    }

    fn load_records(&self, mirror: &NormalizedPath) -> Result<RecordMap> {
        let mut records = RecordMap::new();
        for ruleset_dir in io::list_dirs(mirror)? {
            let ruleset_id = EntityId::new(ruleset_dir);
            let ruleset_file = StoreLayout::ruleset_file(mirror, &ruleset_id);
            if ruleset_file.exists() {
                insert_record(&mut records, io::read_json(&ruleset_file)?);
            }

            for rule_dir in io::list_dirs(&StoreLayout::ruleset_dir(mirror, &ruleset_id))? {
                let rule_id = EntityId::new(rule_dir);
                let rule_file = StoreLayout::rule_file(mirror, &ruleset_id, &rule_id);
                if rule_file.exists() {
                    insert_record(&mut records, io::read_json(&rule_file)?);
                }
                let tags_file = StoreLayout::tags_file(mirror, &ruleset_id, &rule_id);
                if tags_file.exists() {
                    insert_record(&mut records, io::read_json(&tags_file)?);
                }
            }
        }
        Ok(records)
    }

    fn read_lock(&self) -> Result<FileLock> {
        Ok(FileLock::acquire(&self.layout.store_lock(), LockMode::Shared)?)
    }

    fn write_lock(&self) -> Result<FileLock> {
        Ok(FileLock::acquire(&self.layout.store_lock(), LockMode::Exclusive)?)
    }
}

fn insert_record(records: &mut RecordMap, record: Record) {
    records.insert((record.entity.kind(), record.entity.id().clone()), record);
}

/// Location of an entity's record. Tag-sets live with their rule, so the
/// rule's ruleset is looked up in `records`.
fn record_path(
    mirror: &NormalizedPath,
    records: &RecordMap,
    kind: EntityKind,
    id: &EntityId,
    parent: Option<&EntityId>,
) -> Result<NormalizedPath> {
    let ruleset_of = |rule: &EntityId| -> Result<EntityId> {
        match records.get(&(EntityKind::Rule, rule.clone())) {
            Some(Record {
                entity: Entity::Rule(r),
                ..
            }) => Ok(r.ruleset_id.clone()),
            _ => Err(Error::not_found(EntityKind::Rule, rule)),
        }
    };

    match kind {
        EntityKind::Ruleset => Ok(StoreLayout::ruleset_file(mirror, id)),
        EntityKind::Rule => {
            let ruleset = match parent {
                Some(p) => p.clone(),
                None => ruleset_of(id)?,
            };
            Ok(StoreLayout::rule_file(mirror, &ruleset, id))
        }
        EntityKind::Tags => Ok(StoreLayout::tags_file(mirror, &ruleset_of(id)?, id)),
    }
}

/// Uniqueness and ownership checks for a staged entity.
fn check_put(records: &RecordMap, entity: &Entity) -> Result<()> {
    let kind = entity.kind();
    let id = entity.id();

    match entity {
        Entity::Tags(_) => {
            let rule_live = records
                .get(&(EntityKind::Rule, id.clone()))
                .is_some_and(Record::is_live);
            if !rule_live {
                return Err(Error::not_found(EntityKind::Rule, id));
            }
            return Ok(());
        }
        Entity::Rule(rule) => {
            let parent_live = records
                .get(&(EntityKind::Ruleset, rule.ruleset_id.clone()))
                .is_some_and(Record::is_live);
            if !parent_live {
                return Err(Error::not_found(EntityKind::Ruleset, &rule.ruleset_id));
            }
            if let Some(Record {
                entity: Entity::Rule(existing),
                ..
            }) = records.get(&(kind, id.clone()))
                && existing.ruleset_id != rule.ruleset_id
            {
                return Err(Error::conflict(kind, "ID", id.as_str()));
            }
        }
        Entity::Ruleset(_) => {}
    }

    for other in records.values() {
        if !other.is_live() || other.entity.kind() != kind || other.entity.id() == id {
            continue;
        }
        if let (Some(a), Some(b)) = (entity.name(), other.entity.name())
            && a == b
        {
            return Err(Error::conflict(kind, "name", a));
        }
        if let (Some(a), Some(b)) = (entity.remote_id(), other.entity.remote_id())
            && a == b
        {
            return Err(Error::conflict(kind, "remote ID", a));
        }
    }
    Ok(())
}
