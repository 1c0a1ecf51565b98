//! Point-in-time view of a workspace

use std::collections::BTreeMap;

use crate::model::{Entity, EntityId, EntityKind};

use super::{Baseline, Record};

/// Every record of a workspace plus its baseline, read under one lock.
#[derive(Debug, Clone)]
pub struct Snapshot {
    org_id: String,
    records: BTreeMap<(EntityKind, EntityId), Record>,
    baseline: Baseline,
}

impl Snapshot {
    pub fn new(org_id: impl Into<String>, records: Vec<Record>, baseline: Baseline) -> Self {
        let records = records
            .into_iter()
            .map(|r| ((r.entity.kind(), r.entity.id().clone()), r))
            .collect();
        Self {
            org_id: org_id.into(),
            records,
            baseline,
        }
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn record(&self, kind: EntityKind, id: &EntityId) -> Option<&Record> {
        self.records.get(&(kind, id.clone()))
    }

    /// All records of `kind`, tombstones included, ordered by key.
    pub fn records(&self, kind: EntityKind) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(move |((k, _), _)| *k == kind)
            .map(|(_, record)| record)
    }

    /// Live entities of `kind`, ordered by key.
    pub fn live(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.records(kind)
            .filter(|r| r.is_live())
            .map(|r| &r.entity)
    }

    pub fn is_live(&self, kind: EntityKind, id: &EntityId) -> bool {
        self.record(kind, id).is_some_and(Record::is_live)
    }

    /// Whether any record carries a pending-change marker.
    pub fn has_pending(&self) -> bool {
        self.records.values().any(|r| r.status.is_pending())
    }
}
