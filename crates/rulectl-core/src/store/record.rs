//! Record envelope stored for every entity

use serde::{Deserialize, Serialize};

use crate::model::Entity;

/// Local state of an entity relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    /// Matches the last synced content.
    Unmodified,
    /// Exists only locally.
    Created,
    /// Synced before, edited since.
    Modified,
    /// Synced before, deleted locally; kept as a tombstone until pushed.
    Deleted,
}

impl EntityStatus {
    /// Whether the entity still has an unpushed change.
    pub fn is_pending(&self) -> bool {
        !matches!(self, Self::Unmodified)
    }

    /// Single-character marker used by list output.
    pub fn marker(&self) -> char {
        match self {
            Self::Unmodified => ' ',
            Self::Created => '+',
            Self::Modified => '~',
            Self::Deleted => '-',
        }
    }
}

/// On-disk envelope: the entity plus its pending-change marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub status: EntityStatus,
    pub entity: Entity,
}

impl Record {
    pub fn new(status: EntityStatus, entity: Entity) -> Self {
        Self { status, entity }
    }

    pub fn is_live(&self) -> bool {
        self.status != EntityStatus::Deleted
    }
}
