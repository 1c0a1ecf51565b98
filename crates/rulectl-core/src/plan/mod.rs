//! Diff/Plan Engine
//!
//! Compares a [`Snapshot`](crate::store::Snapshot) of live records with its
//! baseline and produces the ordered list of remote operations a push would
//! perform. Planning never touches the network or the disk.

mod change;
mod diff;
mod validate;

pub use change::{Change, ChangeKind};
pub use diff::compute_plan;

use std::fmt;

use serde::Serialize;

/// Ordered remote operations for one workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub workspace: String,
    pub changes: Vec<Change>,
}

/// Per-kind change counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for change in &self.changes {
            match change.kind {
                ChangeKind::Create => summary.create += 1,
                ChangeKind::Update => summary.update += 1,
                ChangeKind::Delete => summary.delete += 1,
            }
        }
        summary
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "No changes. Workspace {} is up to date.", self.workspace);
        }
        let summary = self.summary();
        writeln!(
            f,
            "Plan for workspace {}: {} to create, {} to update, {} to delete",
            self.workspace, summary.create, summary.update, summary.delete
        )?;
        for change in &self.changes {
            write!(f, "\n  {change}")?;
        }
        Ok(())
    }
}
