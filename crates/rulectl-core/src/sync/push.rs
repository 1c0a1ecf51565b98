//! Push: plan and apply under the workspace lock

use crate::plan::compute_plan;
use crate::store::LocalStore;
use crate::workspace::{StateDir, Workspace};
use crate::Result;

use super::{SyncClient, SyncReport};

/// Result of pushing one workspace in a [`push_all`].
#[derive(Debug)]
pub struct WorkspacePush {
    pub workspace: Workspace,
    pub outcome: Result<SyncReport>,
}

/// Push one workspace: lock, snapshot, plan, apply.
///
/// # Errors
///
/// - [`crate::Error::WorkspaceLocked`] if a Refresh or Push is running
/// - [`crate::Error::Conflict`]/[`crate::Error::Validation`] if the plan
///   would leave an invalid state; nothing is sent
pub async fn push(store: &LocalStore, sync: &SyncClient) -> Result<SyncReport> {
    let _lock = store.lock_workspace()?;
    let snapshot = store.snapshot()?;
    let plan = compute_plan(&snapshot)?;

    if plan.is_empty() {
        tracing::info!(workspace = %store.workspace(), "Nothing to push");
        return Ok(SyncReport::new(plan.workspace));
    }

    tracing::info!(workspace = %store.workspace(), changes = plan.len(), "Pushing");
    sync.apply(store, &plan).await
}

/// Push every workspace with pending changes, one at a time.
///
/// A failure in one workspace is recorded and the rest still run.
/// `connect` builds the client for each workspace that needs one.
pub async fn push_all<F>(state: &StateDir, mut connect: F) -> Result<Vec<WorkspacePush>>
where
    F: FnMut(&Workspace) -> Result<SyncClient>,
{
    let mut results = Vec::new();

    for workspace in state.workspaces()? {
        match push_if_pending(state, &workspace, &mut connect).await {
            Ok(None) => tracing::debug!(%workspace, "No pending changes"),
            Ok(Some(report)) => results.push(WorkspacePush {
                workspace,
                outcome: Ok(report),
            }),
            Err(e) => {
                tracing::warn!(%workspace, error = %e, "Push failed");
                results.push(WorkspacePush {
                    workspace,
                    outcome: Err(e),
                });
            }
        }
    }

    Ok(results)
}

async fn push_if_pending<F>(
    state: &StateDir,
    workspace: &Workspace,
    connect: &mut F,
) -> Result<Option<SyncReport>>
where
    F: FnMut(&Workspace) -> Result<SyncClient>,
{
    let store = state.open_store(workspace)?;
    if compute_plan(&store.snapshot()?)?.is_empty() {
        return Ok(None);
    }
    let sync = connect(workspace)?;
    push(&store, &sync).await.map(Some)
}
