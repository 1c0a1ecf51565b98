//! Plan execution

use std::collections::HashMap;

use crate::model::{EntityId, EntityKind};
use crate::plan::{Change, ChangeKind, Plan};
use crate::remote::{RemoteClient, RemoteError};
use crate::store::{AppliedChange, LocalStore};
use crate::Result;

use super::{FailedChange, SyncError, SyncReport};

enum Failure {
    Interrupted,
    Failed(SyncError),
}

impl From<RemoteError> for Failure {
    fn from(error: RemoteError) -> Self {
        match SyncError::from_remote(error) {
            Some(error) => Self::Failed(error),
            None => Self::Interrupted,
        }
    }
}

/// Executes plans against the platform.
#[derive(Clone)]
pub struct SyncClient {
    remote: RemoteClient,
}

impl SyncClient {
    pub fn new(remote: RemoteClient) -> Self {
        Self { remote }
    }

    pub fn remote(&self) -> &RemoteClient {
        &self.remote
    }

    /// Apply `plan` in order.
    ///
    /// Each accepted Change is committed to the baseline before the next
    /// one starts, so an interruption or crash loses at most the Change in
    /// flight. A failed Change is recorded and Apply moves on; Changes that
    /// need the failed entity's remote ID fail with
    /// [`SyncError::DependencyFailed`] without a call.
    ///
    /// # Errors
    ///
    /// Only local failures (committing to the store) abort Apply.
    pub async fn apply(&self, store: &LocalStore, plan: &Plan) -> Result<SyncReport> {
        let mut report = SyncReport::new(plan.workspace.clone());
        let mut created: HashMap<(EntityKind, EntityId), String> = HashMap::new();

        for (index, change) in plan.changes.iter().enumerate() {
            if self.remote.shutdown().is_triggered() {
                report.interrupted = true;
                report.skipped.extend(plan.changes[index..].iter().cloned());
                break;
            }

            match self.execute(change, &created).await {
                Ok(applied) => {
                    if let AppliedChange::Upserted(entity) = &applied
                        && change.kind == ChangeKind::Create
                        && let Some(remote_id) = entity.remote_id()
                    {
                        created.insert((change.entity_type, change.target.clone()), remote_id.to_string());
                    }
                    store.commit_baseline(std::slice::from_ref(&applied))?;
                    tracing::info!(workspace = %plan.workspace, change = %change, "Applied");
                    report.applied.push(change.clone());
                }
                Err(Failure::Failed(error)) => {
                    tracing::warn!(workspace = %plan.workspace, change = %change, %error, "Change failed");
                    report.failed.push(FailedChange {
                        change: change.clone(),
                        error,
                    });
                }
                Err(Failure::Interrupted) => {
                    tracing::warn!(workspace = %plan.workspace, "Push interrupted");
                    report.interrupted = true;
                    report.skipped.extend(plan.changes[index..].iter().cloned());
                    break;
                }
            }
        }

        Ok(report)
    }

    async fn execute(
        &self,
        change: &Change,
        created: &HashMap<(EntityKind, EntityId), String>,
    ) -> std::result::Result<AppliedChange, Failure> {
        let remote = &self.remote;

        if change.kind == ChangeKind::Delete {
            let target = require_remote_id(change.remote_id.as_deref(), &change.target)?;
            match change.entity_type {
                EntityKind::Ruleset => remote.delete_ruleset(target).await?,
                EntityKind::Rule => {
                    let parent = change.parent.as_ref().unwrap_or(&change.target);
                    let ruleset = require_remote_id(change.parent_remote_id.as_deref(), parent)?;
                    remote.delete_rule(ruleset, target).await?;
                }
                EntityKind::Tags => {}
            }
            return Ok(AppliedChange::Removed {
                kind: change.entity_type,
                id: change.target.clone(),
            });
        }

        let Some(entity) = &change.entity else {
            return Err(Failure::Failed(SyncError::InvalidResponse {
                message: format!("{} change for '{}' carries no entity", change.kind, change.target),
            }));
        };
        let mut entity = entity.clone();
        if entity.remote_id().is_none()
            && let Some(remote_id) = &change.remote_id
        {
            entity.set_remote_id(remote_id.clone());
        }
        let payload = entity.to_payload();

        // Owner's remote ID: known at plan time, or created earlier in this push.
        let owner_remote_id = || -> std::result::Result<String, Failure> {
            let (owner_kind, owner) = match change.entity_type {
                EntityKind::Rule => (
                    EntityKind::Ruleset,
                    change.parent.as_ref().unwrap_or(&change.target),
                ),
                _ => (EntityKind::Rule, &change.target),
            };
            change
                .parent_remote_id
                .clone()
                .or_else(|| created.get(&(owner_kind, owner.clone())).cloned())
                .ok_or_else(|| {
                    Failure::Failed(SyncError::DependencyFailed {
                        parent: owner.clone(),
                    })
                })
        };

        match (change.entity_type, change.kind) {
            (EntityKind::Ruleset, ChangeKind::Create) => {
                let id = remote.create_ruleset(payload).await?;
                entity.set_remote_id(id);
            }
            (EntityKind::Ruleset, _) => {
                let target = require_remote_id(change.remote_id.as_deref(), &change.target)?;
                remote.update_ruleset(target, payload).await?;
            }
            (EntityKind::Rule, ChangeKind::Create) => {
                let ruleset = owner_remote_id()?;
                let id = remote.create_rule(&ruleset, payload).await?;
                entity.set_remote_id(id);
            }
            (EntityKind::Rule, _) => {
                let ruleset = owner_remote_id()?;
                let target = require_remote_id(change.remote_id.as_deref(), &change.target)?;
                remote.update_rule(&ruleset, target, payload).await?;
            }
            (EntityKind::Tags, _) => {
                let rule = owner_remote_id()?;
                remote.set_tags(&rule, payload).await?;
            }
        }

        Ok(AppliedChange::Upserted(entity))
    }
}

fn require_remote_id<'a>(
    remote_id: Option<&'a str>,
    owner: &EntityId,
) -> std::result::Result<&'a str, Failure> {
    remote_id.ok_or_else(|| {
        Failure::Failed(SyncError::DependencyFailed {
            parent: owner.clone(),
        })
    })
}
