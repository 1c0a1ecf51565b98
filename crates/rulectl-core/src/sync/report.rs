//! Apply results

use crate::model::EntityId;
use crate::plan::Change;
use crate::remote::RemoteError;

/// Why a single Change failed. Other Changes in the same push proceed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("rejected by the platform ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    #[error("platform unavailable after {attempts} attempts: {message}")]
    RemoteUnavailable { attempts: u32, message: String },

    /// The owning ruleset or rule has no remote ID, usually because its own
    /// create failed earlier in this push. No call was made.
    #[error("depends on '{parent}', which does not exist remotely")]
    DependencyFailed { parent: EntityId },

    #[error("unexpected response: {message}")]
    InvalidResponse { message: String },
}

impl SyncError {
    /// Map a remote failure; `None` for an interruption, which is not a
    /// failure of the Change.
    pub fn from_remote(error: RemoteError) -> Option<Self> {
        match error {
            RemoteError::RateLimited { attempts } => Some(Self::RateLimitExceeded { attempts }),
            RemoteError::Rejected { status, message } => Some(Self::RemoteRejected { status, message }),
            RemoteError::Unavailable { attempts, message } => {
                Some(Self::RemoteUnavailable { attempts, message })
            }
            RemoteError::InvalidResponse { message } => Some(Self::InvalidResponse { message }),
            RemoteError::Interrupted => None,
        }
    }
}

/// A Change that did not reach the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedChange {
    pub change: Change,
    pub error: SyncError,
}

/// Outcome of applying one workspace's plan.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub workspace: String,
    /// Applied and committed to the baseline, in order.
    pub applied: Vec<Change>,
    pub failed: Vec<FailedChange>,
    /// Not attempted because of an interruption.
    pub skipped: Vec<Change>,
    pub interrupted: bool,
}

impl SyncReport {
    pub fn new(workspace: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            applied: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            interrupted: false,
        }
    }

    /// Everything in the plan was applied.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.interrupted
    }

    /// Nothing was attempted.
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.failed.is_empty() && self.skipped.is_empty()
    }
}
