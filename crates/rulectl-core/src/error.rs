//! Error types for rulectl-core

use crate::model::EntityKind;
use crate::remote::RemoteError;

/// Result type for rulectl-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort the current command.
///
/// Failures of individual Changes during Apply are not represented here;
/// they are collected in a [`crate::sync::SyncReport`] as
/// [`crate::sync::SyncError`]s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed entity input
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// A Name or ID would collide with an existing entity in the Organization
    #[error("Conflict: {kind} {field} '{value}' already exists in this organization")]
    Conflict {
        kind: EntityKind,
        field: &'static str,
        value: String,
    },

    /// Referenced entity absent locally
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// A Refresh or Push already holds the workspace
    #[error("Workspace '{workspace}' is locked by another refresh or push; retry later")]
    WorkspaceLocked { workspace: String },

    /// No workspace has been selected
    #[error("Workspace '{workspace}' has pending changes that a refresh would discard")]
    PendingChanges { workspace: String },

    #[error("No workspace selected; pass --workspace <ORG_ID>")]
    NoWorkspace,

    /// Configuration missing or invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A remote call failed outside of Apply (e.g. during Refresh)
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Filesystem error from rulectl-fs
    #[error(transparent)]
    Fs(#[from] rulectl_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn conflict(kind: EntityKind, field: &'static str, value: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            field,
            value: value.into(),
        }
    }
}
