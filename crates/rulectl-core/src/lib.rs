//! Core engine for rulectl
//!
//! Mirrors an Organization's rulesets, rules and tags into a local store,
//! computes plans from local edits, and pushes them to the platform.
//!
//! # Modules
//!
//! - [`model`] - typed entities and their validation
//! - [`store`] - file-backed mirror with baseline and locking
//! - [`workspace`] - workspaces and the state directory
//! - [`plan`] - diffing local state against the baseline
//! - [`remote`] - platform API client with retry and cancellation
//! - [`sync`] - applying plans (push)
//! - [`refresh`] - replacing the mirror from the platform
//! - [`edit`] - entity editing and copying
//! - [`config`] - user settings

pub mod config;
pub mod edit;
pub mod error;
pub mod model;
pub mod plan;
pub mod refresh;
pub mod remote;
pub mod store;
pub mod sync;
pub mod workspace;

pub use config::{ApplyMode, Settings};
pub use edit::Editor;
pub use error::{Error, Result};
pub use model::{Entity, EntityId, EntityKind, Rule, Ruleset, TagSet};
pub use plan::{Change, ChangeKind, Plan, compute_plan};
pub use refresh::{RefreshSummary, refresh, refresh_clean};
pub use remote::{RemoteClient, RemoteError, RetryPolicy, Shutdown};
pub use store::{EntityStatus, LocalStore, Snapshot};
pub use sync::{SyncClient, SyncError, SyncReport, push, push_all};
pub use workspace::{StateDir, Workspace};
