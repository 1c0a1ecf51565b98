//! Remote Sync Client
//!
//! Executes a [`Plan`](crate::plan::Plan) against the platform and folds
//! each accepted Change into the baseline as it goes.

mod apply;
mod push;
mod report;

pub use apply::SyncClient;
pub use push::{WorkspacePush, push, push_all};
pub use report::{FailedChange, SyncError, SyncReport};
