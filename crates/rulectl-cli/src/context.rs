//! Per-invocation context: settings, state directory and shutdown signal

use rulectl_core::remote::{self, Shutdown};
use rulectl_core::{LocalStore, Settings, StateDir, SyncClient, Workspace};

use crate::error::Result;

/// Everything a command needs to reach local state and the platform.
pub struct Context {
    pub settings: Settings,
    pub state: StateDir,
    pub shutdown: Shutdown,
}

impl Context {
    /// Open (bootstrapping if needed) the configured state directory.
    pub fn new(settings: Settings, shutdown: Shutdown) -> Result<Self> {
        let state = StateDir::open(settings.state_dir()?)?;
        Ok(Self {
            settings,
            state,
            shutdown,
        })
    }

    pub fn active_workspace(&self) -> Result<Workspace> {
        Ok(self.state.require_active()?)
    }

    pub fn store(&self, workspace: &Workspace) -> Result<LocalStore> {
        Ok(self.state.open_store(workspace)?)
    }

    /// Store of the active workspace.
    pub fn active_store(&self) -> Result<LocalStore> {
        let workspace = self.active_workspace()?;
        self.store(&workspace)
    }

    /// Remote client for `workspace`; fails if credentials are missing.
    pub fn remote(&self, workspace: &Workspace) -> Result<remote::RemoteClient> {
        Ok(remote::connect(&self.settings, workspace, self.shutdown.clone())?)
    }

    pub fn sync_client(&self, workspace: &Workspace) -> Result<SyncClient> {
        Ok(SyncClient::new(self.remote(workspace)?))
    }

    pub fn has_credentials(&self) -> bool {
        self.settings.credentials().is_ok()
    }
}
