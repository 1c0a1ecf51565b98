//! Workspaces and the state directory
//!
//! A workspace is the local mirror of one Organization. The state directory
//! holds every workspace under `workspaces/<org_id>/` plus `state.json`,
//! which remembers the active one.

use std::fmt;

use serde::{Deserialize, Serialize};

use rulectl_fs::{NormalizedPath, io};

use crate::store::{LocalStore, validate_segment};
use crate::{Error, Result};

const STATE_FILE: &str = "state.json";
const GITIGNORE_FILE: &str = ".gitignore";
const WORKSPACES_DIR: &str = "workspaces";
const STATE_VERSION: &str = "1";

const GITIGNORE: &str = "\
# rulectl lock and staging files
*.lock
.*.tmp
mirror.incoming/
mirror.previous/
";

/// Identity of a workspace: the Organization ID it mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workspace(String);

impl Workspace {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the ID cannot name a directory.
    pub fn new(org_id: impl Into<String>) -> Result<Self> {
        let org_id = org_id.into();
        validate_segment(&org_id, "organization ID")?;
        Ok(Self(org_id))
    }

    pub fn org_id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateFile {
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    workspace: Option<Workspace>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            workspace: None,
        }
    }
}

/// Root of all local state.
#[derive(Debug, Clone)]
pub struct StateDir {
    root: NormalizedPath,
}

impl StateDir {
    /// Open the state directory, creating it with a default `state.json`
    /// and a `.gitignore` on first use.
    pub fn open(root: impl Into<NormalizedPath>) -> Result<Self> {
        let root = root.into();
        let workspaces = root.join(WORKSPACES_DIR);
        std::fs::create_dir_all(workspaces.to_native())
            .map_err(|e| rulectl_fs::Error::io(workspaces.to_native(), e))?;

        let gitignore = root.join(GITIGNORE_FILE);
        if !gitignore.exists() {
            io::write_text(&gitignore, GITIGNORE)?;
        }
        let state = root.join(STATE_FILE);
        if !state.exists() {
            io::write_json(&state, &StateFile::default())?;
            tracing::info!(path = %root, "Initialized state directory");
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// The workspace selected with `--workspace`, if any.
    pub fn active(&self) -> Result<Option<Workspace>> {
        let state: StateFile = io::read_json(&self.root.join(STATE_FILE))?;
        Ok(state.workspace)
    }

    /// The active workspace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoWorkspace`] if none was selected.
    pub fn require_active(&self) -> Result<Workspace> {
        self.active()?.ok_or(Error::NoWorkspace)
    }

    pub fn set_active(&self, workspace: &Workspace) -> Result<()> {
        let path = self.root.join(STATE_FILE);
        let mut state: StateFile = if path.exists() {
            io::read_json(&path)?
        } else {
            StateFile::default()
        };
        state.workspace = Some(workspace.clone());
        io::write_json(&path, &state)?;
        tracing::debug!(%workspace, "Active workspace set");
        Ok(())
    }

    /// Every workspace with a directory under the state root, sorted.
    pub fn workspaces(&self) -> Result<Vec<Workspace>> {
        io::list_dirs(&self.root.join(WORKSPACES_DIR))?
            .into_iter()
            .map(Workspace::new)
            .collect()
    }

    pub fn workspace_dir(&self, workspace: &Workspace) -> NormalizedPath {
        self.root.join(WORKSPACES_DIR).join(workspace.org_id())
    }

    pub fn open_store(&self, workspace: &Workspace) -> Result<LocalStore> {
        LocalStore::open(self.workspace_dir(workspace), workspace.clone())
    }
}
