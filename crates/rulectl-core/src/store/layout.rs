//! Paths inside a workspace directory

use rulectl_fs::NormalizedPath;

use crate::model::EntityId;
use crate::{Error, Result};

const MIRROR_DIR: &str = "mirror";
const INCOMING_DIR: &str = "mirror.incoming";
const PREVIOUS_DIR: &str = "mirror.previous";
const BASELINE_FILE: &str = "baseline.json";
const RULESET_FILE: &str = "ruleset.json";
const RULE_FILE: &str = "rule.json";
const TAGS_FILE: &str = "tags.json";
const WORKSPACE_LOCK: &str = ".workspace.lock";
const STORE_LOCK: &str = ".store.lock";

/// Path arithmetic for one workspace directory.
///
/// Record paths take the mirror root explicitly so the same layout serves
/// the live mirror and a mirror being staged by Refresh.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: NormalizedPath,
}

impl StoreLayout {
    pub fn new(root: NormalizedPath) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn mirror(&self) -> NormalizedPath {
        self.root.join(MIRROR_DIR)
    }

    pub fn incoming(&self) -> NormalizedPath {
        self.root.join(INCOMING_DIR)
    }

    pub fn previous(&self) -> NormalizedPath {
        self.root.join(PREVIOUS_DIR)
    }

    pub fn workspace_lock(&self) -> NormalizedPath {
        self.root.join(WORKSPACE_LOCK)
    }

    pub fn store_lock(&self) -> NormalizedPath {
        self.root.join(STORE_LOCK)
    }

    pub fn baseline_file(mirror: &NormalizedPath) -> NormalizedPath {
        mirror.join(BASELINE_FILE)
    }

    pub fn ruleset_dir(mirror: &NormalizedPath, ruleset: &EntityId) -> NormalizedPath {
        mirror.join(ruleset.as_str())
    }

    pub fn ruleset_file(mirror: &NormalizedPath, ruleset: &EntityId) -> NormalizedPath {
        Self::ruleset_dir(mirror, ruleset).join(RULESET_FILE)
    }

    pub fn rule_dir(mirror: &NormalizedPath, ruleset: &EntityId, rule: &EntityId) -> NormalizedPath {
        Self::ruleset_dir(mirror, ruleset).join(rule.as_str())
    }

    pub fn rule_file(mirror: &NormalizedPath, ruleset: &EntityId, rule: &EntityId) -> NormalizedPath {
        Self::rule_dir(mirror, ruleset, rule).join(RULE_FILE)
    }

    pub fn tags_file(mirror: &NormalizedPath, ruleset: &EntityId, rule: &EntityId) -> NormalizedPath {
        Self::rule_dir(mirror, ruleset, rule).join(TAGS_FILE)
    }
}

/// Reject values that cannot be used as a single directory name.
pub(crate) fn validate_segment(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{what} must not be empty")));
    }
    if value.starts_with('.') {
        return Err(Error::validation(format!("{what} '{value}' must not start with '.'")));
    }
    if value.contains(['/', '\\', '\0']) {
        return Err(Error::validation(format!(
            "{what} '{value}' contains a path separator"
        )));
    }
    Ok(())
}
