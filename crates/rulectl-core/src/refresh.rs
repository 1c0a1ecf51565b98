//! Refresh/Pull
//!
//! Replaces a workspace's mirror with the platform's current tree. The tree
//! is fetched completely before anything local is touched, so a failed
//! fetch leaves the store as it was.

use serde_json::Value;

use crate::model::{Rule, Ruleset, TagSet};
use crate::remote::RemoteClient;
use crate::store::{LocalStore, MirrorTree};
use crate::{Error, Result};

/// Counts of what a Refresh pulled down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub rulesets: usize,
    pub rules: usize,
    pub tagged_rules: usize,
}

impl RefreshSummary {
    fn of(tree: &MirrorTree) -> Self {
        Self {
            rulesets: tree.rulesets.len(),
            rules: tree.rules.len(),
            tagged_rules: tree.tags.iter().filter(|t| !t.is_empty()).count(),
        }
    }
}

/// Fetch every ruleset, its rules and each rule's tags.
pub async fn fetch_tree(remote: &RemoteClient) -> Result<MirrorTree> {
    let mut tree = MirrorTree::default();

    for ruleset_doc in remote.list_rulesets().await? {
        let ruleset = Ruleset::from_remote(&ruleset_doc)?;
        let ruleset_remote = ruleset
            .remote_id
            .clone()
            .ok_or_else(|| Error::validation(format!("ruleset '{}' has no remote ID", ruleset.name)))?;
        tracing::debug!(ruleset = %ruleset.name, "Fetching rules");

        for rule_doc in remote.list_rules(&ruleset_remote).await? {
            let rule = Rule::from_remote(ruleset.id.clone(), &rule_doc)?;
            let rule_remote = rule.remote_id.clone().unwrap_or_else(|| rule.id.to_string());
            let tags_doc = remote.get_tags(&rule_remote).await?;
            let tags = match tags_doc {
                Value::Null => TagSet::empty(rule.id.clone()),
                doc => TagSet::from_remote(rule.id.clone(), &doc)?,
            };
            tree.tags.push(tags);
            tree.rules.push(rule);
        }
        tree.rulesets.push(ruleset);
    }

    Ok(tree)
}

/// Refresh one workspace, discarding any local edits.
///
/// # Errors
///
/// Returns [`Error::WorkspaceLocked`] if a Refresh or Push is running, or
/// [`Error::Remote`] if fetching failed; the store is unchanged in both
/// cases.
pub async fn refresh(store: &LocalStore, remote: &RemoteClient) -> Result<RefreshSummary> {
    refresh_inner(store, remote, true).await
}

/// Refresh one workspace only if nothing is pending when the new mirror is
/// swapped in, so an edit staged while the tree was being fetched is never
/// lost silently.
///
/// # Errors
///
/// As [`refresh`], plus [`Error::PendingChanges`] with the store unchanged.
pub async fn refresh_clean(store: &LocalStore, remote: &RemoteClient) -> Result<RefreshSummary> {
    refresh_inner(store, remote, false).await
}

async fn refresh_inner(store: &LocalStore, remote: &RemoteClient, discard: bool) -> Result<RefreshSummary> {
    let _lock = store.lock_workspace()?;
    tracing::info!(workspace = %store.workspace(), discard, "Refreshing");

    let tree = fetch_tree(remote).await?;
    if discard {
        store.replace_all(&tree)?;
    } else {
        store.replace_all_if_clean(&tree)?;
    }

    Ok(RefreshSummary::of(&tree))
}
