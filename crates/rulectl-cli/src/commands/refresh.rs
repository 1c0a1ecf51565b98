//! Refresh command implementation

use colored::Colorize;

use rulectl_core::{LocalStore, Workspace, refresh, refresh_clean};

use super::confirm;
use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the refresh command for the active workspace
pub async fn run_refresh(ctx: &Context, yes: bool) -> Result<()> {
    let workspace = ctx.active_workspace()?;
    let store = ctx.store(&workspace)?;

    // Without consent, the store refuses the swap if an edit shows up
    // while the tree is being fetched.
    let mut discard = yes;
    if !yes && store.snapshot()?.has_pending() {
        let confirmed = confirm(
            &format!("Workspace {workspace} has pending changes. Discard them?"),
            &format!("workspace {workspace} has pending changes; pass --yes to discard them"),
        )?;
        if !confirmed {
            return Err(CliError::user("refresh cancelled"));
        }
        discard = true;
    }

    refresh_workspace(ctx, &workspace, &store, discard).await
}

/// Replace a workspace's mirror and print what was pulled. Pending edits
/// are discarded only when `discard` is set.
pub async fn refresh_workspace(
    ctx: &Context,
    workspace: &Workspace,
    store: &LocalStore,
    discard: bool,
) -> Result<()> {
    let remote = ctx.remote(workspace)?;
    let summary = if discard {
        refresh(store, &remote).await?
    } else {
        refresh_clean(store, &remote).await?
    };
    println!(
        "{} Refreshed {}: {} rulesets, {} rules ({} tagged)",
        "OK".green().bold(),
        workspace.to_string().cyan(),
        summary.rulesets,
        summary.rules,
        summary.tagged_rules
    );
    Ok(())
}
