//! Workspace switching

use colored::Colorize;

use rulectl_core::Workspace;

use super::refresh::refresh_workspace;
use crate::context::Context;
use crate::error::Result;

/// Make `org_id` the active workspace, refreshing it if it was never
/// refreshed and holds no staged edits.
pub async fn run_workspace(ctx: &Context, org_id: &str) -> Result<()> {
    let workspace = Workspace::new(org_id)?;
    ctx.state.set_active(&workspace)?;
    println!(
        "{} Switched to workspace {}",
        "=>".blue().bold(),
        workspace.to_string().cyan()
    );

    let store = ctx.store(&workspace)?;
    if store.has_mirror() || store.snapshot()?.has_pending() {
        return Ok(());
    }

    if ctx.has_credentials() {
        refresh_workspace(ctx, &workspace, &store, false).await
    } else {
        println!(
            "No local mirror yet. Configure credentials and run {}.",
            "rulectl --refresh".cyan()
        );
        Ok(())
    }
}
