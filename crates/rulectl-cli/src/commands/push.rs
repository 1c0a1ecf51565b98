//! Push commands
//!
//! Apply pending changes to the platform, for the active workspace or for
//! every workspace.

use colored::Colorize;

use rulectl_core::remote;
use rulectl_core::sync::WorkspacePush;
use rulectl_core::{SyncClient, SyncReport, Workspace, push, push_all};

use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the push command for the active workspace
pub async fn run_push(ctx: &Context) -> Result<()> {
    let workspace = ctx.active_workspace()?;
    let report = push_workspace(ctx, &workspace).await?;
    check_report(&report)
}

/// Push one workspace and print its report.
pub async fn push_workspace(ctx: &Context, workspace: &Workspace) -> Result<SyncReport> {
    let store = ctx.store(workspace)?;
    let sync = ctx.sync_client(workspace)?;
    let report = push(&store, &sync).await?;
    print_report(&report);
    Ok(report)
}

/// Run the push-all command
pub async fn run_push_all(ctx: &Context) -> Result<()> {
    let results = push_all(&ctx.state, |workspace| {
        remote::connect(&ctx.settings, workspace, ctx.shutdown.clone()).map(SyncClient::new)
    })
    .await?;

    if results.is_empty() {
        println!("{} No workspace has pending changes.", "OK".green().bold());
        return Ok(());
    }

    let mut failed = 0usize;
    for WorkspacePush { workspace, outcome } in &results {
        println!("{} {}", "=>".blue().bold(), workspace.to_string().cyan());
        match outcome {
            Ok(report) => {
                print_report(report);
                if !report.is_success() {
                    failed += 1;
                }
            }
            Err(e) => {
                println!("  {} {}", "!".red().bold(), e);
                failed += 1;
            }
        }
        println!();
    }

    if failed > 0 {
        return Err(CliError::user(format!(
            "{failed} of {} workspaces did not push cleanly",
            results.len()
        )));
    }
    Ok(())
}

/// Print applied, failed and skipped changes distinctly.
pub fn print_report(report: &SyncReport) {
    if report.is_empty() {
        println!(
            "{} Nothing to push. Workspace {} is up to date.",
            "OK".green().bold(),
            report.workspace.cyan()
        );
        return;
    }

    for change in &report.applied {
        println!("  {} {}", "applied".green(), change);
    }
    for failure in &report.failed {
        println!("  {} {}: {}", "failed ".red().bold(), failure.change, failure.error);
    }
    for change in &report.skipped {
        println!("  {} {}", "skipped".yellow(), change);
    }

    println!(
        "{} {} applied, {} failed, {} skipped",
        "Push".blue().bold(),
        report.applied.len(),
        report.failed.len(),
        report.skipped.len()
    );
    if report.interrupted {
        println!(
            "{} Interrupted; run {} again to finish.",
            "!".yellow().bold(),
            "rulectl --push".cyan()
        );
    }
}

/// Turn an unsuccessful report into a non-zero exit.
pub fn check_report(report: &SyncReport) -> Result<()> {
    if report.interrupted {
        return Err(CliError::user("push interrupted; remaining changes are still pending"));
    }
    if !report.failed.is_empty() {
        return Err(CliError::user(format!(
            "{} change(s) failed and remain pending",
            report.failed.len()
        )));
    }
    Ok(())
}
