//! Plan command implementation
//!
//! Shows what a push would change. Reads local state only.

use colored::Colorize;

use rulectl_core::plan::{ChangeKind, Plan};
use rulectl_core::compute_plan;

use crate::context::Context;
use crate::error::Result;

/// Run the plan command
pub fn run_plan(ctx: &Context, json: bool) -> Result<()> {
    let store = ctx.active_store()?;
    let plan = compute_plan(&store.snapshot()?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

/// Print a plan as colored `+`/`~`/`-` lines.
pub fn print_plan(plan: &Plan) {
    if plan.is_empty() {
        println!(
            "{} No changes. Workspace {} is up to date.",
            "OK".green().bold(),
            plan.workspace.cyan()
        );
        return;
    }

    let summary = plan.summary();
    println!(
        "{} {}: {} to create, {} to update, {} to delete",
        "Plan".blue().bold(),
        plan.workspace.cyan(),
        summary.create,
        summary.update,
        summary.delete
    );
    println!();

    for change in plan.iter() {
        let line = change.to_string();
        let line = match change.kind {
            ChangeKind::Create => line.green(),
            ChangeKind::Update => line.yellow(),
            ChangeKind::Delete => line.red(),
        };
        println!("  {line}");
    }

    println!();
    println!("Run {} to apply these changes.", "rulectl --push".cyan());
}
