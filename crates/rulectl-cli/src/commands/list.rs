//! List command implementation
//!
//! Prints the active workspace's rulesets with their rules, each marked
//! with its pending-change status.

use colored::{ColoredString, Colorize};

use rulectl_core::store::{EntityStatus, Record, Snapshot};
use rulectl_core::{Entity, EntityKind};

use crate::context::Context;
use crate::error::Result;

/// Run the list command
pub fn run_list(ctx: &Context) -> Result<()> {
    let store = ctx.active_store()?;
    let snapshot = store.snapshot()?;

    print_header(&snapshot);

    let mut rulesets: Vec<&Record> = snapshot.records(EntityKind::Ruleset).collect();
    if rulesets.is_empty() {
        println!("  (no rulesets)");
        return Ok(());
    }
    rulesets.sort_by_key(|r| r.entity.name().map(str::to_lowercase));

    for ruleset in rulesets {
        println!(
            "{} {} ({})",
            marker(ruleset.status),
            ruleset.entity.name().unwrap_or_default().bold(),
            ruleset.entity.id().as_str().dimmed()
        );

        let mut rules: Vec<&Record> = snapshot
            .records(EntityKind::Rule)
            .filter(|r| r.entity.parent() == Some(ruleset.entity.id()))
            .collect();
        rules.sort_by_key(|r| r.entity.name().map(str::to_lowercase));

        for rule in rules {
            println!(
                "  {} {} ({}){}",
                marker(rule.status),
                rule.entity.name().unwrap_or_default(),
                rule.entity.id().as_str().dimmed(),
                tags_note(&snapshot, rule)
            );
        }
    }

    Ok(())
}

fn print_header(snapshot: &Snapshot) {
    let refreshed = snapshot
        .baseline()
        .refreshed_at
        .map(|at| format!("refreshed {}", at.format("%Y-%m-%d %H:%M UTC")))
        .unwrap_or_else(|| "never refreshed".to_string());
    println!(
        "{} Workspace {} ({})",
        "=>".blue().bold(),
        snapshot.org_id().cyan(),
        refreshed
    );
    println!();
}

fn marker(status: EntityStatus) -> ColoredString {
    let symbol = status.marker().to_string();
    match status {
        EntityStatus::Unmodified => symbol.normal(),
        EntityStatus::Created => symbol.green(),
        EntityStatus::Modified => symbol.yellow(),
        EntityStatus::Deleted => symbol.red(),
    }
}

fn tags_note(snapshot: &Snapshot, rule: &Record) -> String {
    let Some(tags) = snapshot.record(EntityKind::Tags, rule.entity.id()) else {
        return String::new();
    };
    let count = match &tags.entity {
        Entity::Tags(tags) => tags.tags.len(),
        _ => 0,
    };
    match (count, tags.status.is_pending()) {
        (0, false) => String::new(),
        (n, false) => format!(" [{n} tags]"),
        (n, true) => format!(" [{n} tags {}]", "~".yellow()),
    }
}
