//! Editing commands
//!
//! Stage creates, updates, deletes and copies in the local store. With
//! `apply_mode = "immediate"` every touched workspace is pushed right after.

use colored::Colorize;

use rulectl_core::{ApplyMode, Editor, EntityKind, Workspace};

use super::push::{check_report, push_workspace};
use super::{read_document, resolve};
use crate::cli::EditAction;
use crate::context::Context;
use crate::error::Result;

/// Run an editing command against the active workspace
pub async fn run_edit(ctx: &Context, action: EditAction) -> Result<()> {
    let workspace = ctx.active_workspace()?;
    let touched = stage(ctx, &workspace, action)?;

    if ctx.settings.apply_mode == ApplyMode::Immediate {
        for workspace in &touched {
            let report = push_workspace(ctx, workspace).await?;
            check_report(&report)?;
        }
    } else {
        println!("Run {} to review pending changes.", "rulectl --plan".cyan());
    }
    Ok(())
}

/// Apply the edit locally; returns the workspaces it changed.
fn stage(ctx: &Context, workspace: &Workspace, action: EditAction) -> Result<Vec<Workspace>> {
    let store = ctx.store(workspace)?;
    let editor = Editor::new(&store);

    match action {
        EditAction::CreateRuleset { file } => {
            let ruleset = editor.create_ruleset(&read_document(&file)?)?;
            done(&format!("Created ruleset \"{}\" ({})", ruleset.name, ruleset.id));
        }
        EditAction::CreateRule { ruleset, file } => {
            let ruleset = resolve(&store, EntityKind::Ruleset, &ruleset)?;
            let rule = editor.create_rule(&ruleset, &read_document(&file)?)?;
            done(&format!("Created rule \"{}\" ({})", rule.name, rule.id));
        }
        EditAction::UpdateRuleset { ruleset, file } => {
            let id = resolve(&store, EntityKind::Ruleset, &ruleset)?;
            let ruleset = editor.update_ruleset(&id, &read_document(&file)?)?;
            done(&format!("Updated ruleset \"{}\" ({})", ruleset.name, ruleset.id));
        }
        EditAction::UpdateRule { rule, file } => {
            let id = resolve(&store, EntityKind::Rule, &rule)?;
            let rule = editor.update_rule(&id, &read_document(&file)?)?;
            done(&format!("Updated rule \"{}\" ({})", rule.name, rule.id));
        }
        EditAction::UpdateTags { rule, file } => {
            let id = resolve(&store, EntityKind::Rule, &rule)?;
            let tags = editor.update_tags(&id, &read_document(&file)?)?;
            done(&format!("Set {} tags on rule {}", tags.tags.len(), id));
        }
        EditAction::DeleteRuleset { ruleset } => {
            let id = resolve(&store, EntityKind::Ruleset, &ruleset)?;
            editor.delete_ruleset(&id)?;
            done(&format!("Deleted ruleset {id} and its rules"));
        }
        EditAction::DeleteRule { rule } => {
            let id = resolve(&store, EntityKind::Rule, &rule)?;
            editor.delete_rule(&id)?;
            done(&format!("Deleted rule {id}"));
        }
        EditAction::CopyRule { rule, ruleset, name } => {
            let id = resolve(&store, EntityKind::Rule, &rule)?;
            let target = resolve(&store, EntityKind::Ruleset, &ruleset)?;
            let copy = editor.copy_rule(&id, Some(&target), name.as_deref())?;
            done(&format!("Copied rule to \"{}\" ({})", copy.name, copy.id));
        }
        EditAction::CopyRuleOut { rule, ruleset, org_id } => {
            let id = resolve(&store, EntityKind::Rule, &rule)?;
            let target_workspace = Workspace::new(org_id)?;
            let target = ctx.store(&target_workspace)?;
            let target_ruleset = resolve(&target, EntityKind::Ruleset, &ruleset)?;
            let copy = editor.copy_rule_to(&id, &target, &target_ruleset)?;
            done(&format!(
                "Copied rule \"{}\" to workspace {} ({})",
                copy.name, target_workspace, copy.id
            ));
            return Ok(vec![target_workspace]);
        }
        EditAction::CopyRuleset { ruleset, name } => {
            let id = resolve(&store, EntityKind::Ruleset, &ruleset)?;
            let copy = editor.copy_ruleset(&id, name.as_deref())?;
            done(&format!("Copied ruleset to \"{}\" ({})", copy.name, copy.id));
        }
        EditAction::CopyRulesetOut { ruleset, org_id } => {
            let id = resolve(&store, EntityKind::Ruleset, &ruleset)?;
            let target_workspace = Workspace::new(org_id)?;
            let target = ctx.store(&target_workspace)?;
            let copy = editor.copy_ruleset_to(&id, &target)?;
            done(&format!(
                "Copied ruleset \"{}\" to workspace {} ({})",
                copy.name, target_workspace, copy.id
            ));
            return Ok(vec![target_workspace]);
        }
    }

    Ok(vec![workspace.clone()])
}

fn done(message: &str) {
    println!("{} {}", "OK".green().bold(), message);
}
