//! Command implementations for rulectl-cli

pub mod edit;
pub mod list;
pub mod plan;
pub mod push;
pub mod refresh;
pub mod workspace;

use std::io::IsTerminal;

use dialoguer::Confirm;
use serde_json::Value;

use rulectl_core::{EntityId, EntityKind, Error, LocalStore};
use rulectl_fs::{NormalizedPath, io};

use crate::cli::Action;
use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the selected action.
pub async fn execute(ctx: &Context, action: Action) -> Result<()> {
    match action {
        Action::List => list::run_list(ctx),
        Action::Plan { json } => plan::run_plan(ctx, json),
        Action::Push => push::run_push(ctx).await,
        Action::PushAll => push::run_push_all(ctx).await,
        Action::Refresh { yes } => refresh::run_refresh(ctx, yes).await,
        Action::Workspace { org_id } => workspace::run_workspace(ctx, &org_id).await,
        Action::Edit(edit) => edit::run_edit(ctx, edit).await,
    }
}

/// Resolve a command-line reference to a live entity: its local ID, or
/// failing that its unique name.
pub(crate) fn resolve(store: &LocalStore, kind: EntityKind, reference: &str) -> Result<EntityId> {
    let id = EntityId::new(reference);
    match store.get(kind, &id) {
        Ok(_) => return Ok(id),
        Err(Error::NotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    let matches: Vec<EntityId> = store
        .list(kind, None)?
        .into_iter()
        .filter(|e| e.name() == Some(reference))
        .map(|e| e.id().clone())
        .collect();
    match matches.as_slice() {
        [id] => Ok(id.clone()),
        [] => Err(Error::not_found(kind, reference).into()),
        _ => Err(CliError::user(format!(
            "{kind} name '{reference}' is ambiguous; use its ID"
        ))),
    }
}

/// Read a JSON document from `file`, or from stdin when `file` is `-`.
pub(crate) fn read_document(file: &str) -> Result<Value> {
    if file == "-" {
        return Ok(serde_json::from_reader(std::io::stdin().lock())?);
    }
    Ok(io::read_json(&NormalizedPath::new(file))?)
}

/// Ask before a destructive step. Without a terminal, refuse unless the
/// caller already passed `--yes`.
pub(crate) fn confirm(prompt: &str, refusal: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::user(refusal));
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}
