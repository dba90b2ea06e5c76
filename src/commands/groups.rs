//! Group management commands
//!
//! `groups list` prints the registered groups as a table or JSON; `groups
//! delete` unregisters one after confirmation.

use prettytable::{row, Table};

use super::{build_backend, build_provider, confirm, require_session};
use crate::backend::{Backend, BackendError, Group};
use crate::cli::GroupCommand;
use crate::config::Config;
use crate::error::{GroupcastError, Result};
use crate::notice::messages;

/// Run a group subcommand
pub async fn handle_groups(config: Config, command: GroupCommand) -> Result<()> {
    let provider = build_provider(&config)?;
    require_session(provider.as_ref()).await?;
    let backend = build_backend(&config)?;

    match command {
        GroupCommand::List { json } => list_groups(backend.as_ref(), json).await,
        GroupCommand::Delete { id, yes } => {
            if !yes && !confirm(&format!("{} ({})", messages::DELETE_CONFIRM, id))? {
                println!("Cancelled");
                return Ok(());
            }
            delete_group(backend.as_ref(), &id).await
        }
    }
}

/// Fetch and print the registered groups
pub async fn list_groups(backend: &dyn Backend, json: bool) -> Result<()> {
    let groups = backend
        .list_groups()
        .await
        .map_err(|e| failure(e, messages::GROUPS_LOAD_FAILED))?;

    if json {
        let out = serde_json::to_string_pretty(&groups).map_err(GroupcastError::Serialization)?;
        println!("{}", out);
        return Ok(());
    }

    if groups.is_empty() {
        println!("{}", messages::NO_GROUPS);
        println!("{}", messages::NO_GROUPS_HINT);
        return Ok(());
    }

    println!("\nGroups ({}):\n", groups.len());
    groups_table(&groups).printstd();
    println!();
    Ok(())
}

/// Unregister one group
pub async fn delete_group(backend: &dyn Backend, id: &str) -> Result<()> {
    backend
        .delete_group(id)
        .await
        .map_err(|e| failure(e, messages::GROUP_DELETE_FAILED))?;
    println!("Deleted group {}", id);
    Ok(())
}

/// Table of groups with id, title, type and registration time
pub fn groups_table(groups: &[Group]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["ID", "Title", "Type", "Added"]);
    for group in groups {
        table.add_row(row![group.id, group.title, group.kind, added_label(group)]);
    }
    table
}

fn added_label(group: &Group) -> String {
    group
        .added_at_utc()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| group.added_at.clone())
}

// The user-facing text goes on top; the backend error stays as the cause.
fn failure(err: BackendError, generic: &str) -> anyhow::Error {
    let message = err.user_message(generic);
    anyhow::Error::new(GroupcastError::Backend(err)).context(message)
}
