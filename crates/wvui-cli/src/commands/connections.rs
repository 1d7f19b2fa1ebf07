//! `wvui connections ...`

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Subcommand;
use wvui_connection::{ConnectionDraft, ConnectionPatch, ConnectionProfile, DEFAULT_RECENT_LIMIT};

use super::read_input;
use crate::App;
use crate::output;

#[derive(Debug, Subcommand)]
pub enum ConnectionsCommand {
    /// List saved connections
    List,

    /// Save a connection. An existing connection with the same URL is updated.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long, env = "WVUI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        favorite: bool,
    },

    /// Change fields of a saved connection
    Update {
        /// Connection id or name
        connection: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long, conflicts_with = "clear_api_key")]
        api_key: Option<String>,
        #[arg(long)]
        clear_api_key: bool,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        favorite: Option<bool>,
    },

    /// Delete a saved connection
    Remove {
        /// Connection id or name
        connection: String,
    },

    /// Toggle the favorite flag
    Favorite {
        /// Connection id or name
        connection: String,
    },

    /// Make a connection active, or clear the active connection
    Use {
        /// Connection id or name; omit to clear
        connection: Option<String>,
    },

    /// Most recently used connections
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },

    /// Favorite connections
    Favorites,

    /// Write all connections as JSON
    Export {
        /// Output file; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Merge connections from a JSON export (`-` reads stdin)
    Import { file: PathBuf },
}

pub async fn run(app: &App, command: ConnectionsCommand) -> anyhow::Result<()> {
    let store = &app.store;
    match command {
        ConnectionsCommand::List => print_list(app, &store.list_connections()),
        ConnectionsCommand::Add {
            name,
            url,
            api_key,
            description,
            favorite,
        } => {
            let mut draft = ConnectionDraft::new(name, url).favorite(favorite);
            if let Some(api_key) = api_key {
                draft = draft.with_api_key(api_key);
            }
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            let profile = store.save_connection(draft)?;
            println!("Saved {} ({})", profile.name, profile.id);
        }
        ConnectionsCommand::Update {
            connection,
            name,
            url,
            api_key,
            clear_api_key,
            description,
            favorite,
        } => {
            let profile = resolve(app, &connection)?;
            let mut patch = ConnectionPatch::new();
            if let Some(name) = name {
                patch = patch.name(name);
            }
            if let Some(url) = url {
                patch = patch.url(url);
            }
            if api_key.is_some() || clear_api_key {
                patch = patch.api_key(api_key);
            }
            if let Some(description) = description {
                patch = patch.description(Some(description).filter(|d| !d.is_empty()));
            }
            if let Some(favorite) = favorite {
                patch = patch.favorite(favorite);
            }
            if patch.is_empty() {
                bail!("nothing to update");
            }
            if !store.update_connection(&profile.id, patch) {
                bail!(
                    "could not update {}: names and URLs must be non-empty and URLs unique",
                    profile.name
                );
            }
            println!("Updated {}", profile.name);
        }
        ConnectionsCommand::Remove { connection } => {
            let profile = resolve(app, &connection)?;
            if !store.delete_connection(&profile.id) {
                bail!("could not delete {}", profile.name);
            }
            println!("Removed {}", profile.name);
        }
        ConnectionsCommand::Favorite { connection } => {
            let profile = resolve(app, &connection)?;
            // The return value is the new flag, so success is read back from the store.
            store.toggle_favorite(&profile.id);
            let is_favorite = store.get_connection(&profile.id).map(|p| p.is_favorite);
            if is_favorite != Some(!profile.is_favorite) {
                bail!("could not update {}", profile.name);
            }
            let state = if profile.is_favorite { "no longer a favorite" } else { "now a favorite" };
            println!("{} is {}", profile.name, state);
        }
        ConnectionsCommand::Use { connection: None } => {
            store.set_active_connection(None)?;
            println!("Cleared the active connection");
        }
        ConnectionsCommand::Use {
            connection: Some(connection),
        } => {
            let profile = resolve(app, &connection)?;
            app.client
                .update_connection(&profile.url, profile.api_key.clone())
                .with_context(|| format!("cannot use {}", profile.name))?;
            store.set_active_connection(Some(&profile))?;

            let status = app.client.check_connection().await;
            println!("Now using {}", profile.name);
            println!("{}", output::status_line(&status));
        }
        ConnectionsCommand::Recent { limit } => {
            print_list(app, &store.get_recent_connections(limit));
        }
        ConnectionsCommand::Favorites => print_list(app, &store.get_favorite_connections()),
        ConnectionsCommand::Export { output } => {
            let json = store.export_connections()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Exported connections to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        ConnectionsCommand::Import { file } => {
            let json = read_input(&file)?;
            if !store.import_connections(&json) {
                bail!("import rejected: expected a JSON array of connections with name, url and isFavorite");
            }
            println!("Imported connections from {}", file.display());
        }
    }
    Ok(())
}

fn print_list(app: &App, profiles: &[ConnectionProfile]) {
    if profiles.is_empty() {
        println!("No connections");
        return;
    }
    let active = app.store.get_active_connection_id();
    println!("{}", output::connections_table(profiles, active.as_deref()));
}

/// Find a profile by id, falling back to an exact name match.
fn resolve(app: &App, key: &str) -> anyhow::Result<ConnectionProfile> {
    if let Some(profile) = app.store.get_connection(key) {
        return Ok(profile);
    }
    let matches: Vec<_> = app
        .store
        .list_connections()
        .into_iter()
        .filter(|p| p.name == key)
        .collect();
    match matches.len() {
        0 => bail!("no connection with id or name '{key}'"),
        1 => Ok(matches.into_iter().next().context("connection vanished")?),
        n => bail!("{n} connections are named '{key}', use the id instead"),
    }
}
