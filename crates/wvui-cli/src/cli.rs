//! `wvui` - manage saved Weaviate connections and browse a backend from the
//! terminal.

mod commands;
mod logging;
mod output;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use wvui_client::{ApiClient, ClientConfig};
use wvui_connection::{ConnectionStore, FileStore};
use wvui_settings::WvuiSettings;

use crate::commands::{ConnectionsCommand, ObjectsCommand, SchemaCommand, SettingsCommand};
use crate::logging::LoggingConfig;

#[derive(Debug, Parser)]
#[command(name = "wvui")]
#[command(about = "Weaviate connection manager and browser")]
#[command(version)]
struct Cli {
    /// Storage file for saved connections
    #[arg(long, env = "WVUI_STORAGE", global = true)]
    storage: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage saved connection profiles
    #[command(subcommand)]
    Connections(ConnectionsCommand),

    /// Check the active connection
    Status {
        /// Keep polling and print every status change
        #[arg(long)]
        watch: bool,
    },

    /// Show server metadata
    Meta,

    /// Inspect and change the schema
    #[command(subcommand)]
    Schema(SchemaCommand),

    /// Browse and edit objects
    #[command(subcommand)]
    Objects(ObjectsCommand),

    /// Run a GraphQL query
    Query {
        /// Query text; read from --file when omitted
        query: Option<String>,

        /// Read the query from a file
        #[arg(long, conflicts_with = "query")]
        file: Option<PathBuf>,

        /// Query variables as a JSON object
        #[arg(long)]
        variables: Option<String>,
    },

    /// Free-text search within one class
    Search {
        text: String,

        #[arg(long)]
        class: String,

        #[arg(long, default_value_t = wvui_client::DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },

    /// Show or initialize the settings file
    #[command(subcommand)]
    Settings(SettingsCommand),
}

/// Everything a command needs.
pub(crate) struct App {
    pub settings: WvuiSettings,
    pub store: ConnectionStore,
    pub client: Arc<ApiClient>,
}

impl App {
    /// Open storage, seed the default profile on first run and point the
    /// client at the active profile.
    fn open(settings: WvuiSettings, storage: PathBuf) -> anyhow::Result<Self> {
        let store = ConnectionStore::new(Arc::new(FileStore::new(storage)));
        store
            .initialize_defaults()
            .context("failed to initialize connection storage")?;

        let timeout = settings.monitor.probe_timeout();
        let client = match store.get_active_connection() {
            Some(profile) => {
                tracing::debug!(connection_id = %profile.id, url = %profile.url, "using active connection");
                let config = ClientConfig::new(&profile.url)
                    .with_api_key(profile.api_key.clone())
                    .with_timeout(timeout);
                match ApiClient::new(config) {
                    Ok(client) => client,
                    // Keep the CLI usable so the profile can be fixed or replaced.
                    Err(err) => {
                        tracing::warn!(
                            connection_id = %profile.id,
                            url = %profile.url,
                            error = %err,
                            "active connection is unusable, falling back to the default backend"
                        );
                        ApiClient::new(ClientConfig::default().with_timeout(timeout))
                            .context("invalid default connection settings")?
                    }
                }
            }
            None => ApiClient::new(ClientConfig::default().with_timeout(timeout))
                .context("invalid default connection settings")?,
        };

        Ok(Self {
            settings,
            store,
            client: Arc::new(client),
        })
    }
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        tracing::debug!(error = %error, "command failed");
        eprintln!("Error: {error:#}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (settings, settings_error) = match WvuiSettings::load() {
        Ok(settings) => (settings, None),
        Err(err) => (WvuiSettings::default(), Some(err)),
    };

    let log_dir = wvui_settings::log_dir().unwrap_or_else(|_| PathBuf::from("logs"));
    let mut logging = LoggingConfig::new(log_dir);
    logging.default_filter = settings.logging.level.clone();
    logging.enable_json_logs = settings.logging.file_logging;
    let _guard = logging::init(&logging.with_verbosity(cli.verbose))
        .context("failed to initialize logging")?;

    if let Some(err) = settings_error {
        tracing::warn!(error = %format!("{err:#}"), "failed to load settings, using defaults");
    }

    let storage = match cli.storage {
        Some(path) => path,
        None => {
            if let Err(err) = wvui_settings::ensure_directories() {
                tracing::warn!(error = %err, "failed to create data directories");
            }
            wvui_settings::storage_file()?
        }
    };

    let app = App::open(settings, storage)?;

    match cli.command {
        Command::Connections(command) => commands::connections::run(&app, command).await,
        Command::Status { watch } => commands::status::run(&app, watch).await,
        Command::Meta => commands::status::meta(&app).await,
        Command::Schema(command) => commands::schema::run(&app, command).await,
        Command::Objects(command) => commands::objects::run(&app, command).await,
        Command::Query {
            query,
            file,
            variables,
        } => commands::query::run(&app, query, file, variables).await,
        Command::Search { text, class, limit } => {
            commands::query::search(&app, &text, &class, limit).await
        }
        Command::Settings(command) => commands::settings::run(&app, command),
    }
}
