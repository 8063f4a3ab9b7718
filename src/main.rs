//! Binary entry point that glues the SQLite-backed contact store to the TUI:
//! load configuration, start logging, open the store, then drive the Ratatui
//! event loop until the user exits.
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use contact_list::cli::Cli;
use contact_list::{init_logging, run_app, App, Config, ContactStore, TaskRunner};

/// Initialize persistence and launch the Ratatui event loop.
///
/// Fatal setup problems, such as an unreadable config file or a database
/// that cannot be created, are reported on the terminal instead of being
/// swallowed.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = cli.database.clone() {
        config.storage.database_path = Some(path);
    }

    let log_path = config.log_path()?;
    init_logging(cli.verbosity(), &log_path).context("failed to initialize logging")?;

    let db_path = config.database_path()?;
    let store = ContactStore::open_with_version(&db_path, config.storage.schema_version)
        .with_context(|| format!("failed to open contact store at {}", db_path.display()))?;
    info!(
        path = %db_path.display(),
        contacts = store.count(),
        "contact store ready"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .context("failed to start async runtime")?;
    let tasks = TaskRunner::new(
        runtime.handle().clone(),
        Arc::new(store),
        config.loading_delay(),
    );

    let mut app = App::new(tasks);
    run_app(&mut app, config.tick_rate())
}
