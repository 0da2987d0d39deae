pub mod cli;
pub mod db;
pub mod error;
pub mod history;
pub mod settings;
pub mod timeline;
pub mod utils;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use db::Database;
use log::error;
use settings::SettingsStore;

pub use error::{HistoryError, TimelineError};
pub use history::{EditLogSnapshot, EditLogStore, RemovalEdits};
pub use timeline::{compute_overlaps, Annotation, OverlapMap, OverlapRange, TimedItem};

/// Shared handles for command handlers.
pub struct AppState {
    pub db: Database,
    pub settings: SettingsStore,
}

impl AppState {
    /// Open (creating if needed) the database and settings in `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let db = Database::new(data_dir.join("voicetrace.sqlite3"))?;
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;

        Ok(Self { db, settings })
    }
}

pub fn run() {
    utils::logging::init_logging();

    log::info!("voicetrace starting up...");

    let cli = cli::Cli::parse();

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")
        .and_then(|runtime| runtime.block_on(cli::dispatch(cli)));

    if let Err(err) = result {
        error!("{err:#}");
        std::process::exit(1);
    }
}
