//! Command-line front end driving the character stats cache

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::{Config, PAYLOAD_KEY, SUPPORTED_SCHEMA_VERSION, data_dir, db_path};
use crate::sync::cache::VersionedRemoteCache;
use crate::sync::refresh::spawn_periodic_refresh;
use crate::sync::remotes::HttpRemote;
use crate::sync::stores::SqliteStore;
use crate::sync::types::{SyncOutcome, SyncStatus};

/// Cache over the published character stats document
pub type StatsCache = VersionedRemoteCache<serde_json::Value, SqliteStore>;

#[derive(Parser)]
#[command(name = "stats-cache")]
#[command(version, about = "Keep a local copy of published character stat data")]
pub struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (defaults to the data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Write logs to stderr instead of the log file
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Check the remote for a newer version and refresh the local copy (default)
    Sync,
    /// Print the locally cached document
    Show,
    /// Print the cached version and when it was stored
    Status,
    /// Refresh periodically and report changes until interrupted
    Watch,
    /// Remove the cached document and version stamp
    Clear,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let db_path = match cli.db {
        Some(path) => path,
        None => {
            let data_dir = data_dir();
            std::fs::create_dir_all(&data_dir)
                .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;
            db_path()
        }
    };

    let store = Arc::new(SqliteStore::new(&db_path)?);
    let remote = Arc::new(HttpRemote::from_config(&config.remote)?);
    let cache = StatsCache::new(remote, store.clone(), SUPPORTED_SCHEMA_VERSION);

    match cli.command.unwrap_or(Command::Sync) {
        Command::Sync => sync(&cache, Duration::from_millis(config.cache.fetch_timeout)).await,
        Command::Show => show(&cache)?,
        Command::Status => status(&cache, &store)?,
        Command::Watch => {
            watch(
                Arc::new(cache),
                Duration::from_millis(config.cache.refresh_interval),
            )
            .await?
        }
        Command::Clear => {
            cache.clear()?;
            println!("Cache cleared");
        }
    }

    Ok(())
}

async fn sync(cache: &StatsCache, timeout: Duration) {
    match tokio::time::timeout(timeout, cache.load()).await {
        Ok(outcome) => {
            info!("Sync finished: {}", outcome);
            println!("{}", outcome);
        }
        Err(_) => {
            warn!("Sync timed out after {:?}", timeout);
            println!("timed out after {:?}", timeout);
        }
    }

    if cache.current().is_none() {
        println!("No character stats available yet");
    }
}

fn show(cache: &StatsCache) -> anyhow::Result<()> {
    if !cache.restore() {
        println!("No character stats cached; run `stats-cache sync` first");
        return Ok(());
    }

    if let Some(payload) = cache.current() {
        println!("{}", serde_json::to_string_pretty(&*payload)?);
    }
    Ok(())
}

fn status(cache: &StatsCache, store: &SqliteStore) -> anyhow::Result<()> {
    let version = cache.stored_version();
    if version == 0 || !cache.restore() {
        println!("Nothing cached");
        return Ok(());
    }

    println!("Version: {}", version);
    match store.updated_at(PAYLOAD_KEY)? {
        Some(updated_at) => println!("Stored at: {} ms since epoch", updated_at),
        None => println!("Stored at: unknown"),
    }
    Ok(())
}

async fn watch(cache: Arc<StatsCache>, period: Duration) -> anyhow::Result<()> {
    let mut values = cache.subscribe();
    let mut statuses = cache.status();
    let handle = spawn_periodic_refresh(cache.clone(), period);

    println!("Refreshing every {:?}; press Ctrl-C to stop", period);

    loop {
        tokio::select! {
            changed = values.changed() => {
                if changed.is_err() {
                    break;
                }
                let available = values.borrow_and_update().is_some();
                if available {
                    println!("Character stats updated (version {})", cache.stored_version());
                }
            }
            changed = statuses.changed() => {
                if changed.is_err() {
                    break;
                }
                if let SyncStatus::Finished(outcome) = &*statuses.borrow_and_update() {
                    if !matches!(outcome, SyncOutcome::UpToDate { .. } | SyncOutcome::Refreshed { .. }) {
                        println!("{}", outcome);
                    }
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    handle.abort();
    Ok(())
}
