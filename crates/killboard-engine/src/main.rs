//! Killboard binary.
//!
//! Reads a JSON-lines combat event feed, aggregates per-actor and per-group
//! statistics, and keeps a snapshot file current on disk.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `killboard.yaml` (or `KILLBOARD_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Load the actor table, if configured
//! 4. Open the event feed (a file, or standard input)
//! 5. Run the session until Ctrl-C or end of feed
//! 6. Log the summary

mod error;
mod feed;

use std::path::{Path, PathBuf};

use killboard_core::{
    Aggregator, KillboardConfig, LoggingConfig, PersistenceTiming, Session, SnapshotWriter,
};
use killboard_identity::{IdentityResolver, InMemoryActorDatabase};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::feed::FeedError;

/// Config file used when `KILLBOARD_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "killboard.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the actor table, or the feed cannot
/// be loaded. Snapshot write failures are logged, not returned.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::var("KILLBOARD_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("killboard-engine starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Load the actor table.
    let database = match &config.feed.actor_db_path {
        Some(path) => InMemoryActorDatabase::load(path).map_err(EngineError::from)?,
        None => {
            info!("No actor table configured, stable identities unavailable");
            InMemoryActorDatabase::new()
        }
    };

    // 4. Open the event feed.
    let reader = open_feed(config.feed.path.as_deref()).await?;

    // 5. Run the session.
    let mut session = Session::new(
        Aggregator::new(IdentityResolver::new(database)),
        SnapshotWriter::new(&config.persistence.output_path),
        PersistenceTiming::from(&config.persistence),
    );
    let summary = session.run(feed::records(reader), shutdown_signal()).await;

    // 6. Log results.
    info!(
        events_processed = summary.events_processed,
        actors = session.aggregator().store().actor_count(),
        groups = session.aggregator().store().group_count(),
        "killboard-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration, falling back to defaults when the file is missing.
///
/// Returns whether the file was found.
fn load_config(path: &Path) -> Result<(KillboardConfig, bool), EngineError> {
    if path.exists() {
        Ok((KillboardConfig::from_file(path)?, true))
    } else {
        let mut config = KillboardConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Open the feed file, or standard input when no path is configured.
async fn open_feed(path: Option<&Path>) -> Result<Box<dyn AsyncBufRead + Unpin>, EngineError> {
    if let Some(path) = path {
        let file = tokio::fs::File::open(path).await.map_err(FeedError::from)?;
        info!(path = %path.display(), "Reading events from file");
        Ok(Box::new(BufReader::new(file)))
    } else {
        info!("Reading events from standard input");
        Ok(Box::new(BufReader::new(tokio::io::stdin())))
    }
}

/// Resolve on Ctrl-C. If the handler cannot be installed, never resolve
/// and let the end of the feed stop the session.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
