//! Configuration loading and typed config structures for Killboard.
//!
//! The binary reads `killboard.yaml` from its working directory unless
//! `KILLBOARD_CONFIG` names another file. Every field has a default, so an
//! empty or missing file yields a usable configuration. No field is
//! validated against another.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KillboardConfig {
    /// Snapshot output and cadence.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Where events and the actor table come from.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Diagnostic logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl KillboardConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `KILLBOARD_OUTPUT` overrides `persistence.output_path`
    /// - `KILLBOARD_FEED` overrides `feed.path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml maps an empty document to unit, not to an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override paths with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("KILLBOARD_OUTPUT") {
            self.persistence.output_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("KILLBOARD_FEED") {
            self.feed.path = Some(PathBuf::from(val));
        }
    }
}

/// Snapshot persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// File the snapshot is written to. Replaced whole on every flush.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Seconds between periodic flushes.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Seconds before the first periodic flush.
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
}

impl PersistenceConfig {
    /// The flush period. Zero is raised to one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// The delay before the first flush.
    pub const fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            interval_secs: default_interval_secs(),
            initial_delay_secs: default_initial_delay_secs(),
        }
    }
}

/// Event feed settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// JSON-lines event feed. Standard input when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// JSON array of actor database rows. An empty database when absent.
    #[serde(default)]
    pub actor_db_path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_output_path() -> PathBuf {
    PathBuf::from("killboard-stats.json")
}

const fn default_interval_secs() -> u64 {
    60
}

const fn default_initial_delay_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_owned()
}
