//! Event dispatch, configuration, and snapshot persistence for Killboard.
//!
//! This crate wires the resolver and the counter store into a running
//! aggregation session.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides.
//! - [`dispatch`] -- The [`Aggregator`]: classifies events and updates counters.
//! - [`persist`] -- Snapshot serialization and atomic file replacement.
//! - [`session`] -- The single-task loop that interleaves events and flushes.

pub mod config;
pub mod dispatch;
pub mod persist;
pub mod session;

pub use config::{ConfigError, FeedConfig, KillboardConfig, LoggingConfig, PersistenceConfig};
pub use dispatch::{Aggregator, DispatchOutcome, SkipReason, classify, is_friendly_fire};
pub use persist::{PersistError, SnapshotWriter, serialize_snapshot};
pub use session::{PersistenceTiming, Session, SessionInput, SessionSummary};
