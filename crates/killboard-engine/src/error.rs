//! Error types for the Killboard binary.

/// Top-level error for the Killboard binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: killboard_core::ConfigError,
    },

    /// The actor table could not be loaded.
    #[error("actor database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: killboard_identity::DatabaseError,
    },

    /// The event feed could not be opened.
    #[error("feed error: {source}")]
    Feed {
        /// The underlying feed error.
        #[from]
        source: crate::feed::FeedError,
    },
}
