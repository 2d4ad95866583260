//! Error types for the animation server binary.
//!
//! [`AppError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

use animation_core::ActivationError;
use animation_types::ReplicationId;

/// Top-level error for the animation server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: animation_core::config::ConfigError,
    },

    /// The configured initial replication was not discovered.
    #[error("initial replication {0} not found under the study root")]
    UnknownInitialReplication(ReplicationId),

    /// Observer API server failed.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: animation_observer::ServerError,
    },
}

impl From<ActivationError> for AppError {
    fn from(error: ActivationError) -> Self {
        match error {
            ActivationError::UnknownReplication(id) => Self::UnknownInitialReplication(id),
        }
    }
}
