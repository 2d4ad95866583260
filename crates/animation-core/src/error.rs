//! Error types for the animation data set.
//!
//! Loading failures ([`LoadError`]) are never returned from the public
//! API. Loaders log them and carry on with sibling files, so callers
//! only ever see absence. [`ActivationError`] is the one failure a
//! caller is expected to handle.

use animation_types::ReplicationId;

/// Why a single document could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The accessor could not read the file.
    #[error("not found: {path}")]
    NotFound {
        /// Path relative to the study root.
        path: String,
    },

    /// The file was read but does not have the expected structure.
    #[error("malformed document {path}: {source}")]
    Malformed {
        /// Path relative to the study root.
        path: String,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Errors returned by replication activation.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    /// The requested replication was never discovered.
    #[error("unknown replication: {0}")]
    UnknownReplication(ReplicationId),
}
