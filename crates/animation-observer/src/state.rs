//! Shared application state for the Observer API server.
//!
//! [`AppState`] owns the animation data set behind a read-write lock.
//! Query endpoints take the read lock; activation takes the write lock
//! for its whole duration, so queries never observe a half-loaded
//! replication.

use animation_core::{ActivationError, ActivationReport, AnimationDataSet, StudyAccessor};
use animation_types::ReplicationId;
use serde::Serialize;
use tokio::sync::RwLock;

/// The concrete data set served over HTTP.
pub type SharedDataSet = AnimationDataSet<StudyAccessor>;

/// Result of one activation, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activation {
    /// Load counts and timing.
    pub report: ActivationReport,
    /// Full path of the activated replication's background image.
    pub background_image: Option<String>,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
pub struct AppState {
    /// The data set (registry, shared documents, active caches).
    pub data: RwLock<SharedDataSet>,
    /// The most recent successful activation.
    pub last_activation: RwLock<Option<Activation>>,
}

impl AppState {
    /// Wrap an already discovered (and possibly activated) data set.
    pub fn new(data: SharedDataSet) -> Self {
        Self {
            data: RwLock::new(data),
            last_activation: RwLock::new(None),
        }
    }

    /// Activate a replication and remember the outcome.
    ///
    /// The data lock is held until the outcome is recorded, so the report
    /// and background image always describe the same replication.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::UnknownReplication`] if `id` was never
    /// discovered; the previous activation stays in place.
    pub async fn activate(&self, id: ReplicationId) -> Result<Activation, ActivationError> {
        let mut data = self.data.write().await;
        let report = data.set_active_replication(id).await?;
        let activation = Activation {
            report,
            background_image: data.background_image_full_path(),
        };
        *self.last_activation.write().await = Some(activation.clone());
        drop(data);
        Ok(activation)
    }
}
