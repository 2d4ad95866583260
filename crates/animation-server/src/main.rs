//! Animation data service binary.
//!
//! Wires the study accessor, the animation data set, and the Observer
//! API together. It loads configuration, discovers the study's
//! replications, activates one, and serves HTTP until terminated.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`ANIMATION_CONFIG` or `animation-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the study root through the file-system accessor
//! 4. Discover replications under `replications/`
//! 5. Activate the configured (or lowest) replication
//! 6. Start the Observer API server

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use animation_core::config::{ServiceConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use animation_core::{AnimationDataSet, FsContentAccessor, StudyAccessor};
use animation_observer::{AppState, ServerConfig};
use animation_types::ReplicationId;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the configured
/// initial replication does not exist, or the server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = config_path();
    let config = ServiceConfig::from_file_or_default(&config_path).map_err(AppError::from)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        config = %config_path.display(),
        study_root = %config.study.root,
        port = config.observer.port,
        "animation-server starting"
    );

    // 3. Open the study.
    let accessor = StudyAccessor::from(FsContentAccessor::new(&config.study.root));
    let mut data = AnimationDataSet::new(accessor);

    // 4. Discover replications.
    let report = data.discover_replications().await;
    info!(
        accessor = data.accessor().name(),
        registered = report.registered.len(),
        skipped = report.skipped.len(),
        "Replication discovery complete"
    );

    // 5. Activate the initial replication.
    let initial = initial_replication(config.study.initial_replication, &data.replication_ids())?;
    let state = Arc::new(AppState::new(data));
    if let Some(id) = initial {
        let activation = state.activate(id).await.map_err(AppError::from)?;
        info!(
            replication = %activation.report.replication,
            entities = activation.report.entity_count,
            statistics = activation.report.statistic_count,
            "Initial replication active"
        );
    } else {
        warn!("No replications discovered, serving an empty study");
    }

    // 6. Serve.
    let server_config = ServerConfig::from(&config.observer);
    animation_observer::start_server(&server_config, state)
        .await
        .map_err(AppError::from)?;

    info!("animation-server shutdown complete");
    Ok(())
}

/// Config file path: `ANIMATION_CONFIG` if set, otherwise the default.
fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|p| !p.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Pick the replication to activate at startup.
///
/// A configured ID must have been discovered. Without one, the lowest
/// discovered ID is used; an empty study activates nothing.
fn initial_replication(
    configured: Option<u32>,
    discovered: &[ReplicationId],
) -> Result<Option<ReplicationId>, AppError> {
    match configured.map(ReplicationId::new) {
        Some(id) if discovered.contains(&id) => Ok(Some(id)),
        Some(id) => Err(AppError::UnknownInitialReplication(id)),
        None => Ok(discovered.iter().min().copied()),
    }
}
