//! Axum router construction for the Observer API.
//!
//! Assembles all REST routes into a single [`Router`] with CORS
//! middleware enabled for cross-origin visualization clients.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /api/replications` -- discovered replications
/// - `GET /api/replications/:id` -- one manifest
/// - `POST /api/replications/:id/activate` -- activate a replication
/// - `GET /api/shared/model-layout` -- shared model layout
/// - `GET /api/shared/visual-config` -- shared visual config
/// - `GET /api/entities` -- loaded entities
/// - `GET /api/entities/:id` -- one entity path
/// - `GET /api/entities/:id/position` -- interpolated position
/// - `GET /api/statistics` -- loaded statistic keys
/// - `GET /api/statistics/value` -- interpolated value
/// - `GET /api/statistics/summary` -- stored summary
/// - `GET /api/statistics/series` -- points in a window
/// - `GET /api/statistics/range-summary` -- summary over a window
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // Replications
        .route("/api/replications", get(handlers::list_replications))
        .route("/api/replications/{id}", get(handlers::get_replication))
        .route(
            "/api/replications/{id}/activate",
            post(handlers::activate_replication),
        )
        // Shared documents
        .route("/api/shared/model-layout", get(handlers::get_model_layout))
        .route("/api/shared/visual-config", get(handlers::get_visual_config))
        // Entities
        .route("/api/entities", get(handlers::list_entities))
        .route("/api/entities/{id}", get(handlers::get_entity))
        .route(
            "/api/entities/{id}/position",
            get(handlers::get_entity_position),
        )
        // Statistics
        .route("/api/statistics", get(handlers::list_statistics))
        .route("/api/statistics/value", get(handlers::get_statistic_value))
        .route("/api/statistics/summary", get(handlers::get_statistic_summary))
        .route("/api/statistics/series", get(handlers::get_statistic_series))
        .route(
            "/api/statistics/range-summary",
            get(handlers::get_statistic_range_summary),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
