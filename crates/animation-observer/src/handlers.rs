//! REST API endpoint handlers for the Observer server.
//!
//! Every handler reads from the shared [`AppState`]; only the activation
//! endpoint mutates it.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/replications` | List discovered replications |
//! | `GET` | `/api/replications/:id` | Full manifest of one replication |
//! | `POST` | `/api/replications/:id/activate` | Activate a replication |
//! | `GET` | `/api/shared/model-layout` | Shared model layout |
//! | `GET` | `/api/shared/visual-config` | Shared visual config |
//! | `GET` | `/api/entities` | Loaded entity IDs (optionally by type) |
//! | `GET` | `/api/entities/:id` | One entity's path |
//! | `GET` | `/api/entities/:id/position` | Interpolated position at a clock |
//! | `GET` | `/api/statistics` | Loaded statistic keys |
//! | `GET` | `/api/statistics/value` | Interpolated value at a time |
//! | `GET` | `/api/statistics/summary` | Stored summary |
//! | `GET` | `/api/statistics/series` | Points within a time window |
//! | `GET` | `/api/statistics/range-summary` | Summary over a time window |

use std::sync::Arc;

use animation_types::{EntityId, ReplicationId, StatisticKey};
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use axum::Json;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/entities` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct EntitiesQuery {
    /// Only list entities of this type.
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
}

/// Query parameters for the `GET /api/entities/:id/position` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct PositionQuery {
    /// Simulation clock to interpolate at.
    pub clock: f64,
}

/// Query parameters shared by the `/api/statistics/*` lookups.
#[derive(Debug, serde::Deserialize)]
pub struct StatisticQuery {
    /// Entity or component type.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Component ID; omitted for statistics without a component.
    pub component: Option<String>,
    /// Metric name.
    pub metric: String,
    /// Point in time, for `/value`.
    pub time: Option<f64>,
    /// Window start (inclusive), for `/series` and `/range-summary`.
    pub start: Option<f64>,
    /// Window end (inclusive), for `/series` and `/range-summary`.
    pub end: Option<f64>,
}

impl StatisticQuery {
    fn key(&self) -> StatisticKey {
        StatisticKey::new(&self.entity_type, self.component.as_deref(), &self.metric)
    }

    /// Requested window; an open end is unbounded.
    fn window(&self) -> (f64, f64) {
        (
            self.start.unwrap_or(f64::NEG_INFINITY),
            self.end.unwrap_or(f64::INFINITY),
        )
    }
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let data = state.data.read().await;
    let replication_count = data.replication_ids().len();
    let active = data
        .active_replication()
        .map_or_else(|| String::from("none"), |id| id.to_string());
    let entity_count = data.entity_count();
    let statistic_count = data.statistic_count();
    let shared_layout = if data.model_layout().is_some() { "loaded" } else { "missing" };
    drop(data);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Animation Data Observer</title>
    <style>
        body {{ font-family: monospace; max-width: 800px; margin: 0 auto; padding: 2rem; }}
        .metric {{ display: inline-block; border: 1px solid #ccc; padding: 0.5rem 1rem; margin: 0.25rem; }}
        .value {{ font-weight: bold; }}
    </style>
</head>
<body>
    <h1>Animation Data Observer</h1>
    <p>Replication animation data for visualization clients</p>

    <div>
        <div class="metric">
            <div class="label">Replications</div>
            <div class="value">{replication_count}</div>
        </div>
        <div class="metric">
            <div class="label">Active</div>
            <div class="value">{active}</div>
        </div>
        <div class="metric">
            <div class="label">Entities</div>
            <div class="value">{entity_count}</div>
        </div>
        <div class="metric">
            <div class="label">Statistics</div>
            <div class="value">{statistic_count}</div>
        </div>
        <div class="metric">
            <div class="label">Model layout</div>
            <div class="value">{shared_layout}</div>
        </div>
    </div>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/replications">/api/replications</a> -- Discovered replications</li>
        <li>GET /api/replications/:id -- Replication manifest</li>
        <li>POST /api/replications/:id/activate -- Activate a replication</li>
        <li>GET <a href="/api/shared/model-layout">/api/shared/model-layout</a> -- Shared model layout</li>
        <li>GET <a href="/api/shared/visual-config">/api/shared/visual-config</a> -- Shared visual config</li>
        <li>GET <a href="/api/entities">/api/entities</a> -- Loaded entities (?type=T)</li>
        <li>GET /api/entities/:id -- Entity path</li>
        <li>GET /api/entities/:id/position?clock=t -- Interpolated position</li>
        <li>GET <a href="/api/statistics">/api/statistics</a> -- Loaded statistics</li>
        <li>GET /api/statistics/value?type&amp;component&amp;metric&amp;time -- Interpolated value</li>
        <li>GET /api/statistics/summary?type&amp;component&amp;metric -- Stored summary</li>
        <li>GET /api/statistics/series?type&amp;component&amp;metric&amp;start&amp;end -- Points in window</li>
        <li>GET /api/statistics/range-summary?type&amp;component&amp;metric&amp;start&amp;end -- Window summary</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Replications
// ---------------------------------------------------------------------------

/// List every discovered replication with its headline metadata.
pub async fn list_replications(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let data = state.data.read().await;
    let active = data.active_replication();

    let replications: Vec<serde_json::Value> = data
        .manifests()
        .map(|manifest| {
            let meta = &manifest.metadata;
            serde_json::json!({
                "id": meta.replication,
                "name": meta.name,
                "simulation_id": meta.simulation_id,
                "duration": meta.duration,
                "time_unit": meta.time_unit,
                "entity_files": manifest.entity_path_data_files.len(),
                "statistics_files": manifest.statistics_data_files.len(),
                "active": active == Some(meta.replication),
            })
        })
        .collect();
    let last_activation = state.last_activation.read().await.clone();

    Ok(Json(serde_json::json!({
        "count": replications.len(),
        "active": active,
        "last_activation": last_activation,
        "replications": replications,
    })))
}

/// Return the full manifest of one replication.
pub async fn get_replication(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = ReplicationId::new(id);
    let data = state.data.read().await;

    let manifest = data
        .manifest(id)
        .ok_or_else(|| ObserverError::NotFound(format!("replication {id}")))?;

    Ok(Json(serde_json::to_value(manifest)?))
}

/// Activate a replication, replacing the previously active one.
pub async fn activate_replication(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<impl IntoResponse, ObserverError> {
    let activation = state.activate(ReplicationId::new(id)).await?;
    Ok(Json(activation))
}

// ---------------------------------------------------------------------------
// Shared documents
// ---------------------------------------------------------------------------

/// Return the shared model layout.
pub async fn get_model_layout(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let data = state.data.read().await;
    let layout = data
        .model_layout()
        .ok_or_else(|| ObserverError::NotFound(String::from("model layout")))?;
    Ok(Json(serde_json::to_value(layout)?))
}

/// Return the shared visual configuration.
pub async fn get_visual_config(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let data = state.data.read().await;
    let config = data
        .visual_config()
        .ok_or_else(|| ObserverError::NotFound(String::from("shared visual config")))?;
    Ok(Json(serde_json::to_value(config)?))
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// List loaded entity IDs of the active replication.
///
/// # Query Parameters
///
/// - `type`: only entities of this type.
pub async fn list_entities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EntitiesQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let data = state.data.read().await;

    let ids: Vec<&str> = match params.entity_type.as_deref() {
        Some(entity_type) => data
            .get_entities_by_type(entity_type)
            .into_keys()
            .map(EntityId::as_str)
            .collect(),
        None => data
            .get_loaded_entity_ids()
            .into_iter()
            .map(EntityId::as_str)
            .collect(),
    };

    Ok(Json(serde_json::json!({
        "replication": data.active_replication(),
        "count": ids.len(),
        "entities": ids,
    })))
}

/// Return one entity's full path.
pub async fn get_entity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let data = state.data.read().await;
    let path = data
        .get_entity_path(&id)
        .ok_or_else(|| ObserverError::NotFound(format!("entity {id}")))?;
    Ok(Json(serde_json::to_value(path)?))
}

/// Return an entity's interpolated position.
///
/// # Query Parameters
///
/// - `clock`: simulation clock (required).
pub async fn get_entity_position(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<PositionQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let data = state.data.read().await;
    if data.get_entity_path(&id).is_none() {
        return Err(ObserverError::NotFound(format!("entity {id}")));
    }
    let position = data
        .get_entity_position_at_time(&id, params.clock)
        .ok_or_else(|| {
            ObserverError::NotFound(format!("entity {id} has no position at clock {}", params.clock))
        })?;
    Ok(Json(serde_json::to_value(position)?))
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// List the keys of every loaded statistic.
pub async fn list_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let data = state.data.read().await;
    let keys = data.statistic_keys();
    Ok(Json(serde_json::json!({
        "replication": data.active_replication(),
        "count": keys.len(),
        "statistics": keys,
    })))
}

/// Interpolated value of a statistic.
///
/// # Query Parameters
///
/// - `type`, `metric` (required), `component` (optional)
/// - `time` (required)
pub async fn get_statistic_value(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatisticQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let time = params
        .time
        .ok_or_else(|| ObserverError::InvalidQuery(String::from("missing `time`")))?;
    let key = params.key();

    let data = state.data.read().await;
    let value = data
        .get_statistic_value_at_time(&key.entity_type, key.component_id.as_deref(), &key.metric_name, time)
        .ok_or_else(|| ObserverError::NotFound(format!("no value for {key} at time {time}")))?;

    Ok(Json(serde_json::json!({
        "key": key,
        "time": time,
        "value": value,
    })))
}

/// Stored summary of a statistic.
pub async fn get_statistic_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatisticQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let key = params.key();
    let data = state.data.read().await;
    let summary = data
        .get_statistic_summary(&key.entity_type, key.component_id.as_deref(), &key.metric_name)
        .ok_or_else(|| ObserverError::NotFound(format!("statistic {key}")))?;

    Ok(Json(serde_json::json!({
        "key": key,
        "summary": summary,
    })))
}

/// Points of a statistic within `[start, end]`. An empty list is a
/// valid answer, including for unknown statistics.
pub async fn get_statistic_series(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatisticQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let key = params.key();
    let (start, end) = params.window();
    let data = state.data.read().await;
    let points = data.get_statistic_time_series_for_range(
        &key.entity_type,
        key.component_id.as_deref(),
        &key.metric_name,
        start,
        end,
    );

    Ok(Json(serde_json::json!({
        "key": key,
        "count": points.len(),
        "points": points,
    })))
}

/// Summary computed over the points of `[start, end]`.
pub async fn get_statistic_range_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatisticQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let key = params.key();
    let (start, end) = params.window();
    let data = state.data.read().await;
    let summary = data
        .summarize_range(&key, start, end)
        .ok_or_else(|| ObserverError::NotFound(format!("no points for {key} in window")))?;

    Ok(Json(serde_json::json!({
        "key": key,
        "summary": summary,
    })))
}
