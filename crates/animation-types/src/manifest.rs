//! Replication manifests and the shared documents they point to.
//!
//! A manifest is the declarative index of everything one replication
//! produced: its metadata plus references to entity path batch files and
//! statistics files. The references are pointers only; the data lives in
//! the referenced files.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ReplicationId;

/// Manifest for one replication, as stored in
/// `replications/rep_<id>/animation_manifest_rep_<id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ReplicationManifest {
    /// Replication-level metadata, including the registry key.
    pub metadata: ReplicationMetadata,
    /// Entity path batch files belonging to this replication.
    #[serde(default)]
    pub entity_path_data_files: Vec<EntityPathFileRef>,
    /// Per-metric statistics files belonging to this replication.
    #[serde(default)]
    pub statistics_data_files: Vec<StatisticsFileRef>,
}

impl ReplicationManifest {
    /// The registry key declared by this manifest.
    pub const fn replication_id(&self) -> ReplicationId {
        self.metadata.replication
    }
}

/// Metadata block of a [`ReplicationManifest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ReplicationMetadata {
    /// Version of the animation data format.
    #[serde(default)]
    pub format_version: String,
    /// Identifier of the simulation study that produced the replication.
    #[serde(default)]
    pub simulation_id: String,
    /// Replication number. Used as the registry key.
    pub replication: ReplicationId,
    /// Optional human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Simulated duration, in `time_unit`.
    #[serde(default)]
    pub duration: f64,
    /// Unit of every clock and time value in this replication.
    #[serde(default)]
    pub time_unit: String,
    /// Path (relative to the study root) of the shared model layout.
    #[serde(default)]
    pub model_layout_path: Option<String>,
    /// Path (relative to the study root) of the shared visual config.
    #[serde(default)]
    pub shared_visual_config_path: Option<String>,
    /// Path (relative to the study root) of the background image.
    #[serde(default)]
    pub background_image_path: Option<String>,
}

/// Reference to one entity path batch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EntityPathFileRef {
    /// Path (relative to the study root) of the batch file.
    pub file_path: String,
    /// Earliest clock covered by the batch, if declared.
    #[serde(default)]
    pub start_time: Option<f64>,
    /// Latest clock covered by the batch, if declared.
    #[serde(default)]
    pub end_time: Option<f64>,
    /// Number of entities in the batch, if declared.
    #[serde(default)]
    pub entity_count: Option<u32>,
}

/// Reference to one statistics file, with the metric identity it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StatisticsFileRef {
    /// Path (relative to the study root) of the statistics file.
    pub file_path: String,
    /// Entity or component type the metric belongs to.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Component the metric belongs to, if any.
    #[serde(default)]
    pub component_id: Option<String>,
    /// Name of the metric.
    pub metric_name: String,
    /// Earliest time covered, if declared.
    #[serde(default)]
    pub start_time: Option<f64>,
    /// Latest time covered, if declared.
    #[serde(default)]
    pub end_time: Option<f64>,
}

/// Shared model layout document.
///
/// The layout is not interpreted by the data set; it is handed to
/// clients as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ModelLayout(pub serde_json::Value);

/// Shared visual configuration document. Opaque, like [`ModelLayout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SharedVisualConfig(pub serde_json::Value);
