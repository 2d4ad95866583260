//! Per-metric statistics files: metadata, precomputed summary, and
//! the raw time series.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ReplicationId;

/// One statistics file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StatisticsFile {
    /// Metric identity and context.
    pub metadata: StatisticsMetadata,
    /// Summary precomputed by the producer. Never recomputed here.
    #[serde(default)]
    pub summary: StatisticsSummary,
    /// Samples ascending by `time`.
    #[serde(default)]
    pub time_series: Vec<TimeSeriesPoint>,
}

impl StatisticsFile {
    /// The semantic identity this file declares.
    pub fn key(&self) -> StatisticKey {
        StatisticKey {
            entity_type: self.metadata.entity_type.clone(),
            component_id: self.metadata.component_id.clone(),
            metric_name: self.metadata.metric_name.clone(),
        }
    }
}

/// Metadata block of a [`StatisticsFile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StatisticsMetadata {
    /// Entity or component type the metric belongs to.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Component the metric belongs to, if any.
    #[serde(default)]
    pub component_id: Option<String>,
    /// Name of the metric.
    pub metric_name: String,
    /// Simulation study identifier.
    #[serde(default)]
    pub simulation_id: String,
    /// Replication the samples came from.
    #[serde(default)]
    pub replication: Option<ReplicationId>,
    /// Earliest sample time.
    #[serde(default)]
    pub start_time: Option<f64>,
    /// Latest sample time.
    #[serde(default)]
    pub end_time: Option<f64>,
    /// Unit of `time` values.
    #[serde(default)]
    pub time_unit: String,
}

/// Aggregate statistics over a time series.
///
/// Producers write non-finite values (e.g. the deviation of a single
/// sample) as `null`, so every figure except `count` is optional. A
/// missing summary block deserializes as all-`None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StatisticsSummary {
    /// Smallest value.
    #[serde(default)]
    pub min: Option<f64>,
    /// Largest value.
    #[serde(default)]
    pub max: Option<f64>,
    /// Arithmetic mean.
    #[serde(default)]
    pub mean: Option<f64>,
    /// Median value.
    #[serde(default)]
    pub median: Option<f64>,
    /// Standard deviation.
    #[serde(default)]
    pub std_dev: Option<f64>,
    /// Number of samples.
    #[serde(default)]
    pub count: u64,
}

/// A single `(time, value)` sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimeSeriesPoint {
    /// Sample time.
    pub time: f64,
    /// Sample value.
    pub value: f64,
}

/// Semantic identity of a statistic: `(type, componentId, metricName)`.
///
/// An absent component only matches an absent component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StatisticKey {
    /// Entity or component type.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Component, if any.
    pub component_id: Option<String>,
    /// Metric name.
    pub metric_name: String,
}

impl StatisticKey {
    /// Build a key from borrowed parts.
    pub fn new(entity_type: &str, component_id: Option<&str>, metric_name: &str) -> Self {
        Self {
            entity_type: String::from(entity_type),
            component_id: component_id.map(String::from),
            metric_name: String::from(metric_name),
        }
    }
}

impl core::fmt::Display for StatisticKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.component_id {
            Some(component) => write!(f, "{}/{}/{}", self.entity_type, component, self.metric_name),
            None => write!(f, "{}/-/{}", self.entity_type, self.metric_name),
        }
    }
}
