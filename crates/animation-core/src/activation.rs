//! Replication activation.
//!
//! Activating a replication discards every cached entity path and
//! statistic, then loads all files the replication's manifest lists.
//! Files are fetched and parsed concurrently, then merged in manifest
//! order, so the result does not depend on which fetch finishes first.

use std::collections::BTreeSet;

use animation_types::{EntityPathBatch, ReplicationId, StatisticsFile};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::accessor::ContentAccessor;
use crate::dataset::{fetch_document, AnimationDataSet};
use crate::error::ActivationError;

/// Outcome of one activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    /// The replication now active.
    pub replication: ReplicationId,
    /// When the activation finished.
    pub activated_at: DateTime<Utc>,
    /// Entity path batch files merged.
    pub entity_files_loaded: usize,
    /// Entity path batch files skipped (unreadable, malformed, or listed twice).
    pub entity_files_skipped: usize,
    /// Statistics files cached.
    pub statistics_files_loaded: usize,
    /// Statistics files skipped (unreadable, malformed, duplicate identity, or listed twice).
    pub statistics_files_skipped: usize,
    /// Entities in the merged index.
    pub entity_count: usize,
    /// Statistics in the cache.
    pub statistic_count: usize,
}

/// Keep the first occurrence of each path, in order.
fn unique_paths<'a>(paths: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    paths
        .filter(|path| seen.insert(*path))
        .map(String::from)
        .collect()
}

impl<A: ContentAccessor> AnimationDataSet<A> {
    /// Make `id` the active replication and (re)load its data.
    ///
    /// Re-activating the active replication clears and reloads it as
    /// well. Individual files that fail to load are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::UnknownReplication`] without touching
    /// any state if `id` was never discovered.
    pub async fn set_active_replication(
        &mut self,
        id: ReplicationId,
    ) -> Result<ActivationReport, ActivationError> {
        let Some(manifest) = self.manifests.get(&id) else {
            warn!(replication = %id, "activation requested for unknown replication");
            return Err(ActivationError::UnknownReplication(id));
        };

        let entity_refs = manifest.entity_path_data_files.len();
        let statistics_refs = manifest.statistics_data_files.len();
        let entity_paths = unique_paths(
            manifest
                .entity_path_data_files
                .iter()
                .map(|r| r.file_path.as_str()),
        );
        let statistics_paths = unique_paths(
            manifest
                .statistics_data_files
                .iter()
                .map(|r| r.file_path.as_str()),
        );

        self.active = Some(id);
        self.entities.clear();
        self.statistics.clear();

        let accessor = &self.accessor;
        let (batches, statistics) = futures::join!(
            join_all(
                entity_paths
                    .iter()
                    .map(|path| fetch_document::<_, EntityPathBatch>(accessor, path)),
            ),
            join_all(
                statistics_paths
                    .iter()
                    .map(|path| fetch_document::<_, StatisticsFile>(accessor, path)),
            ),
        );

        let mut entity_files_loaded = 0_usize;
        for (path, result) in entity_paths.iter().zip(batches) {
            if self.merge_entity_batch(path, result) {
                entity_files_loaded = entity_files_loaded.saturating_add(1);
            }
        }

        let mut statistics_files_loaded = 0_usize;
        for (path, result) in statistics_paths.iter().zip(statistics) {
            if self.merge_statistics_file(path, result) {
                statistics_files_loaded = statistics_files_loaded.saturating_add(1);
            }
        }

        let report = ActivationReport {
            replication: id,
            activated_at: Utc::now(),
            entity_files_loaded,
            entity_files_skipped: entity_refs.saturating_sub(entity_files_loaded),
            statistics_files_loaded,
            statistics_files_skipped: statistics_refs.saturating_sub(statistics_files_loaded),
            entity_count: self.entities.len(),
            statistic_count: self.statistics.len(),
        };

        info!(
            replication = %id,
            entity_files = report.entity_files_loaded,
            entity_files_skipped = report.entity_files_skipped,
            statistics_files = report.statistics_files_loaded,
            statistics_files_skipped = report.statistics_files_skipped,
            entities = report.entity_count,
            statistics = report.statistic_count,
            "replication activated"
        );

        if self.entities.is_empty() && self.statistics.is_empty() {
            warn!(replication = %id, "replication activated without any entity or statistic");
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use animation_types::StatisticKey;
    use serde_json::json;

    use super::*;
    use crate::accessor::MemoryContentAccessor;
    use crate::discovery::manifest_path;

    fn entity_batch(entries: &[(&str, &str)]) -> String {
        let mut batch = serde_json::Map::new();
        for (id, entity_type) in entries {
            batch.insert(
                String::from(*id),
                json!({
                    "type": entity_type,
                    "path": [
                        { "clock": 0.0, "x": 0.0, "y": 0.0, "state": "arriving" },
                        { "clock": 10.0, "x": 10.0, "y": 0.0, "state": "leaving" }
                    ]
                }),
            );
        }
        serde_json::Value::Object(batch).to_string()
    }

    fn statistics_file(entity_type: &str, component: Option<&str>, metric: &str, series: &[(f64, f64)]) -> String {
        let points: Vec<serde_json::Value> = series
            .iter()
            .map(|(time, value)| json!({ "time": time, "value": value }))
            .collect();
        json!({
            "metadata": {
                "type": entity_type,
                "componentId": component,
                "metricName": metric,
                "simulationId": "bank",
                "timeUnit": "minutes"
            },
            "summary": { "min": 0, "max": 0, "mean": 0, "median": 0, "stdDev": 0, "count": points.len() },
            "timeSeries": points,
        })
        .to_string()
    }

    fn manifest(replication: u32, entity_files: &[&str], stats: &[(&str, &str, &str)]) -> String {
        json!({
            "metadata": { "replication": replication, "simulationId": "bank", "timeUnit": "minutes" },
            "entityPathDataFiles": entity_files.iter().map(|p| json!({ "filePath": p })).collect::<Vec<_>>(),
            "statisticsDataFiles": stats
                .iter()
                .map(|(path, t, metric)| json!({ "filePath": path, "type": t, "metricName": metric }))
                .collect::<Vec<_>>(),
        })
        .to_string()
    }

    fn two_replication_study() -> MemoryContentAccessor {
        MemoryContentAccessor::new("/study")
            .with_file(
                &manifest_path("rep_1"),
                manifest(
                    1,
                    &["r1/entities_a.json", "r1/entities_b.json"],
                    &[("r1/queue.json", "Queue", "length"), ("r1/server.json", "Server", "utilization")],
                ),
            )
            .with_file("r1/entities_a.json", entity_batch(&[("c1", "Customer"), ("k1", "Clerk")]))
            .with_file("r1/entities_b.json", entity_batch(&[("c2", "Customer")]))
            .with_file("r1/queue.json", statistics_file("Queue", None, "length", &[(0.0, 10.0), (10.0, 20.0)]))
            .with_file("r1/server.json", statistics_file("Server", None, "utilization", &[(0.0, 0.5), (10.0, 0.7)]))
            .with_file(
                &manifest_path("rep_2"),
                manifest(2, &["r2/entities.json"], &[("r2/queue.json", "Queue", "length")]),
            )
            .with_file("r2/entities.json", entity_batch(&[("c9", "Customer")]))
            .with_file("r2/queue.json", statistics_file("Queue", None, "length", &[(0.0, 1.0), (10.0, 2.0)]))
    }

    async fn discovered(accessor: MemoryContentAccessor) -> AnimationDataSet<MemoryContentAccessor> {
        let mut data = AnimationDataSet::new(accessor);
        data.discover_replications().await;
        data
    }

    fn ids(data: &AnimationDataSet<MemoryContentAccessor>) -> Vec<String> {
        data.get_loaded_entity_ids()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    #[tokio::test]
    async fn unknown_replication_changes_nothing() {
        let mut data = discovered(two_replication_study()).await;
        let activated = data.set_active_replication(ReplicationId::new(1)).await;
        assert!(activated.is_ok());

        let result = data.set_active_replication(ReplicationId::new(99)).await;

        assert!(matches!(result, Err(ActivationError::UnknownReplication(id)) if id == ReplicationId::new(99)));
        assert_eq!(data.active_replication(), Some(ReplicationId::new(1)));
        assert_eq!(data.entity_count(), 3);
        assert_eq!(data.statistic_count(), 2);
    }

    #[tokio::test]
    async fn activation_loads_everything_the_manifest_lists() {
        let mut data = discovered(two_replication_study()).await;

        let report = data.set_active_replication(ReplicationId::new(1)).await;

        assert!(report.is_ok());
        let Ok(report) = report else { return };
        assert_eq!(report.entity_files_loaded, 2);
        assert_eq!(report.statistics_files_loaded, 2);
        assert_eq!(report.entity_files_skipped, 0);
        assert_eq!(report.entity_count, 3);
        assert_eq!(report.statistic_count, 2);
        assert_eq!(ids(&data), vec!["c1", "k1", "c2"]);
        assert_eq!(data.get_entities_by_type("Customer").len(), 2);
        let value = data.get_statistic_value_at_time("Queue", None, "length", 5.0);
        assert!(value.is_some_and(|v| (v - 15.0).abs() < 1e-9));
    }

    #[tokio::test]
    async fn switching_replications_leaves_no_trace_of_the_previous_one() {
        let mut data = discovered(two_replication_study()).await;

        assert!(data.set_active_replication(ReplicationId::new(1)).await.is_ok());
        assert!(data.set_active_replication(ReplicationId::new(2)).await.is_ok());

        assert_eq!(ids(&data), vec!["c9"]);
        assert!(data.get_entity_path("c1").is_none());
        assert!(data.get_statistic("Server", None, "utilization").is_none());
        let value = data.get_statistic_value_at_time("Queue", None, "length", 5.0);
        assert!(value.is_some_and(|v| (v - 1.5).abs() < 1e-9));
    }

    #[tokio::test]
    async fn reactivation_is_idempotent() {
        let mut data = discovered(two_replication_study()).await;

        let first = data.set_active_replication(ReplicationId::new(1)).await;
        let ids_first = ids(&data);
        let keys_first: Vec<StatisticKey> = data.statistic_keys().into_iter().cloned().collect();

        let second = data.set_active_replication(ReplicationId::new(1)).await;

        assert_eq!(ids(&data), ids_first);
        let keys_second: Vec<StatisticKey> = data.statistic_keys().into_iter().cloned().collect();
        assert_eq!(keys_second, keys_first);
        let counts = |r: &Result<ActivationReport, ActivationError>| {
            r.as_ref().ok().map(|r| (r.entity_files_loaded, r.statistics_files_loaded, r.entity_count))
        };
        assert_eq!(counts(&first), counts(&second));
    }

    #[tokio::test]
    async fn broken_files_are_skipped_and_siblings_still_load() {
        let accessor = MemoryContentAccessor::new("/study")
            .with_file(
                &manifest_path("rep_1"),
                manifest(
                    1,
                    &["good.json", "broken.json", "missing.json", "good.json"],
                    &[("q.json", "Queue", "length"), ("bad_stats.json", "Queue", "wait")],
                ),
            )
            .with_file("good.json", entity_batch(&[("c1", "Customer")]))
            .with_file("broken.json", "[1, 2")
            .with_file("q.json", statistics_file("Queue", None, "length", &[(0.0, 1.0), (1.0, 2.0)]))
            .with_file("bad_stats.json", r#"{ "metadata": {} }"#);
        let mut data = discovered(accessor).await;

        let report = data.set_active_replication(ReplicationId::new(1)).await;

        assert!(report.is_ok());
        let Ok(report) = report else { return };
        assert_eq!(report.entity_files_loaded, 1);
        assert_eq!(report.entity_files_skipped, 3);
        assert_eq!(report.statistics_files_loaded, 1);
        assert_eq!(report.statistics_files_skipped, 1);
        assert_eq!(ids(&data), vec!["c1"]);
    }

    #[tokio::test]
    async fn duplicate_entity_ids_across_batches_last_write_wins() {
        let accessor = MemoryContentAccessor::new("/study")
            .with_file(&manifest_path("rep_1"), manifest(1, &["a.json", "b.json"], &[]))
            .with_file("a.json", entity_batch(&[("e1", "Customer")]))
            .with_file("b.json", entity_batch(&[("e1", "Clerk")]));
        let mut data = discovered(accessor).await;

        assert!(data.set_active_replication(ReplicationId::new(1)).await.is_ok());

        assert_eq!(ids(&data), vec!["e1"]);
        assert_eq!(
            data.get_entity_path("e1").map(|p| p.entity_type.as_str()),
            Some("Clerk")
        );
    }

    #[tokio::test]
    async fn duplicate_statistic_identity_keeps_earlier_manifest_entry() {
        let accessor = MemoryContentAccessor::new("/study")
            .with_file(
                &manifest_path("rep_1"),
                manifest(1, &[], &[("first.json", "Queue", "length"), ("second.json", "Queue", "length")]),
            )
            .with_file("first.json", statistics_file("Queue", Some("Teller"), "length", &[(0.0, 1.0), (2.0, 1.0)]))
            .with_file("second.json", statistics_file("Queue", Some("Teller"), "length", &[(0.0, 7.0), (2.0, 7.0)]));
        let mut data = discovered(accessor).await;

        let report = data.set_active_replication(ReplicationId::new(1)).await;

        assert_eq!(report.ok().map(|r| (r.statistics_files_loaded, r.statistics_files_skipped)), Some((1, 1)));
        let value = data.get_statistic_value_at_time("Queue", Some("Teller"), "length", 1.0);
        assert!(value.is_some_and(|v| (v - 1.0).abs() < f64::EPSILON));
    }

    #[tokio::test]
    async fn explicit_loads_are_deduplicated_by_path() {
        let mut data = discovered(two_replication_study()).await;
        assert!(data.set_active_replication(ReplicationId::new(1)).await.is_ok());

        let file_ref = animation_types::EntityPathFileRef {
            file_path: String::from("r1/entities_a.json"),
            start_time: None,
            end_time: None,
            entity_count: None,
        };
        assert!(!data.load_entity_path_batch(&file_ref).await);

        let extra = animation_types::EntityPathFileRef {
            file_path: String::from("r2/entities.json"),
            ..file_ref
        };
        assert!(data.load_entity_path_batch(&extra).await);
        assert!(data.get_entity_path("c9").is_some());
        assert!(!data.load_entity_path_batch(&extra).await);
        assert_eq!(data.get_loaded_entity_ids().last().map(|id| id.as_str()), Some("c9"));
    }

    #[tokio::test]
    async fn background_image_resolves_through_accessor() {
        let accessor = MemoryContentAccessor::new("/study").with_file(
            &manifest_path("rep_1"),
            json!({ "metadata": { "replication": 1, "backgroundImagePath": "shared/floor.png" } }).to_string(),
        );
        let mut data = discovered(accessor).await;
        assert!(data.background_image_full_path().is_none());

        assert!(data.set_active_replication(ReplicationId::new(1)).await.is_ok());

        assert_eq!(data.background_image_full_path().as_deref(), Some("/study/shared/floor.png"));
    }

    #[tokio::test]
    async fn entity_ids_follow_file_order_within_a_batch() {
        let batch = r#"{
            "zeta": { "type": "Customer", "path": [] },
            "alpha": { "type": "Customer", "path": [] }
        }"#;
        let accessor = MemoryContentAccessor::new("/study")
            .with_file(&manifest_path("rep_1"), manifest(1, &["r1/unsorted.json"], &[]))
            .with_file("r1/unsorted.json", batch);
        let mut data = discovered(accessor).await;

        assert!(data.set_active_replication(ReplicationId::new(1)).await.is_ok());

        assert_eq!(ids(&data), vec!["zeta", "alpha"]);
    }

    #[tokio::test]
    async fn null_summary_figure_keeps_series_queryable() {
        let stats = r#"{
            "metadata": { "type": "Queue", "metricName": "length", "simulationId": "bank", "timeUnit": "minutes" },
            "summary": { "min": 10, "max": 20, "mean": 15, "median": 15, "stdDev": null, "count": 2 },
            "timeSeries": [ { "time": 0, "value": 10 }, { "time": 10, "value": 20 } ]
        }"#;
        let accessor = MemoryContentAccessor::new("/study")
            .with_file(&manifest_path("rep_1"), manifest(1, &[], &[("r1/queue.json", "Queue", "length")]))
            .with_file("r1/queue.json", stats);
        let mut data = discovered(accessor).await;

        let report = data.set_active_replication(ReplicationId::new(1)).await;

        assert_eq!(report.map(|r| r.statistics_files_loaded).ok(), Some(1));
        let value = data.get_statistic_value_at_time("Queue", None, "length", 5.0);
        assert!(value.is_some_and(|v| (v - 15.0).abs() < 1e-9));
        let summary = data.get_statistic_summary("Queue", None, "length");
        assert_eq!(summary.map(|s| s.std_dev), Some(None));
    }
}
