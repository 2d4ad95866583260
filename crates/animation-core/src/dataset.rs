//! The animation data set: replication registry, shared documents, and
//! the caches of the active replication.
//!
//! [`AnimationDataSet`] owns its [`ContentAccessor`] and is the single
//! entry point clients query. Discovery lives in
//! [`discovery`](crate::discovery), activation in
//! [`activation`](crate::activation); this module holds the state and
//! the read-only queries.
//!
//! Mutation goes through `&mut self`, so one discovery or activation
//! runs at a time per data set. Shared access (e.g. from the HTTP layer)
//! wraps the data set in a lock.

use std::collections::BTreeMap;

use animation_types::{
    EntityId, EntityPath, EntityPathBatch, EntityPathFileRef, EntityPosition, ModelLayout,
    ReplicationId, ReplicationManifest, SharedVisualConfig, StatisticKey, StatisticsFile,
    StatisticsFileRef, StatisticsSummary, TimeSeriesPoint,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::accessor::ContentAccessor;
use crate::entity_cache::EntityPathCache;
use crate::error::LoadError;
use crate::stats_cache::{InsertOutcome, StatisticsCache};

/// Replication data served to visualization clients.
#[derive(Debug)]
pub struct AnimationDataSet<A> {
    pub(crate) accessor: A,
    pub(crate) manifests: BTreeMap<ReplicationId, ReplicationManifest>,
    pub(crate) model_layout: Option<ModelLayout>,
    pub(crate) visual_config: Option<SharedVisualConfig>,
    pub(crate) active: Option<ReplicationId>,
    pub(crate) entities: EntityPathCache,
    pub(crate) statistics: StatisticsCache,
}

impl<A: ContentAccessor> AnimationDataSet<A> {
    /// Create an empty data set reading through `accessor`.
    ///
    /// Nothing is read until [`discover_replications`](Self::discover_replications).
    pub fn new(accessor: A) -> Self {
        Self {
            accessor,
            manifests: BTreeMap::new(),
            model_layout: None,
            visual_config: None,
            active: None,
            entities: EntityPathCache::new(),
            statistics: StatisticsCache::new(),
        }
    }

    /// The accessor this data set reads through.
    pub const fn accessor(&self) -> &A {
        &self.accessor
    }

    // =========================================================================
    // Registry and shared documents
    // =========================================================================

    /// IDs of every discovered replication, ascending.
    pub fn replication_ids(&self) -> Vec<ReplicationId> {
        self.manifests.keys().copied().collect()
    }

    /// Manifest of a discovered replication.
    pub fn manifest(&self, id: ReplicationId) -> Option<&ReplicationManifest> {
        self.manifests.get(&id)
    }

    /// Every discovered manifest, ascending by ID.
    pub fn manifests(&self) -> impl Iterator<Item = &ReplicationManifest> {
        self.manifests.values()
    }

    /// The shared model layout, once some manifest provided it.
    pub const fn model_layout(&self) -> Option<&ModelLayout> {
        self.model_layout.as_ref()
    }

    /// The shared visual configuration, once some manifest provided it.
    pub const fn visual_config(&self) -> Option<&SharedVisualConfig> {
        self.visual_config.as_ref()
    }

    /// The currently active replication.
    pub const fn active_replication(&self) -> Option<ReplicationId> {
        self.active
    }

    /// Manifest of the currently active replication.
    pub fn active_manifest(&self) -> Option<&ReplicationManifest> {
        self.active.and_then(|id| self.manifests.get(&id))
    }

    /// Full path of the active replication's background image.
    pub fn background_image_full_path(&self) -> Option<String> {
        let relative = self.active_manifest()?.metadata.background_image_path.as_deref()?;
        Some(self.accessor.resolve_full_path(relative))
    }

    // =========================================================================
    // Entity paths
    // =========================================================================

    /// Load one entity path batch into the active index.
    ///
    /// A no-op returning `false` if this path was already loaded during
    /// the current activation or the file cannot be read or parsed.
    pub async fn load_entity_path_batch(&mut self, file_ref: &EntityPathFileRef) -> bool {
        if self.entities.is_loaded(&file_ref.file_path) {
            debug!(path = %file_ref.file_path, "entity path batch already loaded");
            return false;
        }
        let result = fetch_document(&self.accessor, &file_ref.file_path).await;
        self.merge_entity_batch(&file_ref.file_path, result)
    }

    pub(crate) fn merge_entity_batch(
        &mut self,
        file_path: &str,
        result: Result<EntityPathBatch, LoadError>,
    ) -> bool {
        match result {
            Ok(batch) => {
                let count = batch.len();
                let replaced = self.entities.insert_batch(file_path, batch);
                debug!(path = file_path, entities = count, replaced, "entity path batch loaded");
                true
            }
            Err(e) => {
                warn!(error = %e, "skipping entity path batch");
                false
            }
        }
    }

    /// Path of one entity of the active replication.
    pub fn get_entity_path(&self, id: &str) -> Option<&EntityPath> {
        self.entities.get(id)
    }

    /// Every indexed entity ID, in the order first seen.
    pub fn get_loaded_entity_ids(&self) -> Vec<&EntityId> {
        self.entities.ids()
    }

    /// Entities of one type.
    pub fn get_entities_by_type(&self, entity_type: &str) -> BTreeMap<&EntityId, &EntityPath> {
        self.entities.by_type(entity_type)
    }

    /// Interpolated position of an entity at `clock`.
    pub fn get_entity_position_at_time(&self, id: &str, clock: f64) -> Option<EntityPosition> {
        self.entities.position_at(id, clock)
    }

    /// Number of indexed entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Load one statistics file into the cache.
    ///
    /// A no-op returning `false` if this path was already loaded during
    /// the current activation, the file cannot be read or parsed, or its
    /// key is already held by another file.
    pub async fn load_statistics_file(&mut self, file_ref: &StatisticsFileRef) -> bool {
        if self.statistics.is_loaded(&file_ref.file_path) {
            debug!(path = %file_ref.file_path, "statistics file already loaded");
            return false;
        }
        let result = fetch_document(&self.accessor, &file_ref.file_path).await;
        self.merge_statistics_file(&file_ref.file_path, result)
    }

    pub(crate) fn merge_statistics_file(
        &mut self,
        file_path: &str,
        result: Result<StatisticsFile, LoadError>,
    ) -> bool {
        match result {
            Ok(file) => match self.statistics.insert(file_path, file) {
                InsertOutcome::Inserted(key) => {
                    debug!(path = file_path, %key, "statistics file loaded");
                    true
                }
                InsertOutcome::Duplicate { key, kept_path } => {
                    warn!(path = file_path, %key, kept = %kept_path, "duplicate statistic identity, keeping first file");
                    false
                }
            },
            Err(e) => {
                warn!(error = %e, "skipping statistics file");
                false
            }
        }
    }

    /// Statistics file matching `(type, componentId, metricName)` exactly.
    pub fn get_statistic(
        &self,
        entity_type: &str,
        component_id: Option<&str>,
        metric_name: &str,
    ) -> Option<&StatisticsFile> {
        self.statistics
            .get(&StatisticKey::new(entity_type, component_id, metric_name))
    }

    /// Stored summary of a statistic.
    pub fn get_statistic_summary(
        &self,
        entity_type: &str,
        component_id: Option<&str>,
        metric_name: &str,
    ) -> Option<&StatisticsSummary> {
        self.statistics
            .summary(&StatisticKey::new(entity_type, component_id, metric_name))
    }

    /// Linearly interpolated value of a statistic at time `t`.
    pub fn get_statistic_value_at_time(
        &self,
        entity_type: &str,
        component_id: Option<&str>,
        metric_name: &str,
        t: f64,
    ) -> Option<f64> {
        self.statistics
            .value_at(&StatisticKey::new(entity_type, component_id, metric_name), t)
    }

    /// Points of a statistic with `start <= time <= end`. Never absent.
    pub fn get_statistic_time_series_for_range(
        &self,
        entity_type: &str,
        component_id: Option<&str>,
        metric_name: &str,
        start: f64,
        end: f64,
    ) -> Vec<&TimeSeriesPoint> {
        self.statistics.series_in_range(
            &StatisticKey::new(entity_type, component_id, metric_name),
            start,
            end,
        )
    }

    /// Summary computed over one window of a statistic's series.
    pub fn summarize_range(&self, key: &StatisticKey, start: f64, end: f64) -> Option<StatisticsSummary> {
        self.statistics.summarize_range(key, start, end)
    }

    /// Keys of every cached statistic.
    pub fn statistic_keys(&self) -> Vec<&StatisticKey> {
        self.statistics.keys()
    }

    /// Number of cached statistics.
    pub fn statistic_count(&self) -> usize {
        self.statistics.len()
    }
}

/// Read `path` through `accessor` and parse it as JSON.
pub(crate) async fn fetch_document<A, T>(accessor: &A, path: &str) -> Result<T, LoadError>
where
    A: ContentAccessor,
    T: DeserializeOwned,
{
    let text = accessor
        .read_file_as_text(path)
        .await
        .ok_or_else(|| LoadError::NotFound {
            path: String::from(path),
        })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Malformed {
        path: String::from(path),
        source,
    })
}
