//! Statistics of the active replication, keyed by metric identity.
//!
//! Files are stored under the `(type, componentId, metricName)` they
//! declare. If two files declare the same identity, the first one
//! inserted stays and the second is rejected. Activation inserts in
//! manifest order, so the earlier manifest reference wins.
//!
//! File paths are tracked separately so each file is parsed at most once
//! per activation, whether it was kept or rejected.

use std::collections::{BTreeMap, BTreeSet};

use animation_types::{StatisticKey, StatisticsFile, StatisticsSummary, TimeSeriesPoint};

use crate::interpolate::{bracket, interpolate};

/// What happened to a file handed to [`StatisticsCache::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The file is now cached under its key.
    Inserted(StatisticKey),
    /// Another file already holds this key; the new one was dropped.
    Duplicate {
        /// The contested key.
        key: StatisticKey,
        /// Path of the file that keeps the key.
        kept_path: String,
    },
}

#[derive(Debug, Clone)]
struct CachedStatistic {
    file_path: String,
    file: StatisticsFile,
}

/// Statistics files of the active replication.
#[derive(Debug, Clone, Default)]
pub struct StatisticsCache {
    by_key: BTreeMap<StatisticKey, CachedStatistic>,
    loaded_files: BTreeSet<String>,
}

impl StatisticsCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every statistic and forget which files were loaded.
    pub fn clear(&mut self) {
        self.by_key.clear();
        self.loaded_files.clear();
    }

    /// Whether `file_path` was parsed since the last [`clear`](Self::clear).
    pub fn is_loaded(&self, file_path: &str) -> bool {
        self.loaded_files.contains(file_path)
    }

    /// Cache a parsed file under the key its metadata declares.
    pub fn insert(&mut self, file_path: &str, file: StatisticsFile) -> InsertOutcome {
        self.loaded_files.insert(String::from(file_path));

        let key = file.key();
        if let Some(existing) = self.by_key.get(&key) {
            return InsertOutcome::Duplicate {
                key,
                kept_path: existing.file_path.clone(),
            };
        }

        self.by_key.insert(
            key.clone(),
            CachedStatistic {
                file_path: String::from(file_path),
                file,
            },
        );
        InsertOutcome::Inserted(key)
    }

    /// Number of cached statistics.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Keys of every cached statistic, in key order.
    pub fn keys(&self) -> Vec<&StatisticKey> {
        self.by_key.keys().collect()
    }

    /// The file cached under `key`.
    pub fn get(&self, key: &StatisticKey) -> Option<&StatisticsFile> {
        self.by_key.get(key).map(|cached| &cached.file)
    }

    /// The stored summary of the file cached under `key`.
    pub fn summary(&self, key: &StatisticKey) -> Option<&StatisticsSummary> {
        self.get(key).map(|file| &file.summary)
    }

    /// Linearly interpolated value at time `t`.
    ///
    /// `None` when the key is unknown, the series has fewer than two
    /// points, or `t` lies outside the series. No extrapolation.
    pub fn value_at(&self, key: &StatisticKey, t: f64) -> Option<f64> {
        let series = &self.get(key)?.time_series;
        let (a, b) = bracket(series, t, |p| p.time)?;
        Some(interpolate(t, (a.time, a.value), (b.time, b.value)))
    }

    /// Points with `start <= time <= end`, in file order.
    ///
    /// Always a list: empty when the key is unknown, the window is
    /// inverted, or no point qualifies.
    pub fn series_in_range(&self, key: &StatisticKey, start: f64, end: f64) -> Vec<&TimeSeriesPoint> {
        self.get(key).map_or_else(Vec::new, |file| {
            file.time_series
                .iter()
                .filter(|p| start <= p.time && p.time <= end)
                .collect()
        })
    }

    /// Summary computed over the points of a window.
    ///
    /// The stored summary is left untouched. `None` when the window holds
    /// no points.
    pub fn summarize_range(&self, key: &StatisticKey, start: f64, end: f64) -> Option<StatisticsSummary> {
        let values: Vec<f64> = self
            .series_in_range(key, start, end)
            .into_iter()
            .map(|p| p.value)
            .collect();
        summarize(&values)
    }
}

/// Min, max, mean, median, population standard deviation and count.
///
/// `None` for an empty slice.
pub fn summarize(values: &[f64]) -> Option<StatisticsSummary> {
    let count = u32::try_from(values.len()).ok().filter(|n| *n > 0)?;
    let n = f64::from(count);

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let min = *sorted.first()?;
    let max = *sorted.last()?;
    let mean = sorted.iter().sum::<f64>() / n;

    let mid = sorted.len() / 2;
    let upper = *sorted.get(mid)?;
    let median = if sorted.len() % 2 == 0 {
        let lower = *sorted.get(mid.checked_sub(1)?)?;
        (lower + upper) / 2.0
    } else {
        upper
    };

    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(StatisticsSummary {
        min: Some(min),
        max: Some(max),
        mean: Some(mean),
        median: Some(median),
        std_dev: Some(variance.sqrt()),
        count: u64::from(count),
    })
}

#[cfg(test)]
mod tests {
    use animation_types::StatisticsMetadata;

    use super::*;

    fn stat(entity_type: &str, component: Option<&str>, metric: &str, series: &[(f64, f64)]) -> StatisticsFile {
        StatisticsFile {
            metadata: StatisticsMetadata {
                entity_type: String::from(entity_type),
                component_id: component.map(String::from),
                metric_name: String::from(metric),
                simulation_id: String::from("bank"),
                replication: None,
                start_time: None,
                end_time: None,
                time_unit: String::from("minutes"),
            },
            summary: StatisticsSummary::default(),
            time_series: series
                .iter()
                .map(|&(time, value)| TimeSeriesPoint { time, value })
                .collect(),
        }
    }

    fn queue_key() -> StatisticKey {
        StatisticKey::new("Queue", Some("Teller"), "length")
    }

    fn cache_with(series: &[(f64, f64)]) -> StatisticsCache {
        let mut cache = StatisticsCache::new();
        cache.insert("q.json", stat("Queue", Some("Teller"), "length", series));
        cache
    }

    fn approx(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|v| (v - expected).abs() < 1e-9)
    }

    #[test]
    fn interpolates_between_samples() {
        let cache = cache_with(&[(0.0, 10.0), (10.0, 20.0)]);
        assert!(approx(cache.value_at(&queue_key(), 5.0), 15.0));
        assert!(cache.value_at(&queue_key(), -1.0).is_none());
        assert!(cache.value_at(&queue_key(), 11.0).is_none());
    }

    #[test]
    fn exact_sample_time_returns_sample_value() {
        let cache = cache_with(&[(0.0, 0.1), (1.5, 0.7), (4.0, 0.3)]);
        for (t, v) in [(0.0_f64, 0.1_f64), (1.5, 0.7), (4.0, 0.3)] {
            let actual = cache.value_at(&queue_key(), t);
            assert!(actual.is_some_and(|a| a.to_bits() == v.to_bits()), "t={t} got {actual:?}");
        }
    }

    #[test]
    fn short_series_and_unknown_key_are_absent() {
        let cache = cache_with(&[(0.0, 10.0)]);
        assert!(cache.value_at(&queue_key(), 0.0).is_none());
        let other = StatisticKey::new("Queue", None, "length");
        assert!(cache.value_at(&other, 0.0).is_none());
        assert!(cache.summary(&other).is_none());
    }

    #[test]
    fn duplicate_timestamps_take_first_pair() {
        let cache = cache_with(&[(0.0, 0.0), (5.0, 10.0), (5.0, 99.0), (10.0, 0.0)]);
        assert!(approx(cache.value_at(&queue_key(), 5.0), 10.0));
        assert!(approx(cache.value_at(&queue_key(), 7.5), 49.5));
    }

    #[test]
    fn range_query_is_inclusive_and_ordered() {
        let cache = cache_with(&[(0.0, 1.0), (2.0, 2.0), (4.0, 3.0), (6.0, 4.0)]);
        let times: Vec<f64> = cache
            .series_in_range(&queue_key(), 2.0, 4.0)
            .into_iter()
            .map(|p| p.time)
            .collect();
        assert_eq!(times.len(), 2);
        assert!(approx(times.first().copied(), 2.0));
        assert!(approx(times.get(1).copied(), 4.0));
    }

    #[test]
    fn range_query_empty_cases() {
        let cache = cache_with(&[(0.0, 1.0), (2.0, 2.0)]);
        assert!(cache.series_in_range(&queue_key(), 3.0, 1.0).is_empty());
        assert!(cache.series_in_range(&queue_key(), 5.0, 9.0).is_empty());
        let unknown = StatisticKey::new("Server", None, "utilization");
        assert!(cache.series_in_range(&unknown, 0.0, 10.0).is_empty());
    }

    #[test]
    fn first_file_keeps_contested_key() {
        let mut cache = StatisticsCache::new();
        let first = cache.insert("a.json", stat("Queue", Some("Teller"), "length", &[(0.0, 1.0), (1.0, 1.0)]));
        let second = cache.insert("b.json", stat("Queue", Some("Teller"), "length", &[(0.0, 9.0), (1.0, 9.0)]));

        assert_eq!(first, InsertOutcome::Inserted(queue_key()));
        assert_eq!(
            second,
            InsertOutcome::Duplicate {
                key: queue_key(),
                kept_path: String::from("a.json"),
            }
        );
        assert_eq!(cache.len(), 1);
        assert!(cache.is_loaded("b.json"));
        assert!(approx(cache.value_at(&queue_key(), 0.5), 1.0));
    }

    #[test]
    fn summarize_window() {
        let cache = cache_with(&[(0.0, 2.0), (1.0, 4.0), (2.0, 4.0), (3.0, 4.0), (4.0, 5.0), (5.0, 5.0), (6.0, 7.0), (7.0, 9.0)]);
        let summary = cache.summarize_range(&queue_key(), 0.0, 7.0);
        assert!(summary.is_some());
        let Some(summary) = summary else { return };

        assert_eq!(summary.count, 8);
        assert!(approx(summary.min, 2.0));
        assert!(approx(summary.max, 9.0));
        assert!(approx(summary.mean, 5.0));
        assert!(approx(summary.median, 4.5));
        assert!(approx(summary.std_dev, 2.0));

        assert!(cache.summarize_range(&queue_key(), 100.0, 200.0).is_none());
    }

    #[test]
    fn summarize_odd_count_median() {
        let summary = summarize(&[3.0, 1.0, 2.0]);
        assert!(approx(summary.and_then(|s| s.median), 2.0));
        assert!(summarize(&[]).is_none());
    }
}
