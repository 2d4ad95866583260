//! Shared data model for replication animation data sets.
//!
//! Every document the animation data service reads from a study
//! directory deserializes into a type defined here. Types flow to
//! `TypeScript` via `ts-rs` for the visualization client.
//!
//! # Modules
//!
//! - [`ids`] -- Replication and entity identifiers
//! - [`manifest`] -- Replication manifests, file references, shared documents
//! - [`entity`] -- Entity paths and path points
//! - [`statistics`] -- Statistics files, summaries, and time series

pub mod entity;
pub mod ids;
pub mod manifest;
pub mod statistics;

// Re-export all public types at crate root for convenience.
pub use entity::{EntityPath, EntityPathBatch, EntityPosition, PathPoint};
pub use ids::{EntityId, ReplicationId};
pub use manifest::{
    EntityPathFileRef, ModelLayout, ReplicationManifest, ReplicationMetadata, SharedVisualConfig,
    StatisticsFileRef,
};
pub use statistics::{
    StatisticKey, StatisticsFile, StatisticsMetadata, StatisticsSummary, TimeSeriesPoint,
};
