//! Loading, caching, and querying of replication animation data.
//!
//! A study directory holds one manifest per replication plus the entity
//! path and statistics files the manifests reference. This crate
//! discovers the manifests, activates one replication at a time, and
//! answers time-indexed queries against the active replication's data.
//!
//! # Modules
//!
//! - [`accessor`] -- [`ContentAccessor`] trait, in-memory accessor, and
//!   the [`StudyAccessor`] dispatch enum.
//! - [`fs_accessor`] -- File-system accessor backed by `tokio::fs`.
//! - [`dataset`] -- [`AnimationDataSet`]: registry, shared documents,
//!   and queries.
//! - [`discovery`] -- Manifest discovery under `replications/`.
//! - [`activation`] -- Replication activation and cache reload.
//! - [`entity_cache`] -- Merged entity path index.
//! - [`stats_cache`] -- Statistics keyed by metric identity.
//! - [`interpolate`] -- Bracketing and linear interpolation helpers.
//! - [`config`] -- Service configuration from `animation-config.yaml`.
//! - [`error`] -- Load and activation errors.
//!
//! [`ContentAccessor`]: accessor::ContentAccessor
//! [`StudyAccessor`]: accessor::StudyAccessor
//! [`AnimationDataSet`]: dataset::AnimationDataSet

pub mod accessor;
pub mod activation;
pub mod config;
pub mod dataset;
pub mod discovery;
pub mod entity_cache;
pub mod error;
pub mod fs_accessor;
pub mod interpolate;
pub mod stats_cache;

pub use accessor::{ContentAccessor, DirectoryEntry, MemoryContentAccessor, StudyAccessor};
pub use activation::ActivationReport;
pub use dataset::AnimationDataSet;
pub use discovery::{DiscoveryReport, SkippedEntry};
pub use error::{ActivationError, LoadError};
pub use fs_accessor::FsContentAccessor;
