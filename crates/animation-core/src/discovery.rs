//! Manifest discovery.
//!
//! Scans `replications/` for `rep_<id>` directories, parses each
//! directory's manifest, and registers it under the replication number
//! the manifest declares. The directory name is only used to find the
//! manifest; it is not checked against the declared number.
//!
//! The first manifest that names a model layout (or visual config) that
//! can actually be loaded provides it for the lifetime of the data set.
//! Later manifests never replace it.

use animation_types::{ModelLayout, ReplicationId, ReplicationManifest, SharedVisualConfig};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::accessor::ContentAccessor;
use crate::dataset::{fetch_document, AnimationDataSet};

/// Directory under the study root that holds one folder per replication.
pub const REPLICATIONS_DIR: &str = "replications";

/// Prefix of replication directory names.
const REPLICATION_DIR_PREFIX: &str = "rep_";

/// Outcome of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    /// IDs registered (or re-registered) by this pass, in listing order.
    pub registered: Vec<ReplicationId>,
    /// Entries that were considered and passed over.
    pub skipped: Vec<SkippedEntry>,
}

/// A `replications/` entry discovery did not register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// Entry name.
    pub name: String,
    /// Why it was skipped.
    pub reason: String,
}

impl SkippedEntry {
    fn new(name: &str, reason: impl Into<String>) -> Self {
        Self {
            name: String::from(name),
            reason: reason.into(),
        }
    }
}

/// Whether `name` follows the `rep_<digits>` convention.
pub fn is_replication_dir_name(name: &str) -> bool {
    name.strip_prefix(REPLICATION_DIR_PREFIX)
        .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}

/// Expected manifest path for a replication directory.
pub fn manifest_path(dir_name: &str) -> String {
    format!("{REPLICATIONS_DIR}/{dir_name}/animation_manifest_{dir_name}.json")
}

impl<A: ContentAccessor> AnimationDataSet<A> {
    /// Scan `replications/` and register every well-formed manifest.
    ///
    /// Never fails: unreadable or malformed entries are skipped with a
    /// diagnostic, and an unlistable directory makes this a no-op.
    pub async fn discover_replications(&mut self) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();

        let Some(entries) = self.accessor.list_directory_contents(REPLICATIONS_DIR).await else {
            warn!(dir = REPLICATIONS_DIR, "replications directory not listable, nothing discovered");
            return report;
        };

        for entry in entries {
            if !entry.is_directory {
                debug!(name = %entry.name, "skipping non-directory entry");
                report.skipped.push(SkippedEntry::new(&entry.name, "not a directory"));
                continue;
            }
            if !is_replication_dir_name(&entry.name) {
                debug!(name = %entry.name, "skipping directory outside naming convention");
                report.skipped.push(SkippedEntry::new(&entry.name, "name does not match rep_<id>"));
                continue;
            }

            let path = manifest_path(&entry.name);
            let manifest: ReplicationManifest = match fetch_document(&self.accessor, &path).await {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!(name = %entry.name, error = %e, "skipping replication");
                    report.skipped.push(SkippedEntry::new(&entry.name, e.to_string()));
                    continue;
                }
            };

            self.adopt_shared_documents(&manifest).await;

            let id = manifest.replication_id();
            if self.manifests.insert(id, manifest).is_some() {
                debug!(replication = %id, "replaced previously registered manifest");
            }
            report.registered.push(id);
        }

        info!(
            registered = report.registered.len(),
            skipped = report.skipped.len(),
            total = self.manifests.len(),
            "replication discovery complete"
        );
        report
    }

    /// Load the shared layout and visual config if still unset.
    async fn adopt_shared_documents(&mut self, manifest: &ReplicationManifest) {
        if self.model_layout.is_none()
            && let Some(path) = manifest.metadata.model_layout_path.as_deref()
        {
            match fetch_document::<_, ModelLayout>(&self.accessor, path).await {
                Ok(layout) => {
                    info!(path, replication = %manifest.replication_id(), "model layout loaded");
                    self.model_layout = Some(layout);
                }
                Err(e) => warn!(error = %e, "model layout not loaded"),
            }
        }

        if self.visual_config.is_none()
            && let Some(path) = manifest.metadata.shared_visual_config_path.as_deref()
        {
            match fetch_document::<_, SharedVisualConfig>(&self.accessor, path).await {
                Ok(config) => {
                    info!(path, replication = %manifest.replication_id(), "shared visual config loaded");
                    self.visual_config = Some(config);
                }
                Err(e) => warn!(error = %e, "shared visual config not loaded"),
            }
        }
    }
}
