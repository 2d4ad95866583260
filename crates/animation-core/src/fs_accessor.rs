//! File-system backed [`ContentAccessor`].

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::accessor::{join_relative, ContentAccessor, DirectoryEntry};

/// Reads a study from a directory on disk using `tokio::fs`.
#[derive(Debug, Clone)]
pub struct FsContentAccessor {
    root: PathBuf,
}

impl FsContentAccessor {
    /// Create an accessor rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The study root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, relative_path: &str) -> PathBuf {
        let relative = relative_path.trim_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

impl ContentAccessor for FsContentAccessor {
    async fn read_file_as_text(&self, relative_path: &str) -> Option<String> {
        let path = self.full_path(relative_path);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "file not readable");
                None
            }
        }
    }

    async fn list_directory_contents(&self, relative_path: &str) -> Option<Vec<DirectoryEntry>> {
        let path = self.full_path(relative_path);
        let mut dir = match tokio::fs::read_dir(&path).await {
            Ok(dir) => dir,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "directory not listable");
                return None;
            }
        };

        let mut entries = Vec::new();
        loop {
            match dir.next_entry().await {
                Ok(Some(entry)) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    // An entry whose type cannot be read is listed as a file.
                    let is_directory = entry
                        .file_type()
                        .await
                        .is_ok_and(|file_type| file_type.is_dir());
                    entries.push(DirectoryEntry {
                        path: join_relative(relative_path, &name),
                        name,
                        is_directory,
                    });
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "directory listing interrupted");
                    return None;
                }
            }
        }

        // read_dir order is platform-dependent.
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Some(entries)
    }

    fn resolve_full_path(&self, relative_path: &str) -> String {
        self.full_path(relative_path).to_string_lossy().into_owned()
    }
}
