//! Content access abstraction.
//!
//! The data set never touches a storage medium directly. Everything it
//! reads goes through a [`ContentAccessor`], which resolves paths
//! relative to a study root and reports failure as absence rather than
//! as an error.
//!
//! Two implementations ship with the crate:
//!
//! - [`FsContentAccessor`](crate::fs_accessor::FsContentAccessor) reads
//!   from a directory on disk.
//! - [`MemoryContentAccessor`] serves documents from an in-memory map,
//!   with directories inferred from file paths.
//!
//! [`StudyAccessor`] dispatches over both, so a single concrete data set
//! type can be shared by the HTTP layer regardless of where the study
//! lives.

use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;

use crate::fs_accessor::FsContentAccessor;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Entry name (last path segment).
    pub name: String,
    /// Path of the entry relative to the study root.
    pub path: String,
    /// Whether the entry is a directory.
    pub is_directory: bool,
}

/// Read access to the files of a study, relative to its root.
///
/// Implementations must never fail loudly: any I/O problem is reported
/// as `None`.
pub trait ContentAccessor: Send + Sync {
    /// Read a whole file as UTF-8 text.
    fn read_file_as_text(&self, relative_path: &str) -> impl Future<Output = Option<String>> + Send;

    /// List the entries of a directory, or `None` if it cannot be listed.
    fn list_directory_contents(
        &self,
        relative_path: &str,
    ) -> impl Future<Output = Option<Vec<DirectoryEntry>>> + Send;

    /// Join `relative_path` onto the study root. Performs no I/O.
    fn resolve_full_path(&self, relative_path: &str) -> String;
}

/// Join a child name onto a relative directory path.
pub(crate) fn join_relative(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        String::from(name)
    } else {
        format!("{dir}/{name}")
    }
}

// ---------------------------------------------------------------------------
// In-memory accessor
// ---------------------------------------------------------------------------

/// Serves files from memory.
///
/// A directory exists exactly when at least one stored file lives
/// underneath it.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentAccessor {
    root: String,
    files: BTreeMap<String, String>,
}

impl MemoryContentAccessor {
    /// Create an empty accessor whose paths resolve under `root`.
    pub fn new(root: &str) -> Self {
        Self {
            root: String::from(root.trim_end_matches('/')),
            files: BTreeMap::new(),
        }
    }

    /// Store `contents` at `relative_path`, replacing any previous file.
    pub fn insert(&mut self, relative_path: &str, contents: impl Into<String>) {
        self.files
            .insert(String::from(relative_path.trim_matches('/')), contents.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_file(mut self, relative_path: &str, contents: impl Into<String>) -> Self {
        self.insert(relative_path, contents);
        self
    }

    fn list_sync(&self, relative_path: &str) -> Option<Vec<DirectoryEntry>> {
        let dir = relative_path.trim_matches('/');
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        // name -> is_directory; a directory wins over a same-named file.
        let mut children: BTreeMap<&str, bool> = BTreeMap::new();
        for path in self.files.keys() {
            let Some(rest) = path.strip_prefix(prefix.as_str()) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    children.insert(child, true);
                }
                None => {
                    children.entry(rest).or_insert(false);
                }
            }
        }

        if children.is_empty() {
            return None;
        }

        Some(
            children
                .into_iter()
                .map(|(name, is_directory)| DirectoryEntry {
                    name: String::from(name),
                    path: join_relative(dir, name),
                    is_directory,
                })
                .collect(),
        )
    }
}

impl ContentAccessor for MemoryContentAccessor {
    async fn read_file_as_text(&self, relative_path: &str) -> Option<String> {
        self.files.get(relative_path.trim_matches('/')).cloned()
    }

    async fn list_directory_contents(&self, relative_path: &str) -> Option<Vec<DirectoryEntry>> {
        self.list_sync(relative_path)
    }

    fn resolve_full_path(&self, relative_path: &str) -> String {
        let relative = relative_path.trim_start_matches('/');
        if self.root.is_empty() {
            String::from(relative)
        } else {
            format!("{}/{relative}", self.root)
        }
    }
}

// ---------------------------------------------------------------------------
// Unified accessor enum
// ---------------------------------------------------------------------------

/// Either accessor, behind one concrete type.
///
/// Uses enum dispatch so the HTTP state does not have to be generic.
#[derive(Debug, Clone)]
pub enum StudyAccessor {
    /// A study directory on disk.
    Fs(FsContentAccessor),
    /// A study held in memory.
    Memory(MemoryContentAccessor),
}

impl StudyAccessor {
    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Fs(_) => "filesystem",
            Self::Memory(_) => "memory",
        }
    }
}

impl From<FsContentAccessor> for StudyAccessor {
    fn from(accessor: FsContentAccessor) -> Self {
        Self::Fs(accessor)
    }
}

impl From<MemoryContentAccessor> for StudyAccessor {
    fn from(accessor: MemoryContentAccessor) -> Self {
        Self::Memory(accessor)
    }
}

impl ContentAccessor for StudyAccessor {
    async fn read_file_as_text(&self, relative_path: &str) -> Option<String> {
        match self {
            Self::Fs(accessor) => accessor.read_file_as_text(relative_path).await,
            Self::Memory(accessor) => accessor.read_file_as_text(relative_path).await,
        }
    }

    async fn list_directory_contents(&self, relative_path: &str) -> Option<Vec<DirectoryEntry>> {
        match self {
            Self::Fs(accessor) => accessor.list_directory_contents(relative_path).await,
            Self::Memory(accessor) => accessor.list_directory_contents(relative_path).await,
        }
    }

    fn resolve_full_path(&self, relative_path: &str) -> String {
        match self {
            Self::Fs(accessor) => accessor.resolve_full_path(relative_path),
            Self::Memory(accessor) => accessor.resolve_full_path(relative_path),
        }
    }
}
