//! Host runtime boundary.
//!
//! The dev server that owns the live module graph is an external
//! collaborator. It hands this crate file-change notifications and import
//! requests, and exposes its graph through [`ModuleGraph`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What the host is currently doing. Only [`RunMode::Serve`] activates linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Interactive development server.
    Serve,
    /// One-shot production build.
    Build,
}

/// Identity of a live artifact in the host's module graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactId(pub String);

impl ArtifactId {
    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ArtifactId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// File system event kinds relevant to propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// File appeared.
    Created,
    /// File contents changed.
    Modified,
    /// File went away.
    Removed,
}

/// One file-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Event kind.
    pub kind: ChangeKind,
    /// Absolute path of the affected file.
    pub path: PathBuf,
}

impl FileChange {
    /// Create a change notification.
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Shorthand for a modification event.
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(ChangeKind::Modified, path)
    }
}

/// A set of live artifacts to invalidate in one host update cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationBatch {
    /// The change that caused the batch.
    pub cause: FileChange,
    /// Artifacts to invalidate, de-duplicated and sorted.
    pub artifacts: Vec<ArtifactId>,
}

/// Handle to the host's live session.
///
/// Implementations must treat invalidating an already-invalidated artifact
/// as a no-op, since duplicate file events can produce the same batch twice.
pub trait ModuleGraph {
    /// Live artifact currently loaded for an import identifier, if any.
    ///
    /// Returning `None` (for example, the artifact was already unloaded) is
    /// not an error; the identifier is skipped.
    fn artifact_for_identifier(&self, identifier: &str) -> Option<ArtifactId>;

    /// Live artifacts backed by `file`, plus every artifact importing them.
    ///
    /// Consulted for linked files this crate never resolved itself (peer
    /// files pulled in through relative imports).
    fn artifacts_for_file(&self, file: &Path) -> Vec<ArtifactId>;

    /// Invalidate every artifact in `batch` in a single update cycle.
    fn invalidate(&mut self, batch: &InvalidationBatch);
}
