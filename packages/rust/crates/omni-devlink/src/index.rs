//! Dependency index: backing file ↔ import identifiers.
//!
//! Populated as a side effect of successful resolutions and consulted on
//! every file change. The index is append-only for the life of a session:
//! when an identifier is re-bound to another file, the old file keeps the
//! identifier in its set. The index is therefore always a superset of the
//! live bindings, so a change can cause an extra invalidation but never a
//! missed one.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Bidirectional file/identifier map, held as one unit.
#[derive(Debug, Clone, Default)]
pub struct DependencyIndex {
    file_to_identifiers: HashMap<PathBuf, BTreeSet<String>>,
    identifier_to_file: HashMap<String, PathBuf>,
}

impl DependencyIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `identifier` currently resolves to `file`.
    ///
    /// Idempotent. Returns `true` if the pair was not already present.
    pub fn record(&mut self, file: &Path, identifier: &str) -> bool {
        let inserted = self
            .file_to_identifiers
            .entry(file.to_path_buf())
            .or_default()
            .insert(identifier.to_string());

        match self.identifier_to_file.get_mut(identifier) {
            Some(current) if current.as_path() == file => {}
            Some(current) => {
                tracing::debug!(
                    identifier,
                    from = %current.display(),
                    to = %file.display(),
                    "identifier re-bound to a new file"
                );
                *current = file.to_path_buf();
            }
            None => {
                self.identifier_to_file
                    .insert(identifier.to_string(), file.to_path_buf());
            }
        }

        inserted
    }

    /// Identifiers that have resolved to `file` during this session.
    #[must_use]
    pub fn lookup_by_file(&self, file: &Path) -> BTreeSet<String> {
        self.file_to_identifiers
            .get(file)
            .cloned()
            .unwrap_or_default()
    }

    /// File `identifier` most recently resolved to.
    #[must_use]
    pub fn file_for(&self, identifier: &str) -> Option<&Path> {
        self.identifier_to_file.get(identifier).map(PathBuf::as_path)
    }

    /// Number of distinct (file, identifier) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.file_to_identifiers.values().map(BTreeSet::len).sum()
    }

    /// `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_to_identifiers.is_empty()
    }

    /// Drop everything. Session teardown only.
    pub fn clear(&mut self) {
        self.file_to_identifiers.clear();
        self.identifier_to_file.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_lookup_round_trip() {
        let mut index = DependencyIndex::new();
        let file = Path::new("/pkgs/ui/index.ts");

        index.record(file, "ui");
        assert!(index.lookup_by_file(file).contains("ui"));

        index.record(file, "ui/index");
        let ids = index.lookup_by_file(file);
        assert!(ids.contains("ui") && ids.contains("ui/index"));
    }

    #[test]
    fn record_is_idempotent() {
        let mut index = DependencyIndex::new();
        let file = Path::new("/pkgs/ui/index.ts");

        assert!(index.record(file, "ui"));
        assert!(!index.record(file, "ui"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn rebinding_keeps_old_file_entry() {
        let mut index = DependencyIndex::new();
        let old = Path::new("/pkgs/ui/index.js");
        let new = Path::new("/pkgs/ui/index.ts");

        index.record(old, "ui");
        index.record(new, "ui");

        assert_eq!(index.file_for("ui"), Some(new));
        assert!(index.lookup_by_file(old).contains("ui"));
        assert!(index.lookup_by_file(new).contains("ui"));
    }

    #[test]
    fn clear_empties_both_tables() {
        let mut index = DependencyIndex::new();
        index.record(Path::new("/a.ts"), "a");
        index.clear();
        assert!(index.is_empty());
        assert!(index.file_for("a").is_none());
    }
}
