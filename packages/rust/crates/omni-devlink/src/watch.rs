//! Watch set: one entry per distinct linked directory.
//!
//! Each entry carries the exclusion globs of every mapping that linked the
//! directory. Patterns are rooted under the directory, so they are matched
//! against the changed file's path relative to it. When two mappings share a
//! directory, a file is excluded only if every mapping excludes it; a mapping
//! that still cares about the file keeps it live.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::DEFAULT_IGNORES;
use crate::error::LinkError;
use crate::table::EffectiveLinkTable;

/// One watched directory.
#[derive(Debug, Clone)]
pub struct WatchEntry {
    directory: PathBuf,
    canonical: Option<PathBuf>,
    packages: Vec<String>,
    exclusions: Vec<GlobSet>,
}

impl WatchEntry {
    fn new(directory: PathBuf) -> Self {
        let canonical = std::fs::canonicalize(&directory)
            .ok()
            .filter(|c| *c != directory);
        Self {
            directory,
            canonical,
            packages: Vec::new(),
            exclusions: Vec::new(),
        }
    }

    /// Watched directory as configured.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Packages linked to this directory.
    #[must_use]
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Path of `path` relative to this directory, if it lies inside it.
    ///
    /// Events may report the canonical form of a path (symlinks resolved), so
    /// both the configured and canonical directory are tried.
    #[must_use]
    pub fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.directory).ok().or_else(|| {
            self.canonical
                .as_deref()
                .and_then(|canonical| path.strip_prefix(canonical).ok())
        })
    }

    /// `path` rewritten under the configured directory.
    #[must_use]
    pub fn configured_path(&self, path: &Path) -> Option<PathBuf> {
        self.relative(path).map(|rel| self.directory.join(rel))
    }

    /// `true` when every mapping watching this directory excludes `path`.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        let Some(relative) = self.relative(path) else {
            return false;
        };
        if relative.as_os_str().is_empty() {
            return false;
        }
        !self.exclusions.is_empty() && self.exclusions.iter().all(|set| set.is_match(relative))
    }
}

/// All watched directories of a session, de-duplicated.
#[derive(Debug, Clone, Default)]
pub struct WatchSet {
    entries: Vec<WatchEntry>,
}

impl WatchSet {
    /// Build from the link table.
    #[must_use]
    pub fn from_table(table: &EffectiveLinkTable, session_exclude: &[String]) -> Self {
        let mut set = Self::default();
        set.extend_from(table, session_exclude);
        set
    }

    /// Add directories from `table` that are not watched yet, and record new
    /// mappings for directories that are. Returns the newly watched
    /// directories.
    pub fn extend_from(
        &mut self,
        table: &EffectiveLinkTable,
        session_exclude: &[String],
    ) -> Vec<PathBuf> {
        let mut added = Vec::new();

        for link in table.entries() {
            let position = match self.position_of(&link.directory) {
                Some(position) => position,
                None => {
                    self.entries.push(WatchEntry::new(link.directory.clone()));
                    added.push(link.directory.clone());
                    self.entries.len() - 1
                }
            };
            let entry = &mut self.entries[position];
            if entry.packages.contains(&link.package) {
                continue;
            }
            entry.packages.push(link.package.clone());
            entry
                .exclusions
                .push(compile_exclusions(&link.exclude, session_exclude));
        }

        added
    }

    /// Deepest watched directory containing `path`.
    #[must_use]
    pub fn owner_of(&self, path: &Path) -> Option<&WatchEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.relative(path).is_some())
            .max_by_key(|entry| entry.directory.components().count())
    }

    /// Watched directories.
    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.directory.as_path())
    }

    /// Watch entries.
    #[must_use]
    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    /// Number of watched directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is watched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position_of(&self, directory: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.directory == directory)
    }
}

/// Compile mapping patterns ∪ session patterns ∪ default ignores.
///
/// Invalid patterns are dropped with a warning.
fn compile_exclusions(mapping: &[String], session: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();

    let defaults = DEFAULT_IGNORES.iter().copied();
    let configured = mapping.iter().chain(session).map(String::as_str);

    for pattern in defaults.chain(configured) {
        match GlobBuilder::new(pattern).literal_separator(true).build() {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(source) => {
                let error = LinkError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                };
                tracing::warn!(error = %error, "dropping exclusion pattern");
            }
        }
    }

    builder.build().unwrap_or_else(|error| {
        tracing::warn!(error = %error, "failed to compile exclusion set");
        GlobSet::empty()
    })
}
