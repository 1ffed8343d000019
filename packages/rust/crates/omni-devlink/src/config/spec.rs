//! Canonical link specification.
//!
//! Every configuration form is normalized into a [`LinkSpecification`] with
//! absolute paths before any resolution runs. The specification is immutable
//! for the lifetime of a session.

use std::path::PathBuf;

/// Ignore globs applied under every watched directory.
pub const DEFAULT_IGNORES: &[&str] = &["node_modules/**", ".git/**", "**/*.log"];

/// One configured rule associating package identifiers with a local source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMapping {
    /// Package identifiers covered by this mapping.
    pub packages: Vec<String>,
    /// Absolute local directory, when the mapping names one.
    pub local_path: Option<PathBuf>,
    /// Entry-file override, relative to the package directory or absolute.
    pub entry: Option<String>,
    /// Exclusion globs, rooted under the package directory.
    pub exclude: Vec<String>,
}

impl LinkMapping {
    /// Mapping for one package with no overrides.
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            packages: vec![package.into()],
            ..Self::default()
        }
    }

    /// Set the explicit local directory.
    #[must_use]
    pub fn with_local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    /// Set the entry-file override.
    #[must_use]
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    /// Add an exclusion glob.
    #[must_use]
    pub fn excluding(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }
}

/// Session-wide defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDefaults {
    /// Absolute fallback root (also the scan root).
    pub fallback_root: Option<PathBuf>,
    /// Entry-file override for packages whose mapping has none.
    pub entry: Option<String>,
    /// Scan `fallback_root` for package manifests.
    pub scan: bool,
    /// Link every scanned package, not only the ones a mapping names.
    pub link_discovered: bool,
    /// Exclusion globs applied to every watched directory.
    pub exclude: Vec<String>,
}

/// User intent for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSpecification {
    /// Ordered mappings; the first mapping naming an identifier wins.
    pub mappings: Vec<LinkMapping>,
    /// Session-wide defaults.
    pub defaults: SessionDefaults,
}

impl LinkSpecification {
    /// `true` when the specification cannot link anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty() && !self.defaults.link_discovered
    }

    /// Directory to scan, if scanning is enabled and a root is configured.
    #[must_use]
    pub fn scan_root(&self) -> Option<&PathBuf> {
        self.defaults
            .fallback_root
            .as_ref()
            .filter(|_| self.defaults.scan)
    }
}
