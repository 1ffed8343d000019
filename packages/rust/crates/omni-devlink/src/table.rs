//! Effective link table: which local directory backs each linked package.
//!
//! # Precedence
//!
//! For every identifier a mapping names, highest first:
//!
//! 1. the mapping's own `local_path`
//! 2. the scanned directory, when scanning is on and the name was discovered
//! 3. the session fallback root
//!
//! Scanned directories reflect the name a package's manifest actually
//! declares, so they are preferred over the fallback root, which may only be
//! a parent of the package.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::{LinkMapping, LinkSpecification, SessionDefaults};
use crate::error::LinkError;
use crate::scanner::ScanResults;

/// Resolve the directory for every identifier of one mapping.
///
/// Identifiers that no precedence tier covers, and empty identifiers, are
/// skipped with a warning; the remaining identifiers still resolve.
#[must_use]
pub fn resolve_package_paths(
    mapping: &LinkMapping,
    scanned: &ScanResults,
    defaults: &SessionDefaults,
) -> BTreeMap<String, PathBuf> {
    let mut resolved = BTreeMap::new();

    for package in &mapping.packages {
        let package = package.trim();
        if package.is_empty() {
            tracing::warn!("link mapping contains an empty package name; skipping");
            continue;
        }

        let directory = mapping
            .local_path
            .clone()
            .or_else(|| scanned.get(package).filter(|_| defaults.scan).cloned())
            .or_else(|| defaults.fallback_root.clone());

        match directory {
            Some(directory) => {
                resolved.insert(package.to_string(), directory);
            }
            None => tracing::warn!(
                package,
                "package has no localPath and no global localPath; skipping"
            ),
        }
    }

    resolved
}

/// One linked package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Package identifier (bare import name).
    pub package: String,
    /// Absolute local directory.
    pub directory: PathBuf,
    /// Entry override from the originating mapping.
    pub entry: Option<String>,
    /// Exclusion globs from the originating mapping.
    pub exclude: Vec<String>,
}

/// Package identifier → local directory, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveLinkTable {
    entries: Vec<LinkEntry>,
}

impl EffectiveLinkTable {
    /// Merge the specification with the current scan output.
    ///
    /// Directories that do not exist right now are left out. When several
    /// mappings name the same identifier, the first one is kept.
    #[must_use]
    pub fn build(spec: &LinkSpecification, scanned: &ScanResults) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for mapping in &spec.mappings {
            for (package, directory) in resolve_package_paths(mapping, scanned, &spec.defaults) {
                if seen.contains(&package) {
                    tracing::debug!(package = %package, "package already linked by an earlier mapping");
                    continue;
                }
                if !directory.is_dir() {
                    let error = LinkError::DirectoryNotFound { package, directory };
                    tracing::warn!(error = %error, "skipping link");
                    continue;
                }
                seen.insert(package.clone());
                entries.push(LinkEntry {
                    package,
                    directory,
                    entry: mapping.entry.clone(),
                    exclude: mapping.exclude.clone(),
                });
            }
        }

        if spec.defaults.link_discovered {
            for (package, directory) in scanned {
                if seen.insert(package.clone()) {
                    entries.push(LinkEntry {
                        package: package.clone(),
                        directory: directory.clone(),
                        entry: None,
                        exclude: Vec::new(),
                    });
                }
            }
        }

        Self { entries }
    }

    /// Linked packages in resolution order.
    #[must_use]
    pub fn entries(&self) -> &[LinkEntry] {
        &self.entries
    }

    /// Look up one package.
    #[must_use]
    pub fn get(&self, package: &str) -> Option<&LinkEntry> {
        self.entries.iter().find(|e| e.package == package)
    }

    /// Directory linked for `package`.
    #[must_use]
    pub fn directory_of(&self, package: &str) -> Option<&Path> {
        self.get(package).map(|e| e.directory.as_path())
    }

    /// Number of linked packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is linked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
