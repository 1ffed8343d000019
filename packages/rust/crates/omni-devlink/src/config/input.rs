//! Alternative configuration forms and their normalization.
//!
//! Besides the full config file there are three shorthand forms: a single
//! auto-scanned root, a direct name → path table, and a named preset. Each is
//! normalized by [`LinkConfigInput::normalize`] into one [`LinkSpecification`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::file::LinkConfigFile;
use super::spec::{LinkMapping, LinkSpecification, SessionDefaults};
use crate::paths::resolve_path;

/// Conventional layouts selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// `./local-packages/*`
    LocalPackages,
    /// `./packages/*` monorepo layout
    Packages,
    /// Sibling checkouts next to the project (`../*`)
    Siblings,
}

impl Preset {
    /// Root directory, relative to the project.
    #[must_use]
    pub const fn root(self) -> &'static str {
        match self {
            Self::LocalPackages => "local-packages",
            Self::Packages => "packages",
            Self::Siblings => "..",
        }
    }
}

/// Exclusions every preset adds on top of the default ignore set.
pub const PRESET_EXCLUDES: &[&str] = &["dist/**", "**/*.map"];

/// Every accepted configuration shape.
#[derive(Debug, Clone)]
pub enum LinkConfigInput {
    /// Full mapping list (from `dev-link.json` or built inline).
    Full(LinkConfigFile),
    /// Scan one root and link every package found there.
    ScanRoot(PathBuf),
    /// Direct `name → directory` table.
    Packages(BTreeMap<String, PathBuf>),
    /// Named conventional layout.
    Preset(Preset),
}

impl LinkConfigInput {
    /// Shorthand forms imply intent and bypass the environment toggle.
    #[must_use]
    pub fn is_simplified(&self) -> bool {
        !matches!(self, Self::Full(_))
    }

    /// Normalize into the canonical specification.
    ///
    /// Relative paths are anchored to `base`, the directory holding the
    /// configuration (the project root for inline forms).
    #[must_use]
    pub fn normalize(self, base: &Path) -> LinkSpecification {
        match self {
            Self::Full(file) => normalize_file(file, base),
            Self::ScanRoot(root) => scan_everything(resolve_path(root, base), Vec::new()),
            Self::Packages(table) => LinkSpecification {
                mappings: table
                    .into_iter()
                    .map(|(name, dir)| LinkMapping::new(name).with_local_path(resolve_path(dir, base)))
                    .collect(),
                defaults: SessionDefaults::default(),
            },
            Self::Preset(preset) => scan_everything(
                resolve_path(preset.root(), base),
                PRESET_EXCLUDES.iter().map(ToString::to_string).collect(),
            ),
        }
    }
}

fn scan_everything(root: PathBuf, exclude: Vec<String>) -> LinkSpecification {
    LinkSpecification {
        mappings: Vec::new(),
        defaults: SessionDefaults {
            fallback_root: Some(root),
            entry: None,
            scan: true,
            link_discovered: true,
            exclude,
        },
    }
}

fn normalize_file(file: LinkConfigFile, base: &Path) -> LinkSpecification {
    let mappings = file
        .links
        .into_iter()
        .map(|link| LinkMapping {
            packages: link.package.into_vec(),
            local_path: link.local_path.map(|p| resolve_path(p, base)),
            entry: link.entry.filter(|e| !e.trim().is_empty()),
            exclude: link.exclude,
        })
        .collect();

    LinkSpecification {
        mappings,
        defaults: SessionDefaults {
            fallback_root: file.global_local_path.map(|p| resolve_path(p, base)),
            entry: file.global_entry.filter(|e| !e.trim().is_empty()),
            scan: file.auto_scan,
            link_discovered: false,
            exclude: file.global_exclude,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LinkMappingFile, PackageNames};

    #[test]
    fn file_form_anchors_paths_to_config_dir() {
        let file = LinkConfigFile {
            links: vec![LinkMappingFile {
                package: PackageNames::from("ui"),
                local_path: Some(PathBuf::from("../ui")),
                exclude: vec![],
                entry: Some("src/index.ts".into()),
            }],
            global_local_path: Some(PathBuf::from("pkgs")),
            global_exclude: vec![],
            auto_scan: true,
            global_entry: None,
        };

        let spec = LinkConfigInput::Full(file).normalize(Path::new("/work/app"));
        assert_eq!(spec.mappings[0].local_path, Some(PathBuf::from("/work/ui")));
        assert_eq!(spec.defaults.fallback_root, Some(PathBuf::from("/work/app/pkgs")));
        assert_eq!(spec.scan_root(), Some(&PathBuf::from("/work/app/pkgs")));
        assert!(!spec.defaults.link_discovered);
    }

    #[test]
    fn scan_root_links_everything_discovered() {
        let input = LinkConfigInput::ScanRoot(PathBuf::from("local-packages"));
        assert!(input.is_simplified());

        let spec = input.normalize(Path::new("/work/app"));
        assert!(spec.mappings.is_empty());
        assert!(spec.defaults.scan && spec.defaults.link_discovered);
        assert!(!spec.is_empty());
    }

    #[test]
    fn direct_table_becomes_explicit_mappings() {
        let table = BTreeMap::from([
            ("lodash".to_string(), PathBuf::from("/src/lodash")),
            ("ui".to_string(), PathBuf::from("./ui")),
        ]);
        let spec = LinkConfigInput::Packages(table).normalize(Path::new("/work"));
        assert_eq!(
            spec.mappings,
            vec![
                LinkMapping::new("lodash").with_local_path("/src/lodash"),
                LinkMapping::new("ui").with_local_path("/work/ui"),
            ]
        );
    }

    #[test]
    fn preset_selects_conventional_root() {
        let spec = LinkConfigInput::Preset(Preset::Siblings).normalize(Path::new("/work/app"));
        assert_eq!(spec.defaults.fallback_root, Some(PathBuf::from("/work")));
        assert!(spec.defaults.exclude.contains(&"dist/**".to_string()));
        assert_eq!(spec.defaults.exclude.len(), PRESET_EXCLUDES.len());
    }
}
