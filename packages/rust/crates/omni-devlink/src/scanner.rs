//! Package directory discovery.
//!
//! Finds packages laid out either flat (`<root>/<name>/package.json`) or one
//! level namespaced (`<root>/@scope/<name>/package.json`) and maps the name
//! each manifest declares to the directory holding it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::manifest::{MANIFEST_FILE, PackageManifest};

/// Directories never descended into while scanning.
const SKIP_DIRS: &[&str] = &["node_modules"];

/// Discovered package name → absolute package directory.
pub type ScanResults = BTreeMap<String, PathBuf>;

/// Scan `root` for package manifests one and two segments deep.
///
/// A missing root yields an empty table. Manifests that fail to parse or
/// declare no name are skipped with a warning. Candidates are visited in
/// sorted path order, so when two manifests declare the same name the later
/// path wins deterministically.
#[must_use]
pub fn scan_packages(root: &Path) -> ScanResults {
    let mut packages = ScanResults::new();

    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "scan root does not exist");
        return packages;
    }

    let mut manifests: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .max_depth(3)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !should_skip(e))
        .filter_map(Result::ok)
        .filter(|e| e.depth() >= 2 && e.file_type().is_file() && e.file_name() == MANIFEST_FILE)
        .map(|e| e.path().to_path_buf())
        .collect();
    manifests.sort();

    for manifest_path in manifests {
        let manifest = match PackageManifest::read(&manifest_path) {
            Ok(manifest) => manifest,
            Err(error) => {
                tracing::warn!(error = %error, "skipping unreadable package manifest");
                continue;
            }
        };
        let Some(name) = manifest.package_name() else {
            tracing::debug!(path = %manifest_path.display(), "manifest has no name; skipping");
            continue;
        };
        let Some(package_dir) = manifest_path.parent() else {
            continue;
        };

        tracing::debug!(package = name, dir = %package_dir.display(), "discovered local package");
        if let Some(previous) = packages.insert(name.to_string(), package_dir.to_path_buf()) {
            tracing::warn!(
                package = name,
                kept = %package_dir.display(),
                replaced = %previous.display(),
                "duplicate package name during scan; later directory wins"
            );
        }
    }

    packages
}

/// Hidden entries and dependency folders are never package candidates.
fn should_skip(entry: &DirEntry) -> bool {
    let Some(name) = entry.file_name().to_str() else {
        return true;
    };
    if entry.file_type().is_dir() {
        return name.starts_with('.') || SKIP_DIRS.contains(&name);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, body: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), body).unwrap();
    }

    #[test]
    fn finds_flat_and_scoped_packages() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_manifest(&root.join("lodash"), r#"{"name":"lodash"}"#);
        write_manifest(&root.join("@test").join("icons"), r#"{"name":"@test/icons"}"#);

        let found = scan_packages(root);
        assert_eq!(found.len(), 2);
        assert_eq!(found["lodash"], root.join("lodash"));
        assert_eq!(found["@test/icons"], root.join("@test").join("icons"));
    }

    #[test]
    fn manifest_name_not_directory_name_is_the_key() {
        let temp = TempDir::new().unwrap();
        write_manifest(&temp.path().join("utils-src"), r#"{"name":"test-utils"}"#);

        let found = scan_packages(temp.path());
        assert_eq!(found.get("test-utils"), Some(&temp.path().join("utils-src")));
        assert!(!found.contains_key("utils-src"));
    }

    #[test]
    fn broken_manifest_does_not_abort_scan() {
        let temp = TempDir::new().unwrap();
        write_manifest(&temp.path().join("broken"), "{ nope");
        write_manifest(&temp.path().join("ok"), r#"{"name":"ok"}"#);

        let found = scan_packages(temp.path());
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn duplicate_names_resolve_to_last_sorted_path() {
        let temp = TempDir::new().unwrap();
        write_manifest(&temp.path().join("a-copy"), r#"{"name":"dup"}"#);
        write_manifest(&temp.path().join("b-copy"), r#"{"name":"dup"}"#);

        let found = scan_packages(temp.path());
        assert_eq!(found["dup"], temp.path().join("b-copy"));
    }

    #[test]
    fn skips_root_manifest_node_modules_and_deep_nesting() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_manifest(root, r#"{"name":"root-itself"}"#);
        write_manifest(&root.join("node_modules").join("dep"), r#"{"name":"dep"}"#);
        write_manifest(&root.join("a").join("b").join("c"), r#"{"name":"too-deep"}"#);

        assert!(scan_packages(root).is_empty());
    }

    #[test]
    fn hidden_and_dependency_directories_are_not_descended() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_manifest(&root.join("node_modules").join("dep"), r#"{"name":"dep"}"#);
        write_manifest(&root.join(".cache").join("x"), r#"{"name":"hidden"}"#);
        write_manifest(&root.join("app").join("node_modules"), r#"{"name":"nested-dep"}"#);
        write_manifest(&root.join("ui"), r#"{"name":"ui"}"#);

        let found = scan_packages(root);
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["ui"]);
    }

    #[test]
    fn missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(scan_packages(&temp.path().join("missing")).is_empty());
    }
}
