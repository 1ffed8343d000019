//! Entry-file location for bare package imports.
//!
//! Tiers, highest first:
//!
//! 1. mapping-level entry override
//! 2. session-level entry override
//! 3. conventional entry files (`index.ts` before `index.js`)
//! 4. the manifest's `main`, else `module`
//!
//! A TypeScript entry is assumed to be the authored source and the JavaScript
//! file next to it its build output, so TypeScript is probed first.

use std::path::{Path, PathBuf};

use crate::error::LinkError;
use crate::manifest::{MANIFEST_FILE, PackageManifest};
use crate::paths::resolve_in_package;

/// Conventional entry files, in probe order.
pub const CONVENTIONAL_ENTRIES: &[&str] = &["index.ts", "index.js"];

/// Locate the file answering an import of the package's bare name.
///
/// Every candidate is checked for existence; the first one that exists wins.
///
/// # Errors
///
/// Returns [`LinkError::EntryNotFound`] when all four tiers are exhausted.
pub fn locate_entry(
    package_dir: &Path,
    mapping_entry: Option<&str>,
    session_entry: Option<&str>,
) -> Result<PathBuf, LinkError> {
    let overrides = [mapping_entry, session_entry]
        .into_iter()
        .flatten()
        .map(|entry| resolve_in_package(entry, package_dir));
    let conventional = CONVENTIONAL_ENTRIES.iter().map(|name| package_dir.join(name));

    if let Some(found) = overrides.chain(conventional).find(|p| p.is_file()) {
        return Ok(found);
    }

    if let Some(declared) = manifest_entry(package_dir)
        && declared.is_file()
    {
        return Ok(declared);
    }

    Err(LinkError::EntryNotFound(package_dir.to_path_buf()))
}

/// Entry declared by the package manifest, if any.
fn manifest_entry(package_dir: &Path) -> Option<PathBuf> {
    let manifest_path = package_dir.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        return None;
    }
    match PackageManifest::read(&manifest_path) {
        Ok(manifest) => manifest
            .declared_entry()
            .map(|entry| resolve_in_package(entry, package_dir)),
        Err(error) => {
            tracing::warn!(error = %error, "ignoring manifest entry");
            None
        }
    }
}
