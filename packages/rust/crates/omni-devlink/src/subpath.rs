//! Subpath import resolution (`package/sub/path`).

use std::path::{Path, PathBuf};

use crate::error::LinkError;

/// Source extensions appended to a subpath, in probe order.
pub const SOURCE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".vue"];

/// How an import identifier relates to a linked package name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget<'a> {
    /// `import "pkg"`
    Bare,
    /// `import "pkg/rest"`; holds `rest`
    Subpath(&'a str),
}

/// Classify `identifier` against `package`.
///
/// `pkg` matches `pkg` and `pkg/...` but not `pkg-extra`.
#[must_use]
pub fn split_identifier<'a>(identifier: &'a str, package: &str) -> Option<ImportTarget<'a>> {
    let rest = identifier.strip_prefix(package)?;
    if rest.is_empty() {
        return Some(ImportTarget::Bare);
    }
    let subpath = rest.strip_prefix('/')?;
    if subpath.is_empty() {
        Some(ImportTarget::Bare)
    } else {
        Some(ImportTarget::Subpath(subpath))
    }
}

/// Locate the file answering `package/subpath`.
///
/// Probes `<dir>/<subpath>` with each of [`SOURCE_EXTENSIONS`] appended, then
/// the literal joined path (for subpaths that already carry an extension).
///
/// # Errors
///
/// Returns [`LinkError::SubpathNotFound`] when no candidate exists.
pub fn locate_subpath(package_dir: &Path, subpath: &str) -> Result<PathBuf, LinkError> {
    let target = package_dir.join(subpath);

    let with_extensions = SOURCE_EXTENSIONS.iter().map(|ext| {
        let mut candidate = target.clone().into_os_string();
        candidate.push(ext);
        PathBuf::from(candidate)
    });

    with_extensions
        .chain(std::iter::once(target.clone()))
        .find(|candidate| candidate.exists())
        .ok_or_else(|| LinkError::SubpathNotFound {
            directory: package_dir.to_path_buf(),
            subpath: subpath.to_string(),
        })
}
