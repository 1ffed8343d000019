//! Path resolution anchored to the configuration's own location.
//!
//! Link paths are authored relative to the file that declares them, so the
//! same configuration stays valid wherever the dev session is launched from.
//! Nothing in here consults the process working directory.

use std::path::{Component, Path, PathBuf};

/// Resolve a configured path against the configuration base directory.
///
/// Logic:
/// 1. If absolute, return as-is (normalized)
/// 2. If relative, anchor to `base`
///
/// Purely syntactic: `.` and `..` are folded without touching the disk.
#[must_use]
pub fn resolve_path(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        return normalize(path);
    }
    normalize(&base.as_ref().join(path))
}

/// Resolve a path that may be relative to a package directory.
///
/// Used for entry-file overrides, which are written relative to the package
/// they select an entry for rather than to the configuration file.
#[inline]
#[must_use]
pub fn resolve_in_package(path: &str, package_dir: &Path) -> PathBuf {
    resolve_path(path, package_dir)
}

/// Lexically normalize a path.
///
/// `..` never climbs above the root of an absolute path.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_is_returned_unchanged() {
        assert_eq!(
            resolve_path("/opt/pkgs/ui", "/work/app"),
            PathBuf::from("/opt/pkgs/ui")
        );
    }

    #[test]
    fn relative_path_is_anchored_to_base() {
        assert_eq!(
            resolve_path("./local-packages/ui", "/work/app"),
            PathBuf::from("/work/app/local-packages/ui")
        );
        assert_eq!(
            resolve_path("../shared", "/work/app"),
            PathBuf::from("/work/shared")
        );
    }

    #[test]
    fn parent_never_escapes_root() {
        assert_eq!(normalize(Path::new("/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn relative_parents_are_kept_when_nothing_to_pop() {
        assert_eq!(normalize(Path::new("../x/./y")), PathBuf::from("../x/y"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }
}
