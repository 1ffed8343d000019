//! `package.json` manifest reading.

use std::path::Path;

use serde::Deserialize;

use crate::error::LinkError;

/// Manifest file name probed in every package directory.
pub const MANIFEST_FILE: &str = "package.json";

/// The subset of `package.json` the link engine cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// Declared package name.
    #[serde(default)]
    pub name: Option<String>,
    /// CommonJS entry point.
    #[serde(default)]
    pub main: Option<String>,
    /// ES module entry point.
    #[serde(default)]
    pub module: Option<String>,
}

impl PackageManifest {
    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::ManifestUnreadable`] if the file cannot be read or
    /// is not valid JSON.
    pub fn read(path: &Path) -> Result<Self, LinkError> {
        let unreadable = |message: String| LinkError::ManifestUnreadable {
            path: path.to_path_buf(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| unreadable(e.to_string()))
    }

    /// Declared name, if present and non-empty.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Declared entry point: `main`, falling back to `module`.
    #[must_use]
    pub fn declared_entry(&self) -> Option<&str> {
        [self.main.as_deref(), self.module.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|entry| !entry.is_empty())
    }
}
