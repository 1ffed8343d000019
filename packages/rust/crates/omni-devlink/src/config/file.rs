//! Link config loader: read `dev-link.json` (or `.yaml`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LinkError;

/// Config file looked up in the project root when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "dev-link.json";

/// Top-level config file shape:
/// `{ "links": [...], "globalLocalPath": "...", "globalExclude": [...], "autoScan": true }`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkConfigFile {
    /// Ordered link mappings.
    #[serde(default)]
    pub links: Vec<LinkMappingFile>,
    /// Fallback local root used when a mapping names no directory.
    #[serde(default)]
    pub global_local_path: Option<PathBuf>,
    /// Exclusion globs applied to every watched directory.
    #[serde(default)]
    pub global_exclude: Vec<String>,
    /// Scan `globalLocalPath` for `package.json` manifests.
    #[serde(default)]
    pub auto_scan: bool,
    /// Entry-file override applied to every package without its own.
    #[serde(default)]
    pub global_entry: Option<String>,
}

/// Per-mapping entry in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMappingFile {
    /// One package name or a list of them.
    pub package: PackageNames,
    /// Local source directory for the named packages.
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    /// Exclusion globs, relative to the package directory.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Entry file, relative to the package directory.
    #[serde(default)]
    pub entry: Option<String>,
}

/// `"package": "a"` or `"package": ["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PackageNames {
    /// A single package identifier.
    One(String),
    /// Several identifiers sharing one mapping.
    Many(Vec<String>),
}

impl PackageNames {
    /// Flatten into a list of identifiers.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(name) => vec![name],
            Self::Many(names) => names,
        }
    }
}

impl From<&str> for PackageNames {
    fn from(name: &str) -> Self {
        Self::One(name.to_string())
    }
}

/// Load a link config file.
///
/// Files ending in `.yaml`/`.yml` are parsed as YAML, everything else as JSON.
///
/// # Errors
///
/// - [`LinkError::ConfigurationMissing`] if the file does not exist
/// - [`LinkError::Io`] if it exists but cannot be read
/// - [`LinkError::ConfigurationInvalid`] if it cannot be parsed
pub fn load_link_config(path: &Path) -> Result<LinkConfigFile, LinkError> {
    if !path.exists() {
        return Err(LinkError::ConfigurationMissing(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let parsed = if is_yaml {
        serde_yaml::from_str::<LinkConfigFile>(&raw).map_err(|e| e.to_string())
    } else {
        serde_json::from_str::<LinkConfigFile>(&raw).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| LinkError::ConfigurationInvalid {
        path: path.to_path_buf(),
        message,
    })
}
