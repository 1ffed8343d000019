//! Error types for link resolution and change propagation.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.
//!
//! None of these are fatal to the host process. The worst outcome of any
//! variant is that an identifier defers to the host's default resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Error types for the dev-link engine.
///
/// Each variant represents a specific failure mode in the link pipeline.
#[derive(Error, Debug)]
pub enum LinkError {
    /// No configuration file was found and no simplified form was supplied.
    #[error("Link configuration not found: {0}")]
    ConfigurationMissing(PathBuf),

    /// The configuration file exists but is not valid structured data.
    #[error("Invalid link configuration {path}: {message}")]
    ConfigurationInvalid {
        /// Configuration file that failed to parse.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A linked package directory does not exist on disk.
    #[error("Local package directory not found for {package}: {directory}")]
    DirectoryNotFound {
        /// Package identifier.
        package: String,
        /// Directory that was expected.
        directory: PathBuf,
    },

    /// None of the entry-file tiers produced an existing file.
    #[error("No entry file found in {0}")]
    EntryNotFound(PathBuf),

    /// No probe candidate for a subpath import exists.
    #[error("Subpath {subpath} not found in {directory}")]
    SubpathNotFound {
        /// Package directory that was probed.
        directory: PathBuf,
        /// Subpath requested by the import.
        subpath: String,
    },

    /// A `package.json` could not be read or parsed.
    #[error("Failed to read manifest {path}: {message}")]
    ManifestUnreadable {
        /// Manifest path.
        path: PathBuf,
        /// Read or parse message.
        message: String,
    },

    /// An exclusion glob failed to compile.
    #[error("Invalid exclusion pattern {pattern}: {source}")]
    InvalidPattern {
        /// Pattern as written in the configuration.
        pattern: String,
        /// Compiler error.
        #[source]
        source: globset::Error,
    },

    /// OS watch setup failed.
    #[cfg(feature = "notify")]
    #[error("Failed to watch {path}: {source}")]
    Watch {
        /// Directory that could not be watched.
        path: PathBuf,
        /// Underlying watcher error.
        #[source]
        source: notify::Error,
    },

    /// Low-level I/O error from std::io.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
