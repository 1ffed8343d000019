#![allow(clippy::doc_markdown)]

//! omni-devlink - Local package linking for Omni DevEnv dev sessions
//!
//! Redirects imports of selected packages to local source checkouts and turns
//! edits in those checkouts into targeted invalidations of the host's live
//! module graph.
//!
//! # Features
//!
//! - **Link table**: explicit mappings, scanned package roots, presets
//! - **Resolution**: bare identifiers to entry files, subpaths to source files
//! - **Propagation**: file change → one batched invalidation
//! - **Watching**: optional OS watches via `notify` (feature `notify`)
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! omni-devlink/src/
//! ├── lib.rs        # Re-exports (this file)
//! ├── error.rs      # LinkError enum
//! ├── paths.rs      # Path normalization
//! ├── manifest.rs   # package.json reading
//! ├── scanner.rs    # Package directory scanning
//! ├── config/       # Config file + input forms → LinkSpecification
//! ├── table.rs      # Effective link table
//! ├── entry.rs      # Entry file location
//! ├── subpath.rs    # Subpath import location
//! ├── index.rs      # File ↔ identifier index
//! ├── host.rs       # ModuleGraph seam
//! ├── watch.rs      # Watched directories + exclusions
//! ├── propagate.rs  # Change propagation
//! ├── watcher.rs    # notify-backed OS watches
//! ├── activation.rs # Activation gate
//! └── session.rs    # LinkSession orchestration
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use omni_devlink::{LinkSession, Resolution, SessionOptions};
//!
//! let mut session = LinkSession::start(SessionOptions::new("/work/app"));
//! if let Resolution::Resolved(file) = session.resolve_id("@acme/ui", None) {
//!     println!("serving {}", file.display());
//! }
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod activation;
pub mod config;
mod entry;
mod error;
mod host;
mod index;
mod manifest;
pub mod paths;
mod propagate;
mod scanner;
mod session;
mod subpath;
mod table;
mod watch;
#[cfg(feature = "notify")]
mod watcher;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::LinkError;
pub use session::{ConfigSource, LinkSession, Resolution, SessionOptions};

// Host integration seam
pub use host::{ArtifactId, ChangeKind, FileChange, InvalidationBatch, ModuleGraph, RunMode};

// Building blocks for advanced use
pub use activation::{Activation, ENV_TOGGLE, env_toggle_enabled};
pub use entry::{CONVENTIONAL_ENTRIES, locate_entry};
pub use index::DependencyIndex;
pub use manifest::{MANIFEST_FILE, PackageManifest};
pub use propagate::{ChangePropagator, Propagation, PropagationState};
pub use scanner::{ScanResults, scan_packages};
pub use subpath::{ImportTarget, SOURCE_EXTENSIONS, locate_subpath, split_identifier};
pub use table::{EffectiveLinkTable, LinkEntry, resolve_package_paths};
pub use watch::{WatchEntry, WatchSet};

#[cfg(feature = "notify")]
pub use watcher::LinkWatcher;
