//! Link session: owns every piece of mutable state for one dev session.
//!
//! ```text
//! LinkSession::start ──→ load config ──→ LinkSpecification
//!                                             ↓
//! resolve_id(id) ──→ scan + EffectiveLinkTable ──→ entry / subpath ──→ DependencyIndex
//!                                             ↓
//! handle_change(event) ──→ ChangePropagator ──→ ModuleGraph::invalidate
//! ```
//!
//! Nothing here is fatal to the host: every failure degrades to
//! [`Resolution::Deferred`] or [`Propagation::Deferred`].

use std::path::{Path, PathBuf};
#[cfg(feature = "notify")]
use std::time::Duration;

use crate::activation::{Activation, env_toggle_enabled};
use crate::config::{DEFAULT_CONFIG_FILE, LinkConfigInput, LinkSpecification, load_link_config};
use crate::entry::locate_entry;
use crate::error::LinkError;
use crate::host::{FileChange, ModuleGraph, RunMode};
use crate::index::DependencyIndex;
use crate::paths::{normalize, resolve_path};
use crate::propagate::{ChangePropagator, Propagation};
use crate::scanner::{ScanResults, scan_packages};
use crate::subpath::{ImportTarget, locate_subpath, split_identifier};
use crate::table::EffectiveLinkTable;
use crate::watch::WatchSet;
#[cfg(feature = "notify")]
use crate::watcher::LinkWatcher;

/// Where the link configuration comes from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Config file, absolute or relative to the project root.
    File(PathBuf),
    /// Configuration supplied directly by the host.
    Inline(LinkConfigInput),
}

/// Options for starting a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Project root; anchors the config file and inline forms.
    pub root: PathBuf,
    /// Configuration source.
    pub config: ConfigSource,
    /// Host run mode.
    pub mode: RunMode,
    /// Hard on/off switch.
    pub enabled: bool,
    /// `DEV_LINK` toggle state.
    pub env_toggle: bool,
    /// Log every observed file change at info level.
    pub verbose: bool,
}

impl SessionOptions {
    /// Defaults: `dev-link.json` under `root`, serve mode, toggle read from
    /// the environment.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: ConfigSource::File(PathBuf::from(DEFAULT_CONFIG_FILE)),
            mode: RunMode::Serve,
            enabled: true,
            env_toggle: env_toggle_enabled(),
            verbose: false,
        }
    }

    /// Use a specific config file.
    #[must_use]
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = ConfigSource::File(path.into());
        self
    }

    /// Use an inline configuration form.
    #[must_use]
    pub fn with_input(mut self, input: LinkConfigInput) -> Self {
        self.config = ConfigSource::Inline(input);
        self
    }

    /// Override the run mode.
    #[must_use]
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the environment toggle.
    #[must_use]
    pub fn with_env_toggle(mut self, on: bool) -> Self {
        self.env_toggle = on;
        self
    }

    /// Set verbose change logging.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the hard on/off switch.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Answer to an import-resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Serve this local file.
    Resolved(PathBuf),
    /// Let the host resolve normally (installed copy).
    Deferred,
}

impl Resolution {
    /// Resolved file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Resolved(path) => Some(path.as_path()),
            Self::Deferred => None,
        }
    }
}

/// One development session.
pub struct LinkSession {
    spec: Option<LinkSpecification>,
    index: DependencyIndex,
    watches: WatchSet,
    propagator: ChangePropagator,
    verbose: bool,
    #[cfg(feature = "notify")]
    watcher: Option<LinkWatcher>,
}

impl LinkSession {
    /// Start a session. Never fails: configuration problems are logged and
    /// leave the session inactive.
    #[must_use]
    pub fn start(options: SessionOptions) -> Self {
        let SessionOptions {
            root,
            config,
            mode,
            enabled,
            env_toggle,
            verbose,
        } = options;

        let simplified = matches!(&config, ConfigSource::Inline(input) if input.is_simplified());
        let activation = Activation {
            mode,
            enabled,
            env_toggle,
            simplified,
        };

        let mut session = Self::inactive(verbose);
        if !activation.is_active() {
            activation.explain();
            return session;
        }

        let root = match std::path::absolute(&root) {
            Ok(root) => normalize(&root),
            Err(error) => {
                tracing::error!(
                    root = %root.display(),
                    error = %error,
                    "cannot resolve project root; dev-link stays idle"
                );
                return session;
            }
        };

        let Some(spec) = load_specification(&root, config) else {
            return session;
        };
        if spec.is_empty() {
            tracing::info!("link configuration has no links; dev-link stays idle");
            return session;
        }

        let table = build_table(&spec);
        session.watches = WatchSet::from_table(&table, &spec.defaults.exclude);
        for link in table.entries() {
            tracing::info!(
                package = %link.package,
                dir = %link.directory.display(),
                "linked local package"
            );
        }
        tracing::info!(
            mappings = spec.mappings.len(),
            packages = table.len(),
            watches = session.watches.len(),
            "dev-link active"
        );
        session.spec = Some(spec);
        session
    }

    fn inactive(verbose: bool) -> Self {
        Self {
            spec: None,
            index: DependencyIndex::new(),
            watches: WatchSet::default(),
            propagator: ChangePropagator::new(),
            verbose,
            #[cfg(feature = "notify")]
            watcher: None,
        }
    }

    /// Whether resolution and propagation run.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.spec.is_some()
    }

    /// Active specification.
    #[must_use]
    pub fn specification(&self) -> Option<&LinkSpecification> {
        self.spec.as_ref()
    }

    /// Current link table, re-scanned from disk.
    #[must_use]
    pub fn link_table(&self) -> EffectiveLinkTable {
        self.spec.as_ref().map(build_table).unwrap_or_default()
    }

    /// Dependency index built so far.
    #[must_use]
    pub fn index(&self) -> &DependencyIndex {
        &self.index
    }

    /// Watched directories.
    #[must_use]
    pub fn watches(&self) -> &WatchSet {
        &self.watches
    }

    /// Import-resolution hook.
    ///
    /// The link table is rebuilt on every call so packages added to a scanned
    /// root are picked up without a restart.
    pub fn resolve_id(&mut self, identifier: &str, importer: Option<&str>) -> Resolution {
        let Some(spec) = self.spec.as_ref() else {
            return Resolution::Deferred;
        };

        let table = build_table(spec);
        let session_entry = spec.defaults.entry.clone();
        let added = self.watches.extend_from(&table, &spec.defaults.exclude);
        self.watch_directories(&added);

        for link in table.entries() {
            let Some(target) = split_identifier(identifier, &link.package) else {
                continue;
            };
            if !link.directory.is_dir() {
                let error = LinkError::DirectoryNotFound {
                    package: link.package.clone(),
                    directory: link.directory.clone(),
                };
                tracing::warn!(identifier, error = %error, "cannot resolve linked import");
                continue;
            }

            let located = match target {
                ImportTarget::Bare => locate_entry(
                    &link.directory,
                    link.entry.as_deref(),
                    session_entry.as_deref(),
                ),
                ImportTarget::Subpath(subpath) => locate_subpath(&link.directory, subpath),
            };

            match located {
                Ok(file) => {
                    self.index.record(&file, identifier);
                    tracing::debug!(
                        identifier,
                        importer = importer.unwrap_or("-"),
                        file = %file.display(),
                        "resolved linked import"
                    );
                    return Resolution::Resolved(file);
                }
                Err(error) => {
                    tracing::warn!(
                        identifier,
                        importer = importer.unwrap_or("-"),
                        error = %error,
                        "cannot resolve linked import"
                    );
                }
            }
        }

        Resolution::Deferred
    }

    /// Change-notification hook.
    pub fn handle_change<G>(&mut self, change: &FileChange, graph: &mut G) -> Propagation
    where
        G: ModuleGraph + ?Sized,
    {
        if self.spec.is_none() {
            return Propagation::Deferred;
        }
        if self.verbose {
            tracing::info!(kind = ?change.kind, path = %change.path.display(), "file change");
        }
        self.propagator
            .propagate(change, &self.watches, &self.index, graph)
    }

    /// Acquire OS watches for every watched directory.
    ///
    /// Returns the number of directories now watched. Directories that cannot
    /// be watched are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Watch`] if the watcher backend cannot start.
    #[cfg(feature = "notify")]
    pub fn attach_watchers(&mut self) -> Result<usize, LinkError> {
        if self.spec.is_none() {
            return Ok(0);
        }
        self.watcher = Some(LinkWatcher::new()?);
        let directories: Vec<PathBuf> = self.watches.directories().map(Path::to_path_buf).collect();
        self.watch_directories(&directories);
        Ok(self.watcher.as_ref().map_or(0, |w| w.watched().len()))
    }

    /// Wait up to `timeout` for file changes from the OS watches.
    #[cfg(feature = "notify")]
    #[must_use]
    pub fn pending_changes(&self, timeout: Duration) -> Vec<FileChange> {
        self.watcher
            .as_ref()
            .map(|watcher| watcher.wait(timeout))
            .unwrap_or_default()
    }

    #[cfg(feature = "notify")]
    fn watch_directories(&mut self, directories: &[PathBuf]) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };
        for directory in directories {
            if let Err(error) = watcher.watch(directory) {
                tracing::warn!(error = %error, "skipping watch");
            }
        }
    }

    #[cfg(not(feature = "notify"))]
    fn watch_directories(&mut self, _directories: &[PathBuf]) {}

    /// End the session: release watches and clear the index.
    pub fn close(&mut self) {
        #[cfg(feature = "notify")]
        if let Some(mut watcher) = self.watcher.take() {
            watcher.close();
        }
        self.index.clear();
        self.watches = WatchSet::default();
        self.spec = None;
    }
}

impl Drop for LinkSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn load_specification(root: &Path, config: ConfigSource) -> Option<LinkSpecification> {
    match config {
        ConfigSource::Inline(input) => Some(input.normalize(root)),
        ConfigSource::File(path) => {
            let path = resolve_path(path, root);
            match load_link_config(&path) {
                Ok(file) => {
                    tracing::info!(path = %path.display(), "loaded link configuration");
                    let base = path.parent().unwrap_or(root);
                    Some(LinkConfigInput::Full(file).normalize(base))
                }
                Err(LinkError::ConfigurationMissing(path)) => {
                    tracing::info!(
                        path = %path.display(),
                        "no link configuration found; dev-link stays idle"
                    );
                    None
                }
                Err(error) => {
                    tracing::error!(error = %error, "failed to load link configuration");
                    None
                }
            }
        }
    }
}

fn scan(spec: &LinkSpecification) -> ScanResults {
    spec.scan_root()
        .map(|root| scan_packages(root))
        .unwrap_or_default()
}

fn build_table(spec: &LinkSpecification) -> EffectiveLinkTable {
    EffectiveLinkTable::build(spec, &scan(spec))
}
