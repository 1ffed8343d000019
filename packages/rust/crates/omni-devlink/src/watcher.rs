//! OS-level watching of linked directories.
//!
//! Uses `notify` crate for cross-platform file system monitoring. The notify
//! callback runs on the backend's own thread and only forwards raw events
//! over a channel; the owning session drains them on its thread, so change
//! propagation stays single-threaded.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::LinkError;
use crate::host::{ChangeKind, FileChange};

/// Recursive watches over linked directories, released on drop.
pub struct LinkWatcher {
    watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    watched: Vec<PathBuf>,
}

impl LinkWatcher {
    /// Create a watcher with no directories attached.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Watch`] if the platform backend cannot start.
    pub fn new() -> Result<Self, LinkError> {
        let (tx, rx) = channel();
        let watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| {
                let _ = tx.send(result);
            },
            Config::default().with_poll_interval(Duration::from_millis(100)),
        )
        .map_err(|source| LinkError::Watch {
            path: PathBuf::new(),
            source,
        })?;

        Ok(Self {
            watcher,
            events: rx,
            watched: Vec::new(),
        })
    }

    /// Start watching `directory` recursively. Watching the same directory
    /// twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Watch`] if the directory cannot be watched.
    pub fn watch(&mut self, directory: &Path) -> Result<(), LinkError> {
        if self.watched.iter().any(|d| d == directory) {
            return Ok(());
        }
        self.watcher
            .watch(directory, RecursiveMode::Recursive)
            .map_err(|source| LinkError::Watch {
                path: directory.to_path_buf(),
                source,
            })?;
        self.watched.push(directory.to_path_buf());
        Ok(())
    }

    /// Directories currently watched.
    #[must_use]
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Changes already queued, without blocking.
    #[must_use]
    pub fn drain(&self) -> Vec<FileChange> {
        let mut changes = Vec::new();
        while let Ok(result) = self.events.try_recv() {
            push_changes(result, &mut changes);
        }
        changes
    }

    /// Wait up to `timeout` for the next event, then drain whatever else is
    /// queued.
    #[must_use]
    pub fn wait(&self, timeout: Duration) -> Vec<FileChange> {
        let mut changes = Vec::new();
        match self.events.recv_timeout(timeout) {
            Ok(result) => push_changes(result, &mut changes),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return changes,
        }
        changes.extend(self.drain());
        changes
    }

    /// Release every OS watch.
    pub fn close(&mut self) {
        for directory in self.watched.drain(..) {
            if let Err(error) = self.watcher.unwatch(&directory) {
                tracing::debug!(dir = %directory.display(), error = %error, "unwatch failed");
            }
        }
    }
}

impl Drop for LinkWatcher {
    fn drop(&mut self) {
        self.close();
    }
}

fn push_changes(result: notify::Result<Event>, out: &mut Vec<FileChange>) {
    match result {
        Ok(event) => {
            for path in event.paths {
                if let Some(kind) = change_kind(&event.kind, &path) {
                    out.push(FileChange::new(kind, path));
                }
            }
        }
        Err(error) => tracing::warn!(error = %error, "file watcher error"),
    }
}

/// Map a notify event onto a change kind. Directory events and access
/// events carry nothing to propagate.
fn change_kind(kind: &EventKind, path: &Path) -> Option<ChangeKind> {
    match kind {
        EventKind::Access(_) => None,
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        _ if path.is_dir() => None,
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) => Some(if path.exists() {
            ChangeKind::Created
        } else {
            ChangeKind::Removed
        }),
        _ => Some(ChangeKind::Modified),
    }
}
