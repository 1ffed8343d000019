//! Change propagation: file event → one batched invalidation.
//!
//! # Flow
//!
//! ```text
//! FileChange(path)
//!      ↓
//! owning watch excludes path? ── yes ──→ Ignored
//!      ↓ no
//! DependencyIndex.lookup_by_file(path)
//!      ↓ identifiers → ModuleGraph::artifact_for_identifier
//!      ↓ none       → ModuleGraph::artifacts_for_file (linked files only)
//!      ↓
//! nothing marked ──→ Deferred (host default handling)
//!      ↓
//! ModuleGraph::invalidate(batch) ──→ Invalidated(batch)
//! ```
//!
//! Each watched directory moves Idle → Resolving → Invalidating → Idle for
//! every event it owns. Events are processed to completion one at a time.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::host::{ArtifactId, FileChange, InvalidationBatch, ModuleGraph};
use crate::index::DependencyIndex;
use crate::watch::{WatchEntry, WatchSet};

/// Per-directory propagation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropagationState {
    /// Waiting for events.
    #[default]
    Idle,
    /// Looking up which artifacts the changed file backs.
    Resolving,
    /// Delivering the invalidation batch.
    Invalidating,
}

/// Outcome of one change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Propagation {
    /// The file matched an exclusion pattern.
    Ignored,
    /// Nothing to invalidate; the host's default change handling applies.
    Deferred,
    /// The host was asked to invalidate exactly this batch.
    Invalidated(InvalidationBatch),
}

impl Propagation {
    /// Artifacts invalidated, empty unless [`Propagation::Invalidated`].
    #[must_use]
    pub fn artifacts(&self) -> &[ArtifactId] {
        match self {
            Self::Invalidated(batch) => &batch.artifacts,
            Self::Ignored | Self::Deferred => &[],
        }
    }
}

/// Computes which live artifacts a file change invalidates.
#[derive(Debug, Default)]
pub struct ChangePropagator {
    states: HashMap<PathBuf, PropagationState>,
}

impl ChangePropagator {
    /// Create a propagator with every directory idle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a watched directory.
    #[must_use]
    pub fn state_of(&self, directory: &Path) -> PropagationState {
        self.states.get(directory).copied().unwrap_or_default()
    }

    /// Process one change notification to completion.
    pub fn propagate<G>(
        &mut self,
        change: &FileChange,
        watches: &WatchSet,
        index: &DependencyIndex,
        graph: &mut G,
    ) -> Propagation
    where
        G: ModuleGraph + ?Sized,
    {
        let owner = watches.owner_of(&change.path);

        if let Some(owner) = owner
            && owner.is_excluded(&change.path)
        {
            tracing::trace!(path = %change.path.display(), "change excluded");
            return Propagation::Ignored;
        }

        let directory = owner.map(|o| o.directory().to_path_buf());
        self.transition(directory.as_deref(), PropagationState::Resolving);

        let marked = collect_artifacts(change, owner, index, graph);

        let outcome = if marked.is_empty() {
            tracing::debug!(
                path = %change.path.display(),
                "no live artifacts for change; deferring to host"
            );
            Propagation::Deferred
        } else {
            self.transition(directory.as_deref(), PropagationState::Invalidating);
            let batch = InvalidationBatch {
                cause: change.clone(),
                artifacts: marked.into_iter().collect(),
            };
            tracing::info!(
                path = %change.path.display(),
                kind = ?change.kind,
                artifacts = batch.artifacts.len(),
                "invalidating linked modules"
            );
            graph.invalidate(&batch);
            Propagation::Invalidated(batch)
        };

        self.transition(directory.as_deref(), PropagationState::Idle);
        outcome
    }

    fn transition(&mut self, directory: Option<&Path>, next: PropagationState) {
        let Some(directory) = directory else {
            return;
        };
        let state = self.states.entry(directory.to_path_buf()).or_default();
        let previous = *state;
        *state = next;
        tracing::trace!(dir = %directory.display(), from = ?previous, to = ?next, "propagation state");
    }
}

/// Artifacts to invalidate for `change`, de-duplicated.
fn collect_artifacts<G>(
    change: &FileChange,
    owner: Option<&WatchEntry>,
    index: &DependencyIndex,
    graph: &G,
) -> BTreeSet<ArtifactId>
where
    G: ModuleGraph + ?Sized,
{
    let mut identifiers = index.lookup_by_file(&change.path);
    if identifiers.is_empty()
        && let Some(configured) = owner.and_then(|o| o.configured_path(&change.path))
    {
        identifiers = index.lookup_by_file(&configured);
    }

    if !identifiers.is_empty() {
        return identifiers
            .iter()
            .filter_map(|identifier| graph.artifact_for_identifier(identifier))
            .collect();
    }

    if owner.is_some() {
        return graph.artifacts_for_file(&change.path).into_iter().collect();
    }

    BTreeSet::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LinkMapping, LinkSpecification, SessionDefaults};
    use crate::host::ChangeKind;
    use crate::scanner::ScanResults;
    use crate::table::EffectiveLinkTable;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeGraph {
        by_identifier: HashMap<String, ArtifactId>,
        by_file: HashMap<PathBuf, Vec<ArtifactId>>,
        batches: Vec<InvalidationBatch>,
    }

    impl ModuleGraph for FakeGraph {
        fn artifact_for_identifier(&self, identifier: &str) -> Option<ArtifactId> {
            self.by_identifier.get(identifier).cloned()
        }

        fn artifacts_for_file(&self, file: &Path) -> Vec<ArtifactId> {
            self.by_file.get(file).cloned().unwrap_or_default()
        }

        fn invalidate(&mut self, batch: &InvalidationBatch) {
            self.batches.push(batch.clone());
        }
    }

    fn watches_for(dir: &Path, exclude: &[&str]) -> WatchSet {
        let mut mapping = LinkMapping::new("ui").with_local_path(dir);
        for pattern in exclude {
            mapping = mapping.excluding(*pattern);
        }
        let spec = LinkSpecification {
            mappings: vec![mapping],
            defaults: SessionDefaults::default(),
        };
        WatchSet::from_table(&EffectiveLinkTable::build(&spec, &ScanResults::new()), &[])
    }

    #[test]
    fn indexed_file_invalidates_in_one_batch() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        let file = dir.join("index.ts");
        let watches = watches_for(dir, &[]);

        let mut index = DependencyIndex::new();
        index.record(&file, "ui");
        index.record(&file, "ui/index");
        index.record(&file, "ui/unloaded");

        let mut graph = FakeGraph::default();
        graph.by_identifier.insert("ui".into(), ArtifactId::from("/ui/index.ts"));
        graph.by_identifier.insert("ui/index".into(), ArtifactId::from("/ui/index.ts"));

        let mut propagator = ChangePropagator::new();
        let outcome = propagator.propagate(&FileChange::modified(&file), &watches, &index, &mut graph);

        assert_eq!(outcome.artifacts(), [ArtifactId::from("/ui/index.ts")]);
        assert_eq!(graph.batches.len(), 1);
        assert_eq!(propagator.state_of(dir), PropagationState::Idle);
    }

    #[test]
    fn unindexed_linked_file_falls_back_to_host_graph() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        let helper = dir.join("helpers.js");
        let watches = watches_for(dir, &[]);

        let mut graph = FakeGraph::default();
        graph.by_file.insert(
            helper.clone(),
            vec![ArtifactId::from("helpers"), ArtifactId::from("index")],
        );

        let outcome = ChangePropagator::new().propagate(
            &FileChange::new(ChangeKind::Removed, &helper),
            &watches,
            &DependencyIndex::new(),
            &mut graph,
        );

        assert_eq!(outcome.artifacts().len(), 2);
        assert_eq!(graph.batches[0].cause.kind, ChangeKind::Removed);
    }

    #[test]
    fn unknown_file_defers_without_invalidating() {
        let temp = TempDir::new().unwrap();
        let watches = watches_for(temp.path(), &[]);
        let mut graph = FakeGraph::default();

        let outcome = ChangePropagator::new().propagate(
            &FileChange::modified(temp.path().join("never-resolved.ts")),
            &watches,
            &DependencyIndex::new(),
            &mut graph,
        );

        assert_eq!(outcome, Propagation::Deferred);
        assert!(graph.batches.is_empty());
    }

    #[test]
    fn file_outside_watches_skips_host_graph() {
        let temp = TempDir::new().unwrap();
        let watches = watches_for(&temp.path().join("pkg"), &[]);
        let outside = PathBuf::from("/app/src/main.ts");

        let mut graph = FakeGraph::default();
        graph.by_file.insert(outside.clone(), vec![ArtifactId::from("main")]);

        let outcome = ChangePropagator::new().propagate(
            &FileChange::modified(&outside),
            &watches,
            &DependencyIndex::new(),
            &mut graph,
        );
        assert_eq!(outcome, Propagation::Deferred);
    }

    #[test]
    fn excluded_file_is_ignored() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        let test_file = dir.join("button.test.ts");
        let watches = watches_for(dir, &["**/*.test.ts"]);

        let mut index = DependencyIndex::new();
        index.record(&test_file, "ui/button.test");
        let mut graph = FakeGraph::default();
        graph.by_identifier.insert("ui/button.test".into(), ArtifactId::from("t"));

        let outcome = ChangePropagator::new().propagate(
            &FileChange::modified(&test_file),
            &watches,
            &index,
            &mut graph,
        );
        assert_eq!(outcome, Propagation::Ignored);
        assert!(graph.batches.is_empty());
    }

    #[test]
    fn duplicate_events_are_harmless() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("index.ts");
        let watches = watches_for(temp.path(), &[]);
        let mut index = DependencyIndex::new();
        index.record(&file, "ui");
        let mut graph = FakeGraph::default();
        graph.by_identifier.insert("ui".into(), ArtifactId::from("ui"));

        let mut propagator = ChangePropagator::new();
        let change = FileChange::modified(&file);
        let first = propagator.propagate(&change, &watches, &index, &mut graph);
        let second = propagator.propagate(&change, &watches, &index, &mut graph);

        assert_eq!(first, second);
        assert_eq!(graph.batches.len(), 2);
    }
}
