//! Tests for change propagation through a live session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use omni_devlink::{
    ArtifactId, ChangeKind, FileChange, InvalidationBatch, LinkSession, ModuleGraph, Propagation,
    SessionOptions,
};

/// Module graph double that records every invalidation request.
#[derive(Default)]
struct RecordingGraph {
    loaded: HashMap<String, ArtifactId>,
    importers: HashMap<PathBuf, Vec<ArtifactId>>,
    batches: Vec<InvalidationBatch>,
}

impl RecordingGraph {
    fn load(&mut self, identifier: &str) {
        self.loaded
            .insert(identifier.to_string(), ArtifactId::from(identifier));
    }
}

impl ModuleGraph for RecordingGraph {
    fn artifact_for_identifier(&self, identifier: &str) -> Option<ArtifactId> {
        self.loaded.get(identifier).cloned()
    }

    fn artifacts_for_file(&self, file: &Path) -> Vec<ArtifactId> {
        self.importers.get(file).cloned().unwrap_or_default()
    }

    fn invalidate(&mut self, batch: &InvalidationBatch) {
        self.batches.push(batch.clone());
    }
}

fn linked_session(exclude: &str) -> (TempDir, PathBuf, LinkSession) {
    let temp = TempDir::new().unwrap();
    let ui = temp.path().join("ui");
    std::fs::create_dir_all(&ui).unwrap();
    std::fs::write(ui.join("index.ts"), "export * from './button'").unwrap();
    std::fs::write(ui.join("button.ts"), "").unwrap();
    std::fs::write(ui.join("helpers.ts"), "").unwrap();
    std::fs::write(
        temp.path().join("dev-link.json"),
        format!(
            r#"{{ "links": [{{ "package": "@acme/ui", "localPath": "ui", "exclude": ["{exclude}"] }}] }}"#
        ),
    )
    .unwrap();

    let session = LinkSession::start(SessionOptions::new(temp.path()).with_env_toggle(true));
    assert!(session.is_active());
    (temp, ui, session)
}

#[test]
fn test_change_to_resolved_file_invalidates_once() {
    let (_temp, ui, mut session) = linked_session("**/*.test.ts");
    session.resolve_id("@acme/ui", None);
    session.resolve_id("@acme/ui/index", None);

    let mut graph = RecordingGraph::default();
    graph.load("@acme/ui");
    graph.load("@acme/ui/index");

    let outcome = session.handle_change(&FileChange::modified(ui.join("index.ts")), &mut graph);

    assert_eq!(graph.batches.len(), 1);
    assert_eq!(outcome.artifacts().len(), 2);
    assert_eq!(graph.batches[0].cause.path, ui.join("index.ts"));
}

#[test]
fn test_unloaded_artifact_is_skipped() {
    let (_temp, ui, mut session) = linked_session("**/*.test.ts");
    session.resolve_id("@acme/ui/button", None);

    let mut graph = RecordingGraph::default();
    let outcome = session.handle_change(&FileChange::modified(ui.join("button.ts")), &mut graph);

    assert_eq!(outcome, Propagation::Deferred);
    assert!(graph.batches.is_empty());
}

#[test]
fn test_never_resolved_file_is_not_invalidated() {
    let (_temp, ui, mut session) = linked_session("**/*.test.ts");
    let mut graph = RecordingGraph::default();
    graph.load("@acme/ui");

    let outcome = session.handle_change(&FileChange::modified(ui.join("button.ts")), &mut graph);

    assert_eq!(outcome, Propagation::Deferred);
    assert!(graph.batches.is_empty());
}

#[test]
fn test_peer_file_uses_host_graph() {
    let (_temp, ui, mut session) = linked_session("**/*.test.ts");
    let mut graph = RecordingGraph::default();
    graph.importers.insert(
        ui.join("helpers.ts"),
        vec![ArtifactId::from("helpers"), ArtifactId::from("@acme/ui")],
    );

    let outcome = session.handle_change(
        &FileChange::new(ChangeKind::Removed, ui.join("helpers.ts")),
        &mut graph,
    );

    assert_eq!(outcome.artifacts().len(), 2);
    assert_eq!(graph.batches[0].cause.kind, ChangeKind::Removed);
}

#[test]
fn test_excluded_file_is_ignored() {
    let (_temp, ui, mut session) = linked_session("**/*.test.ts");
    let test_file = ui.join("button.test.ts");
    std::fs::write(&test_file, "").unwrap();
    session.resolve_id("@acme/ui/button.test.ts", None);

    let mut graph = RecordingGraph::default();
    graph.load("@acme/ui/button.test.ts");

    let outcome = session.handle_change(&FileChange::modified(&test_file), &mut graph);
    assert_eq!(outcome, Propagation::Ignored);
    assert!(graph.batches.is_empty());

    let log = session.handle_change(&FileChange::modified(ui.join("dev.log")), &mut graph);
    assert_eq!(log, Propagation::Ignored);
}

#[test]
fn test_inactive_session_defers_changes() {
    let temp = TempDir::new().unwrap();
    let mut session = LinkSession::start(SessionOptions::new(temp.path()).with_env_toggle(true));
    assert!(!session.is_active());

    let mut graph = RecordingGraph::default();
    graph.importers.insert(temp.path().join("a.ts"), vec![ArtifactId::from("a")]);
    let outcome = session.handle_change(&FileChange::modified(temp.path().join("a.ts")), &mut graph);

    assert_eq!(outcome, Propagation::Deferred);
    assert!(graph.batches.is_empty());
}
