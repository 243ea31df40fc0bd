//! Contract: one file or one target failing never stops the others.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use targetsync::domain::entities::{Target, Workspace};
use targetsync::domain::ports::OperationEvent;
use targetsync::infrastructure::LocalFs;
use targetsync::presentation::{create_session_with, SessionOptions};
use targetsync::{FileFilter, Session, SyncError};

use crate::common::{EchoRunner, RecordingEvents};

fn session(root: &Path, targets: Vec<Target>, events: RecordingEvents) -> Session {
    let mut workspace = Workspace::new("site", root);
    for target in targets {
        workspace.add_target(target);
    }
    create_session_with(
        vec![workspace],
        &SessionOptions::default(),
        Arc::new(LocalFs::new()),
        Arc::new(EchoRunner::default()),
        Arc::new(events),
    )
}

fn txt_mirror(name: &str, dir: &str) -> Target {
    Target::new(name, "local")
        .with_dir(dir)
        .with_filter(FileFilter::new(["**/*.txt"], ["out/**"]))
}

/// CONTRACT: a missing file fails alone; the rest of the batch completes.
#[test]
fn contract_file_failure_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.txt"), "a").unwrap();
    fs::write(root.join("c.txt"), "c").unwrap();

    let events = RecordingEvents::default();
    let session = session(root, vec![txt_mirror("mirror", "out")], events.clone());
    let target = session.target("mirror").unwrap();

    let files = vec![root.join("a.txt"), root.join("b.txt"), root.join("c.txt")];
    let summary = session.deploy(target, &files).unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.is_success());
    assert!(summary.errors[0].0.ends_with("b.txt"));
    assert_eq!(fs::read_to_string(root.join("out/c.txt")).unwrap(), "c");

    let failed: Vec<_> = events
        .snapshot()
        .into_iter()
        .filter(|e| matches!(e, OperationEvent::FileFailed { .. }))
        .collect();
    assert_eq!(failed.len(), 1);
}

/// CONTRACT: an unusable target fails alone; other targets still deploy.
#[test]
fn contract_target_failure_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.txt"), "a").unwrap();

    let session = session(
        root,
        vec![
            Target::new("remote", "ftp"),
            txt_mirror("mirror", "out"),
        ],
        RecordingEvents::default(),
    );

    let outcomes = session.deploy_file(&root.join("a.txt"));
    assert_eq!(outcomes.len(), 2);
    assert!(matches!(
        outcomes[0].result,
        Err(SyncError::UnsupportedTargetType { ref kind, .. }) if kind == "ftp"
    ));
    assert!(outcomes[1].is_success());
    assert!(root.join("out/a.txt").exists());
}

/// CONTRACT: once cancelled, no further file starts.
#[test]
fn contract_cancellation_stops_before_next_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.txt"), "a").unwrap();
    fs::write(root.join("b.txt"), "b").unwrap();

    let session = session(root, vec![txt_mirror("mirror", "out")], RecordingEvents::default());
    session.cancellation().cancel();
    let target = session.target("mirror").unwrap();

    let summary = session
        .deploy(target, &[root.join("a.txt"), root.join("b.txt")])
        .unwrap();
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.skipped, 2);
    assert!(!root.join("out").exists());
}

/// CONTRACT: a plan deploys every matching target once per file.
#[test]
fn contract_plan_groups_by_target() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.txt"), "a").unwrap();
    fs::write(root.join("b.md"), "b").unwrap();

    let session = session(
        root,
        vec![txt_mirror("first", "out/1"), txt_mirror("second", "out/2")],
        RecordingEvents::default(),
    );
    let files = vec![root.join("a.txt"), root.join("a.txt"), root.join("b.md")];
    let plan = session.plan(&files);

    assert_eq!(plan.batches.len(), 2);
    assert!(plan.batches.iter().all(|(_, files)| files.len() == 1));
    assert_eq!(plan.unmatched, vec![root.join("b.md")]);

    let outcomes = session.deploy_plan(&plan);
    assert!(outcomes.iter().all(|o| o.is_success()));
    assert!(root.join("out/1/a.txt").exists());
    assert!(root.join("out/2/a.txt").exists());
}
