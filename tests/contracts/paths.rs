//! Contract: nothing is read or written outside a target's directory.

use std::fs;
use std::path::Path;

use targetsync::domain::entities::{Target, Workspace};
use targetsync::domain::value_objects::resolve_within;
use targetsync::presentation::{create_session, SessionOptions};
use targetsync::SyncError;

/// CONTRACT: `..` segments cannot climb out of the root.
#[test]
fn contract_parent_segments_cannot_escape() {
    let root = Path::new("/srv/site");
    let err = resolve_within(root, "../../etc/passwd").unwrap_err();
    assert!(matches!(err, SyncError::PathEscape { .. }));

    assert_eq!(
        resolve_within(root, "/a/../b.txt").unwrap(),
        Path::new("/srv/site/b.txt")
    );
    assert_eq!(resolve_within(root, "").unwrap(), root);
}

/// CONTRACT: listing above a local target's directory is refused.
#[test]
fn contract_listing_stays_inside_target() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("site");
    fs::create_dir_all(root.join("out/docs")).unwrap();
    fs::write(root.join("out/docs/a.txt"), "a").unwrap();
    fs::write(dir.path().join("secret.txt"), "s").unwrap();

    let workspace = Workspace::new("site", &root).with_target(Target::new("mirror", "local").with_dir("out"));
    let session = create_session(vec![workspace], &SessionOptions::default());
    let target = session.target("mirror").unwrap();

    let listing = session.list(target, "/docs").unwrap();
    assert_eq!(listing.entries.len(), 1);
    assert_eq!(listing.entries[0].name, "a.txt");

    let err = session.list(target, "../..").unwrap_err();
    assert!(matches!(err, SyncError::PathEscape { .. }));
}

/// CONTRACT: a pull never writes outside the workspace.
#[test]
fn contract_pull_writes_inside_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("site");
    fs::create_dir_all(root.join("out/docs")).unwrap();
    fs::write(root.join("out/docs/a.txt"), "remote").unwrap();

    let workspace = Workspace::new("site", &root).with_target(Target::new("mirror", "local").with_dir("out"));
    let session = create_session(vec![workspace], &SessionOptions::default());
    let target = session.target("mirror").unwrap();

    let summary = session.pull(target, &[root.join("docs/a.txt")]).unwrap();
    assert_eq!(summary.succeeded, 1);
    assert_eq!(fs::read_to_string(root.join("docs/a.txt")).unwrap(), "remote");
}
