//! Contract: include/exclude filters and target resolution.

use std::fs;

use targetsync::domain::entities::{Target, Workspace};
use targetsync::presentation::{create_session, SessionOptions};
use targetsync::FileFilter;

fn linux() -> SessionOptions {
    SessionOptions {
        platform: Some("linux".into()),
        ..Default::default()
    }
}

fn names(targets: Option<Vec<&Target>>) -> Vec<String> {
    targets
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.name.clone())
        .collect()
}

/// CONTRACT: a path matching an exclude pattern never matches.
#[test]
fn contract_exclude_always_wins() {
    let filter = FileFilter::new(["**/*.js", "/src/vendor/lib.js"], ["**/vendor/**"]);
    assert!(filter.matches("/src/app.js"));
    assert!(!filter.matches("/src/vendor/lib.js"));
}

/// CONTRACT: blank include patterns behave like no patterns: everything matches.
#[test]
fn contract_blank_include_matches_everything() {
    let filter = FileFilter::new(["", "   "], Vec::<String>::new());
    assert!(filter.matches("/a/.env"));
    assert!(filter.matches("deeply/nested/file"));
}

/// CONTRACT: separators and case do not change the outcome.
#[test]
fn contract_paths_are_canonical() {
    let filter = FileFilter::new(["src/*.js"], Vec::<String>::new());
    assert!(filter.matches("src\\App.JS"));
    assert!(filter.matches("/src/app.js"));
    assert!(!filter.matches("/src/nested/app.js"));
}

/// CONTRACT: platform restrictions apply in full mode and are skipped in fast mode.
#[test]
fn contract_platforms_only_checked_in_full_mode() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("site");
    fs::create_dir_all(&root).unwrap();
    let file = root.join("a.txt");
    fs::write(&file, "a").unwrap();

    let workspace = Workspace::new("site", &root)
        .with_target(Target::new("all", "local").with_filter(FileFilter::new(["**/*.txt"], Vec::<String>::new())))
        .with_target(Target::new("win", "local").with_platforms(["win32"]));
    let session = create_session(vec![workspace], &linux());

    assert_eq!(names(session.targets_for_file(&file, false)), ["all"]);
    assert_eq!(names(session.targets_for_file(&file, true)), ["all", "win"]);
}

/// CONTRACT: `if` conditions gate a target; a broken condition excludes it.
#[test]
fn contract_conditions_gate_targets() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let file = root.join("page.html");

    let workspace = Workspace::new("site", &root)
        .with_target(Target::new("linux-only", "local").with_conditions(["platform == 'linux'"]))
        .with_target(Target::new("never", "local").with_conditions(["platform == 'macos'"]))
        .with_target(Target::new("broken", "local").with_conditions(["platform =="]));
    let session = create_session(vec![workspace], &linux());

    assert_eq!(names(session.targets_for_file(&file, false)), ["linux-only"]);
}

/// CONTRACT: files outside every workspace resolve to nothing.
#[test]
fn contract_outside_file_resolves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("site");
    let workspace = Workspace::new("site", &root).with_target(Target::new("all", "local"));
    let session = create_session(vec![workspace], &linux());

    assert!(session.targets_for_file(&dir.path().join("other/a.txt"), true).is_none());
}

/// CONTRACT: the most specific workspace owns a nested file.
#[test]
fn contract_longest_workspace_root_wins() {
    let dir = tempfile::tempdir().unwrap();
    let outer = Workspace::new("outer", dir.path()).with_target(Target::new("outer-target", "local"));
    let inner = Workspace::new("inner", dir.path().join("pkg"))
        .with_target(Target::new("inner-target", "local"));
    let session = create_session(vec![outer, inner], &linux());

    let file = dir.path().join("pkg/src/a.txt");
    assert_eq!(session.workspace_for(&file).unwrap().name, "inner");
    assert_eq!(names(session.targets_for_file(&file, true)), ["inner-target"]);
}
