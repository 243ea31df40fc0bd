//! Contract: compiler targets write `<dir>/<stem>.<extension>` and fail
//! the batch on any compile error while every file still completes.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use targetsync::domain::entities::{CompilerSettings, Target, Workspace};
use targetsync::infrastructure::LocalFs;
use targetsync::presentation::{create_session_with, SessionOptions};
use targetsync::{Session, SyncError};

use crate::common::{EchoRunner, RecordingEvents};

fn compiler_target(name: &str, compiler: &str, extension: Option<&str>) -> Target {
    Target::new(name, "compiler")
        .with_dir("dist")
        .with_compiler(CompilerSettings {
            compiler: compiler.to_string(),
            extension: extension.map(str::to_string),
            ..Default::default()
        })
}

fn session(root: &Path, target: Target, runner: Arc<EchoRunner>) -> Session {
    create_session_with(
        vec![Workspace::new("site", root).with_target(target)],
        &SessionOptions::default(),
        Arc::new(LocalFs::new()),
        runner,
        Arc::new(RecordingEvents::default()),
    )
}

/// CONTRACT: each compiler has its default output extension.
#[test]
fn contract_default_extensions() {
    for (compiler, source, expected, program) in [
        ("less", "foo.less", "foo.css", "lessc"),
        ("coffee", "foo.coffee", "foo.js", "coffee"),
        ("pug", "foo.pug", "foo.html", "pug"),
    ] {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(source), "body").unwrap();

        let runner = Arc::new(EchoRunner::default());
        let session = session(root, compiler_target("build", compiler, None), runner.clone());
        let target = session.target("build").unwrap();
        let summary = session.deploy(target, &[root.join(source)]).unwrap();

        assert_eq!(summary.succeeded, 1, "{compiler}");
        assert_eq!(
            fs::read_to_string(root.join("dist").join(expected)).unwrap(),
            "body",
            "{compiler}"
        );
        assert_eq!(runner.programs(), [program]);
    }
}

/// CONTRACT: a configured extension replaces the default one.
#[test]
fn contract_extension_override() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("site.less"), "a {}").unwrap();

    let session = session(
        root,
        compiler_target("styles", "less", Some(".min.css")),
        Arc::new(EchoRunner::default()),
    );
    let target = session.target("styles").unwrap();
    session.deploy(target, &[root.join("site.less")]).unwrap();

    assert!(root.join("dist/site.min.css").exists());
    assert!(!root.join("dist/site.css").exists());
}

/// CONTRACT: a compile error completes every file and still fails the batch.
#[test]
fn contract_compile_error_is_aggregated() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("good.coffee"), "x = 1").unwrap();
    fs::write(root.join("bad.coffee"), "!broken").unwrap();

    let session = session(
        root,
        compiler_target("scripts", "coffee", None),
        Arc::new(EchoRunner::default()),
    );
    let target = session.target("scripts").unwrap();
    let err = session
        .deploy(target, &[root.join("bad.coffee"), root.join("good.coffee")])
        .unwrap_err();

    match err {
        SyncError::Aggregate { file, message, .. } => {
            assert!(file.ends_with("bad.coffee"));
            assert!(message.contains("bad input"));
        }
        other => panic!("expected aggregate error, got {other:?}"),
    }
    assert!(root.join("dist/good.js").exists());
}

/// CONTRACT: a recognized compiler without a backend is reported, not run.
#[test]
fn contract_typescript_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("app.ts"), "let x = 1").unwrap();

    let runner = Arc::new(EchoRunner::default());
    let session = session(root, compiler_target("ts", "typescript", None), runner.clone());
    let target = session.target("ts").unwrap();
    let err = session.deploy(target, &[root.join("app.ts")]).unwrap_err();

    assert!(matches!(err, SyncError::UnsupportedCompiler { .. }));
    assert!(runner.programs().is_empty());
}
