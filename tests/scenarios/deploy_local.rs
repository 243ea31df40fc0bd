//! Scenario: a project mirrors text files into `out/` through the CLI.

use crate::common::*;

#[test]
fn deploy_copies_matching_files() {
    let env = TestEnv::with_config(LOCAL_MIRROR_CONFIG);
    env.write_file("docs/a.txt", "hello");

    let result = env.run(&["deploy", "docs/a.txt"]);
    assert!(result.success, "deploy failed:\n{}", result.combined_output());
    assert_eq!(env.read_file("out/docs/a.txt"), "hello");
}

#[test]
fn targets_lists_resolved_targets_as_json() {
    let env = TestEnv::with_config(PLATFORM_CONFIG);
    env.write_file("a.txt", "a");

    let result = env.run(&["targets", "a.txt", "--json"]);
    assert!(result.success, "targets failed:\n{}", result.combined_output());

    let json: serde_json::Value = serde_json::from_str(&result.stdout).unwrap();
    let names: Vec<&str> = json["targets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["everywhere"]);

    let fast = env.run(&["targets", "a.txt", "--fast", "--json"]);
    assert!(fast.stdout.contains("windows-only"), "{}", fast.stdout);
}

#[test]
fn list_shows_deployed_files() {
    let env = TestEnv::with_config(LOCAL_MIRROR_CONFIG);
    env.write_file("docs/a.txt", "hello");
    assert!(env.run(&["deploy", "docs/a.txt"]).success);

    let result = env.run(&["list", "mirror", "/docs"]);
    assert!(result.success, "list failed:\n{}", result.combined_output());
    assert!(result.stdout.contains("a.txt"), "{}", result.stdout);
}

#[test]
fn delete_removes_deployed_file() {
    let env = TestEnv::with_config(LOCAL_MIRROR_CONFIG);
    env.write_file("a.txt", "hello");
    assert!(env.run(&["deploy", "a.txt"]).success);
    assert!(env.project_path("out/a.txt").exists());

    let result = env.run(&["delete", "a.txt"]);
    assert!(result.success, "delete failed:\n{}", result.combined_output());
    assert!(!env.project_path("out/a.txt").exists());
}

#[test]
fn pull_with_named_target_restores_file() {
    let env = TestEnv::with_config(LOCAL_MIRROR_CONFIG);
    env.write_file("out/a.txt", "from target");

    let result = env.run(&["pull", "a.txt", "--target", "mirror"]);
    assert!(result.success, "pull failed:\n{}", result.combined_output());
    assert_eq!(env.read_file("a.txt"), "from target");
}

#[test]
fn unknown_target_fails() {
    let env = TestEnv::with_config(LOCAL_MIRROR_CONFIG);
    env.write_file("a.txt", "hello");

    let result = env.run(&["deploy", "a.txt", "--target", "nope"]);
    assert!(!result.success);
    assert!(result.stderr.contains("unknown target 'nope'"), "{}", result.stderr);
}

#[test]
fn json_deploy_reports_outcome() {
    let env = TestEnv::with_config(LOCAL_MIRROR_CONFIG);
    env.write_file("a.txt", "hello");

    let result = env.run(&["deploy", "a.txt", "--json"]);
    assert!(result.success, "deploy failed:\n{}", result.combined_output());
    let json: serde_json::Value = serde_json::from_str(result.stdout.trim()).unwrap();
    assert!(json.to_string().contains("mirror"), "{}", result.stdout);
}
