//! Integration tests that drive the `pathfinder` binary end to end.

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn pathfinder(home: &Path, storage: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pathfinder"))
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("PATHFINDER_ENV")
        .arg("--workspace")
        .arg(home)
        .arg("--storage")
        .arg(storage)
        .args(args)
        .output()
        .unwrap()
}

fn json_ok(home: &Path, storage: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--format", "json"];
    full.extend_from_slice(args);
    let output = pathfinder(home, storage, &full);
    assert!(
        output.status.success(),
        "pathfinder {:?} failed: stderr={}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_record_and_replay_through_cli() {
    let temp_dir = TempDir::new().unwrap();
    let home = temp_dir.path();
    let storage = temp_dir.path().join("state");

    let a = json_ok(home, &storage, &["context", "create", "Alpha"])["id"]
        .as_str()
        .unwrap()
        .to_string();
    let b = json_ok(home, &storage, &["context", "create", "Beta"])["id"]
        .as_str()
        .unwrap()
        .to_string();
    let path = json_ok(home, &storage, &["path", "create", "tour"])["id"]
        .as_str()
        .unwrap()
        .to_string();

    let added = pathfinder(
        home,
        &storage,
        &["context", "add-node", &a, "n1", "--label", "Thing", "--prop", "name=Widget"],
    );
    assert!(added.status.success());

    pathfinder(home, &storage, &["path", "record", &path]);
    pathfinder(home, &storage, &["context", "switch", &a]);
    pathfinder(home, &storage, &["context", "switch", &b, "--carry", "n1"]);
    pathfinder(home, &storage, &["path", "stop"]);

    let shown = json_ok(home, &storage, &["context", "show", &b]);
    assert!(shown["nodes"]["n1"].is_object());

    let replay = json_ok(home, &storage, &["path", "replay", &path, "--interval-ms", "1"]);
    assert_eq!(replay["steps"], 2);
    assert_eq!(replay["cancelled"], false);

    let listed = json_ok(home, &storage, &["path", "list"]);
    assert_eq!(listed[0]["transitions"], 2);
    assert_eq!(listed[0]["recording"], false);
}

#[test]
fn test_unknown_context_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let output = pathfinder(
        temp_dir.path(),
        &temp_dir.path().join("state"),
        &["context", "switch", "does-not-exist"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Context not found: does-not-exist"), "stderr={}", stderr);
}

#[test]
fn test_corrupt_state_message_suggests_quarantine() {
    let temp_dir = TempDir::new().unwrap();
    let storage = temp_dir.path().join("state");
    std::fs::create_dir_all(&storage).unwrap();
    std::fs::write(storage.join("paths.json"), "[").unwrap();

    let output = pathfinder(temp_dir.path(), &storage, &["path", "list"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("quarantine_corrupt"));
}

#[test]
fn test_config_command_prints_effective_settings() {
    let temp_dir = TempDir::new().unwrap();
    let storage = temp_dir.path().join("state");
    let output = pathfinder(temp_dir.path(), &storage, &["config"]);
    assert!(output.status.success());

    let rendered: toml::Value = toml::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(rendered["replay"]["step_interval_ms"].as_integer(), Some(500));
    assert_eq!(
        rendered["storage"]["root"].as_str(),
        Some(storage.to_str().unwrap())
    );
}
