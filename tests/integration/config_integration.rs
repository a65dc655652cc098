//! Integration tests for the layered configuration system

use super::test_utils::with_isolated_env;
use pathfinder::config::{ConfigLoader, PathfinderConfig, ValidationError};
use pathfinder::ContextManager;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_defaults_without_any_files() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();

    let config = with_isolated_env(&temp_dir, &[], || ConfigLoader::load(&workspace).unwrap());
    assert_eq!(config.replay.step_interval_ms, 500);
    assert_eq!(config.import.default_limit, 100);
    assert!(config.storage.root.ends_with(".pathfinder"));
}

#[test]
fn test_layer_precedence() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(workspace.join("config")).unwrap();
    fs::create_dir_all(temp_dir.path().join("pathfinder")).unwrap();

    fs::write(
        temp_dir.path().join("pathfinder").join("config.toml"),
        r#"
[replay]
step_interval_ms = 100

[import]
default_limit = 10
default_relevance = 0.9
"#,
    )
    .unwrap();
    fs::write(
        workspace.join("config").join("config.toml"),
        "[import]\ndefault_limit = 20\n",
    )
    .unwrap();
    fs::write(
        workspace.join("config").join("staging.toml"),
        "[import]\ndefault_limit = 30\n",
    )
    .unwrap();

    let config = with_isolated_env(
        &temp_dir,
        &[
            ("PATHFINDER_ENV", "staging"),
            ("PATHFINDER__REPLAY__STEP_INTERVAL_MS", "7"),
        ],
        || ConfigLoader::load(&workspace).unwrap(),
    );

    assert_eq!(config.replay.step_interval_ms, 7);
    assert_eq!(config.import.default_limit, 30);
    assert_eq!(config.import.default_relevance, 0.9);
}

#[test]
fn test_explicit_file_sits_above_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(workspace.join("config")).unwrap();
    fs::write(
        workspace.join("config").join("config.toml"),
        "[replay]\nstep_interval_ms = 200\n",
    )
    .unwrap();
    let explicit = temp_dir.path().join("explicit.toml");
    fs::write(&explicit, "[replay]\nstep_interval_ms = 300\n").unwrap();

    let config = with_isolated_env(&temp_dir, &[], || {
        ConfigLoader::load_with(&workspace, Some(&explicit)).unwrap()
    });
    assert_eq!(config.replay.step_interval_ms, 300);
}

#[test]
fn test_invalid_values_are_reported_together() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("bad.toml");
    fs::write(
        &config_file,
        r#"
[import]
default_limit = 0
default_relevance = -1.0

[logging]
output = "pager"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().any(|e| matches!(e, ValidationError::Logging(_))));
    assert!(config.validated().is_err());
}

#[test]
fn test_manager_uses_configured_storage() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = PathfinderConfig::default();
    config.storage.root = temp_dir.path().join("state");
    config.replay.step_interval_ms = 42;

    let mut manager = ContextManager::from_config(&config).unwrap();
    manager.create_context("Configured", "d");
    manager.save().unwrap();

    assert!(temp_dir.path().join("state").join("contexts.json").exists());
    assert_eq!(manager.replay_interval().as_millis(), 42);
}
