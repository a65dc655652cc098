//! Integration tests for importing graph rows into the current context

use pathfinder::config::PathfinderConfig;
use pathfinder::source::{JsonFileSource, StaticGraphSource};
use pathfinder::{ContextManager, PathfinderError};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_import_from_json_file_uses_configured_defaults() {
    let dir = TempDir::new().unwrap();
    let graph = dir.path().join("graph.json");
    fs::write(
        &graph,
        json!({
            "City": [
                { "uuid": "c-1", "properties": { "name": "Lisbon" } },
                { "uuid": "c-2", "properties": { "name": "Porto" } },
                "not a row",
                { "uuid": "c-3", "properties": { "name": "Faro" } }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let mut config = PathfinderConfig::default();
    config.storage.root = dir.path().join("state");
    config.import.default_limit = 3;
    config.import.default_relevance = 0.25;

    let mut manager = ContextManager::from_config(&config).unwrap();
    let ctx = manager.create_context("Travel", "cities").id.clone();
    manager.switch_context(&ctx, "plan trip", &[]).unwrap();

    let report = manager
        .import_from_source(&JsonFileSource::new(&graph), "City", None)
        .unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.failed, 1);

    let context = manager.context(&ctx).unwrap();
    assert_eq!(context.nodes().len(), 2);
    let lisbon = context.node("c-1").unwrap().read();
    assert_eq!(lisbon.metadata.relevance_score, 0.25);
    assert_eq!(lisbon.metadata.alt_text, "Lisbon: City node");
}

#[test]
fn test_missing_file_fails_whole_import() {
    let mut manager = ContextManager::new();
    let ctx = manager.create_context("Empty", "d").id.clone();
    manager.switch_context(&ctx, "go", &[]).unwrap();

    let result = manager.import_from_source(&JsonFileSource::new("/nonexistent/graph.json"), "City", None);
    assert!(matches!(result, Err(PathfinderError::Source(_))));
    assert!(manager.context(&ctx).unwrap().nodes().is_empty());
}

#[test]
fn test_import_lands_in_current_context_only() {
    let mut manager = ContextManager::new();
    let a = manager.create_context("A", "d").id.clone();
    let b = manager.create_context("B", "d").id.clone();
    manager.switch_context(&b, "go", &[]).unwrap();

    let source = StaticGraphSource::new().with_rows("Tag", vec![json!({ "id": "t1" })]);
    manager.import_from_source(&source, "Tag", None).unwrap();
    assert!(manager.context(&a).unwrap().nodes().is_empty());
    assert!(manager.context(&b).unwrap().node("t1").is_some());
}
