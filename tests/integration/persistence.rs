//! Integration tests for saving and reloading manager state

use pathfinder::config::PathfinderConfig;
use pathfinder::store::JsonStateStore;
use pathfinder::{ContextManager, Node, PathfinderError, PriorityType, StorageError};
use serde_json::{json, Map};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn populated(store: JsonStateStore) -> (ContextManager, String, String, String) {
    let mut manager = ContextManager::open(store).unwrap();
    let c1 = manager.create_context("Home", "start here").id.clone();
    let c2 = manager.create_context("Work", "desk").id.clone();
    let props = json!({ "title": "Plan", "pages": 3 }).as_object().cloned().unwrap();
    manager
        .add_node(&c1, Node::new("plan", vec!["Doc".to_string()], props).with_relevance(0.7))
        .unwrap();
    manager.add_node(&c1, Node::new("memo", vec![], Map::new())).unwrap();
    manager.add_relationship(&c1, "plan", "memo", "REFERS_TO", None).unwrap();
    manager.set_focus(&c1, vec!["plan".to_string()]).unwrap();
    manager.set_priority_scheme(&c2, PriorityType::Frequency, None).unwrap();
    manager.tag_context(&c1, "personal").unwrap();
    manager.flag_node(&c1, "plan", "important").unwrap();

    let path = manager.create_path("commute", "").id.clone();
    manager.start_recording(&path).unwrap();
    manager.switch_context(&c1, "wake up", &[]).unwrap();
    manager.switch_context(&c2, "arrive", &["plan".to_string()]).unwrap();
    (manager, c1, c2, path)
}

#[test]
fn test_round_trip_preserves_state() {
    let dir = TempDir::new().unwrap();
    let store = JsonStateStore::new(dir.path());
    let (manager, c1, c2, path) = populated(store.clone());
    manager.save().unwrap();

    let reloaded = ContextManager::open(store).unwrap();
    assert_eq!(reloaded.current_context_id(), Some(c2.as_str()));
    assert_eq!(reloaded.recording_path_id(), Some(path.as_str()));
    assert_eq!(reloaded.context(&c1), manager.context(&c1));
    assert_eq!(reloaded.context(&c2), manager.context(&c2));
    assert_eq!(reloaded.path(&path), manager.path(&path));

    let home = reloaded.context(&c1).unwrap();
    assert!(home.tags().contains("personal"));
    assert_eq!(home.focus_nodes(), ["plan".to_string()]);
    let plan = home.node("plan").unwrap().read();
    assert!(plan.metadata.flags.contains("important"));
    assert_eq!(plan.properties["pages"], json!(3));
    assert_eq!(reloaded.context(&c2).unwrap().priority_type(), PriorityType::Frequency);
}

#[test]
fn test_carried_nodes_are_independent_after_reload() {
    let dir = TempDir::new().unwrap();
    let store = JsonStateStore::new(dir.path());
    let (manager, c1, c2, _) = populated(store.clone());
    manager.save().unwrap();

    let mut reloaded = ContextManager::open(store).unwrap();
    reloaded.annotate_node(&c2, "plan", "only at work").unwrap();
    let home_plan = reloaded.context(&c1).unwrap().node("plan").unwrap().read().metadata.notes.clone();
    assert!(home_plan.is_empty());
}

#[test]
fn test_saved_documents_are_plain_json() {
    let dir = TempDir::new().unwrap();
    let (manager, c1, _, _) = populated(JsonStateStore::new(dir.path()));
    manager.save().unwrap();

    let contexts: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("contexts.json")).unwrap()).unwrap();
    assert_eq!(contexts[&c1]["name"], "Home");
    assert_eq!(contexts[&c1]["priority_scheme"], "RECENCY");
    assert!(contexts[&c1]["nodes"]["plan"]["metadata"]["access_count"].is_u64());

    let state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("state.json")).unwrap()).unwrap();
    assert!(state["last_updated"].is_f64());
}

#[test]
fn test_dangling_references_are_dropped() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("state.json"),
        json!({ "current_context_id": "gone", "active_path_id": "gone", "last_updated": 1.0 }).to_string(),
    )
    .unwrap();

    let manager = ContextManager::open(JsonStateStore::new(dir.path())).unwrap();
    assert_eq!(manager.current_context_id(), None);
    assert!(!manager.is_recording());
}

#[test]
fn test_corrupt_state_policy_follows_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("contexts.json"), "{ \"half\": ").unwrap();

    let mut config = PathfinderConfig::default();
    config.storage.root = dir.path().to_path_buf();
    assert!(matches!(
        ContextManager::from_config(&config),
        Err(PathfinderError::Storage(StorageError::CorruptState { .. }))
    ));

    config.storage.quarantine_corrupt = true;
    let manager = ContextManager::from_config(&config).unwrap();
    assert_eq!(manager.contexts().count(), 0);
    assert!(!dir.path().join("contexts.json").exists());
}

#[test]
fn test_save_without_store_is_rejected() {
    let manager = ContextManager::new();
    assert!(matches!(manager.save(), Err(PathfinderError::InvalidConfiguration(_))));
}

#[test]
fn test_mismatched_entry_is_quarantined_when_configured() {
    let dir = TempDir::new().unwrap();
    let misfiled = pathfinder::Context::new("c1", "Alpha", "filed under the wrong key");
    fs::write(
        dir.path().join("contexts.json"),
        json!({ "other": misfiled }).to_string(),
    )
    .unwrap();

    let mut config = PathfinderConfig::default();
    config.storage.root = dir.path().to_path_buf();
    config.storage.quarantine_corrupt = true;
    let manager = ContextManager::from_config(&config).unwrap();
    assert_eq!(manager.contexts().count(), 0);
    assert!(!dir.path().join("contexts.json").exists());
}

#[test]
fn test_nan_ranking_never_reaches_disk() {
    let dir = TempDir::new().unwrap();
    let store = JsonStateStore::new(dir.path());
    let mut manager = ContextManager::open(store.clone()).unwrap();
    let ctx = manager.create_context("Odd", "custom ranking").id.clone();
    manager.add_node(&ctx, Node::new("n1", vec![], Map::new()).with_relevance(0.4)).unwrap();
    manager
        .set_priority_scheme(&ctx, PriorityType::Custom, Some(Arc::new(|_: &Node| f64::NAN)))
        .unwrap();

    assert!(matches!(
        manager.top_nodes(&ctx, 5),
        Err(PathfinderError::InvalidConfiguration(_))
    ));
    manager.save().unwrap();

    let reloaded = ContextManager::open(store).unwrap();
    let node = reloaded.context(&ctx).unwrap().node("n1").unwrap().clone();
    assert!(node.read().metadata.priority.is_finite());
    assert_eq!(node.read().metadata.relevance_score, 0.4);
}
