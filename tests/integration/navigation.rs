//! End-to-end navigation: contexts, carried nodes, recording, replay and analysis

use pathfinder::{ContextManager, Node, PathfinderError, PriorityType};
use serde_json::{json, Map, Value};

fn named(id: &str, name: &str) -> Node {
    let props: Map<String, Value> = json!({ "name": name }).as_object().cloned().unwrap();
    Node::new(id, vec!["Person".to_string()], props)
}

#[test]
fn test_research_session() {
    let mut manager = ContextManager::new();
    let lit = manager.create_context("Literature", "papers to read").id.clone();
    let draft = manager.create_context("Draft", "writing").id.clone();

    manager.add_node(&lit, named("ada", "Ada")).unwrap();
    manager.add_node(&lit, named("alan", "Alan").with_relevance(0.9)).unwrap();
    manager.add_relationship(&lit, "ada", "alan", "CITES", None).unwrap();
    manager.set_focus(&lit, vec!["ada".to_string()]).unwrap();
    assert_eq!(
        manager.context(&lit).unwrap().accessibility_description(),
        "Context: Literature. papers to read. Contains 2 nodes with 1 focus nodes. Focus nodes: Ada."
    );

    let path = manager.create_path("session", "one afternoon").id.clone();
    manager.start_recording(&path).unwrap();
    manager.switch_context(&lit, "start", &[]).unwrap();
    manager
        .switch_context(&draft, "write it up", &["alan".to_string(), "ghost".to_string()])
        .unwrap();
    manager.switch_context(&lit, "check a source", &[]).unwrap();
    manager.switch_context(&draft, "back to writing", &[]).unwrap();
    assert_eq!(manager.stop_recording(), Some(path.clone()));

    let recorded = manager.path(&path).unwrap();
    assert_eq!(recorded.transitions().len(), 4);
    assert_eq!(recorded.transitions()[0].from_context_id, None);
    assert_eq!(recorded.transitions()[1].carried_nodes, vec!["alan", "ghost"]);

    // carried node is shared, not copied
    manager.annotate_node(&draft, "alan", "check dates").unwrap();
    let in_lit = manager.context(&lit).unwrap().node("alan").unwrap().clone();
    assert_eq!(in_lit.read().metadata.notes, vec!["check dates".to_string()]);
    assert!(manager.context(&draft).unwrap().node("ghost").is_none());

    let report = manager.analyze_context_patterns();
    assert_eq!(report.frequent_contexts.len(), 2);
    assert_eq!(report.frequent_contexts[0].visits, 2);
    assert_eq!(report.cycles.len(), 1);
    assert_eq!(report.cycles[0].cycle_length, 2);
    assert_eq!(report.cycles[0].contexts, vec![lit.clone(), draft.clone()]);

    let comparison = manager.compare_contexts(&lit, &draft).unwrap();
    assert_eq!(comparison.common_nodes, 1);
    assert_eq!(comparison.only_in_ctx1, 1);
    assert_eq!(comparison.only_in_ctx2, 0);
    assert!((comparison.similarity_score - 0.5).abs() < 1e-9);

    let mut seen = Vec::new();
    let outcome = manager.replay_path(&path, |ctx| seen.push(ctx.name.clone())).unwrap();
    assert_eq!(outcome.steps, 4);
    assert_eq!(seen, vec!["Literature", "Draft", "Literature", "Draft"]);
    assert_eq!(manager.current_context_id(), Some(draft.as_str()));
}

/// Carrying needs a current context to carry from, so C1 is entered before
/// recording starts; that switch is not part of the path.
#[test]
fn test_alpha_beta_round_trip_scenario() {
    let mut manager = ContextManager::new();
    let c1 = manager.create_context("Alpha", "first").id.clone();
    let c2 = manager.create_context("Beta", "second").id.clone();
    manager.add_node(&c1, named("n1", "One")).unwrap();
    manager.add_node(&c1, named("n2", "Two")).unwrap();
    manager.switch_context(&c1, "open", &[]).unwrap();

    let path = manager.create_path("alpha-beta", "there and back").id.clone();
    manager.start_recording(&path).unwrap();
    manager.switch_context(&c2, "carry n1", &["n1".to_string()]).unwrap();
    manager.switch_context(&c1, "return", &[]).unwrap();
    manager.stop_recording();

    assert_eq!(manager.path(&path).unwrap().transitions().len(), 2);
    assert!(manager.context(&c2).unwrap().node("n1").is_some());
    assert!(manager.context(&c2).unwrap().node("n2").is_none());

    let report = manager.analyze_context_patterns();
    let back = report
        .common_transitions
        .iter()
        .find(|t| t.from == c2 && t.to == c1)
        .expect("C2 -> C1 pair reported");
    assert_eq!(back.count, 1);
}

#[test]
fn test_carry_without_current_context_moves_nothing() {
    let mut manager = ContextManager::new();
    let c1 = manager.create_context("Alpha", "first").id.clone();
    let c2 = manager.create_context("Beta", "second").id.clone();
    manager.add_node(&c1, named("n1", "One")).unwrap();

    manager.switch_context(&c2, "cold start", &["n1".to_string()]).unwrap();
    assert!(manager.context(&c2).unwrap().node("n1").is_none());
}

#[test]
fn test_ranking_follows_scheme() {
    let mut manager = ContextManager::new();
    let ctx = manager.create_context("Ranked", "d").id.clone();
    manager.add_node(&ctx, named("a", "A").with_relevance(0.2)).unwrap();
    manager.add_node(&ctx, named("b", "B").with_relevance(0.8)).unwrap();
    for _ in 0..3 {
        manager.get_node(&ctx, "a").unwrap();
    }

    manager.set_priority_scheme(&ctx, PriorityType::Relevance, None).unwrap();
    let top = manager.top_nodes(&ctx, 1).unwrap();
    assert_eq!(top[0].read().id, "b");

    manager.set_priority_scheme(&ctx, PriorityType::Frequency, None).unwrap();
    let top = manager.top_nodes(&ctx, 2).unwrap();
    assert_eq!(top[0].read().id, "a");
    assert_eq!(top[0].read().metadata.priority, 3.0);

    manager.set_priority_scheme(&ctx, PriorityType::Centrality, None).unwrap();
    assert!(matches!(
        manager.top_nodes(&ctx, 2),
        Err(PathfinderError::UnsupportedScheme(PriorityType::Centrality))
    ));
    assert!(matches!(
        manager.set_priority_scheme(&ctx, PriorityType::Custom, None),
        Err(PathfinderError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_custom_ranking_function() {
    let mut manager = ContextManager::new();
    let ctx = manager.create_context("Custom", "d").id.clone();
    manager.add_node(&ctx, named("short", "Al")).unwrap();
    manager.add_node(&ctx, named("long", "Bartholomew")).unwrap();

    let by_name_length: pathfinder::priority::RankFn =
        std::sync::Arc::new(|node: &Node| node.display_name().len() as f64);
    manager
        .set_priority_scheme(&ctx, PriorityType::Custom, Some(by_name_length))
        .unwrap();

    let top = manager.top_nodes(&ctx, 2).unwrap();
    assert_eq!(top[0].read().id, "long");
    assert_eq!(top[1].read().metadata.priority, 2.0);
}

#[test]
fn test_unknown_ids_are_caller_errors() {
    let mut manager = ContextManager::new();
    let ctx = manager.create_context("Only", "d").id.clone();

    let err = manager.switch_context("nope", "r", &[]).unwrap_err();
    assert!(err.is_caller_error());
    assert!(manager.get_node(&ctx, "nope").unwrap_err().is_caller_error());
    assert!(manager.start_recording("nope").unwrap_err().is_caller_error());
    assert!(manager.start_replay("nope").unwrap_err().is_caller_error());
    assert_eq!(manager.current_context_id(), None);
}
