//! Save/load round trip over generated contexts

use pathfinder::store::JsonStateStore;
use pathfinder::{ContextManager, Node};
use proptest::prelude::*;
use serde_json::{Map, Value};
use tempfile::TempDir;

#[derive(Debug, Clone)]
struct NodeSpec {
    id: String,
    label: String,
    name: String,
    relevance: f64,
    accesses: usize,
}

fn node_spec() -> impl Strategy<Value = NodeSpec> {
    ("[a-z0-9]{1,8}", "[A-Z][a-z]{0,6}", "\\PC{0,12}", 0.0f64..1.0, 0usize..4).prop_map(
        |(id, label, name, relevance, accesses)| NodeSpec {
            id,
            label,
            name,
            relevance,
            accesses,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn save_then_load_is_identity(
        contexts in proptest::collection::vec(
            ("\\PC{1,16}", proptest::collection::vec(node_spec(), 0..6)),
            1..4,
        ),
        focus_first in any::<bool>(),
    ) {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path());
        let mut manager = ContextManager::open(store.clone()).unwrap();

        let mut ids = Vec::new();
        for (name, nodes) in &contexts {
            let ctx = manager.create_context(name, "generated").id.clone();
            for spec in nodes {
                let mut props = Map::new();
                props.insert("name".to_string(), Value::String(spec.name.clone()));
                let node = Node::new(spec.id.clone(), vec![spec.label.clone()], props)
                    .with_relevance(spec.relevance);
                manager.add_node(&ctx, node).unwrap();
                for _ in 0..spec.accesses {
                    manager.get_node(&ctx, &spec.id).unwrap();
                }
            }
            if focus_first {
                if let Some(spec) = nodes.first() {
                    manager.set_focus(&ctx, vec![spec.id.clone()]).unwrap();
                }
            }
            ids.push(ctx);
        }
        manager.switch_context(&ids[0], "generated", &[]).unwrap();
        manager.save().unwrap();

        let reloaded = ContextManager::open(store).unwrap();
        prop_assert_eq!(reloaded.current_context_id(), Some(ids[0].as_str()));
        for id in &ids {
            let before = serde_json::to_value(manager.context(id)).unwrap();
            let after = serde_json::to_value(reloaded.context(id)).unwrap();
            prop_assert_eq!(after, before);
        }
    }
}
