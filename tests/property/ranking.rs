//! Ranking properties: frequency counts accesses, top_n is bounded and ordered

use pathfinder::model::Context;
use pathfinder::priority::top_n;
use pathfinder::{Node, PriorityType};
use proptest::prelude::*;
use serde_json::Map;

proptest! {
    #[test]
    fn frequency_priority_equals_access_count(accesses in 0usize..50) {
        let mut context = Context::new("c", "C", "d");
        context.add_node(Node::new("n", vec![], Map::new()));
        context.set_priority_scheme(PriorityType::Frequency, None).unwrap();

        for _ in 0..accesses {
            context.get_node("n").unwrap();
        }
        let top = top_n(&context, 1).unwrap();
        prop_assert_eq!(top[0].read().metadata.priority, accesses as f64);
        prop_assert_eq!(top[0].read().metadata.access_count, accesses as u64);
    }

    #[test]
    fn top_n_is_bounded_and_descending(
        relevances in proptest::collection::vec(0.0f64..1.0, 0..40),
        n in 0usize..50,
    ) {
        let mut context = Context::new("c", "C", "d");
        for (i, relevance) in relevances.iter().enumerate() {
            context.add_node(Node::new(format!("n{:02}", i), vec![], Map::new()).with_relevance(*relevance));
        }
        context.set_priority_scheme(PriorityType::Relevance, None).unwrap();

        let top = top_n(&context, n).unwrap();
        prop_assert_eq!(top.len(), n.min(relevances.len()));

        let ranked: Vec<(f64, String)> = top
            .iter()
            .map(|node| {
                let node = node.read();
                (node.metadata.priority, node.id.clone())
            })
            .collect();
        for pair in ranked.windows(2) {
            prop_assert!(
                pair[0].0 > pair[1].0 || (pair[0].0 == pair[1].0 && pair[0].1 < pair[1].1),
                "out of order: {:?}", pair
            );
        }

        if let Some((lowest_kept, _)) = ranked.last() {
            let kept: Vec<&String> = ranked.iter().map(|(_, id)| id).collect();
            for (id, node) in context.nodes() {
                if !kept.contains(&id) {
                    prop_assert!(node.read().metadata.priority <= *lowest_kept);
                }
            }
        }
    }
}
