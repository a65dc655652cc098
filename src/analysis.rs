//! Pattern Analyzer
//!
//! Aggregate statistics over every recorded path, and pairwise comparison of
//! contexts by node membership and priority.
//!
//! Cycle detection only finds immediately adjacent, exact repeats of a run
//! of contexts within one path (`a b a b`). A context revisited after
//! unrelated steps (`a b c a`) is not reported as a cycle.

use crate::error::PathfinderError;
use crate::manager::ContextManager;
use crate::model::{Context, PathRoute};
use crate::types::{ContextId, NodeId, PathId};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

const TOP_LIMIT: usize = 10;
const MAX_CYCLE_LENGTH: usize = 10;
const PRIORITY_DIFF_THRESHOLD: f64 = 0.1;
const SUMMARY_NAME_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionCount {
    pub from: ContextId,
    pub to: ContextId,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextVisits {
    pub id: ContextId,
    pub visits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    pub path_id: PathId,
    pub path_name: String,
    pub cycle_length: usize,
    pub contexts: Vec<ContextId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternReport {
    pub common_transitions: Vec<TransitionCount>,
    pub frequent_contexts: Vec<ContextVisits>,
    pub cycles: Vec<Cycle>,
}

impl PatternReport {
    pub fn is_empty(&self) -> bool {
        self.common_transitions.is_empty() && self.frequent_contexts.is_empty() && self.cycles.is_empty()
    }
}

/// Count-descending, key-ascending; truncated to the top entries.
fn top_counts<K: Ord + Clone>(counts: HashMap<K, usize>) -> Vec<(K, usize)> {
    let mut entries: Vec<(K, usize)> = counts.into_iter().collect();
    entries.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
    entries.truncate(TOP_LIMIT);
    entries
}

pub fn analyze_context_patterns<'a, I>(paths: I) -> PatternReport
where
    I: IntoIterator<Item = &'a PathRoute>,
{
    let mut pair_counts: HashMap<(ContextId, ContextId), usize> = HashMap::new();
    let mut visit_counts: HashMap<ContextId, usize> = HashMap::new();
    let mut cycles = Vec::new();

    for path in paths {
        let sequence = path.context_sequence();
        for pair in sequence.windows(2) {
            *pair_counts
                .entry((pair[0].to_string(), pair[1].to_string()))
                .or_default() += 1;
        }
        for context_id in &sequence {
            *visit_counts.entry(context_id.to_string()).or_default() += 1;
        }
        cycles.extend(detect_cycles(&sequence).into_iter().map(|(length, run)| Cycle {
            path_id: path.id.clone(),
            path_name: path.name.clone(),
            cycle_length: length,
            contexts: run,
        }));
    }

    PatternReport {
        common_transitions: top_counts(pair_counts)
            .into_iter()
            .map(|((from, to), count)| TransitionCount { from, to, count })
            .collect(),
        frequent_contexts: top_counts(visit_counts)
            .into_iter()
            .map(|(id, visits)| ContextVisits { id, visits })
            .collect(),
        cycles,
    }
}

/// For each window length, the first run immediately followed by an
/// identical run. Returns `(length, run)` pairs, shortest window first.
pub fn detect_cycles<S: AsRef<str>>(sequence: &[S]) -> Vec<(usize, Vec<String>)> {
    let max_length = MAX_CYCLE_LENGTH.min(sequence.len() / 2);
    let mut found = Vec::new();

    for length in 1..=max_length {
        let mut start = 0;
        while start + 2 * length <= sequence.len() {
            let first = &sequence[start..start + length];
            let second = &sequence[start + length..start + 2 * length];
            if first.iter().map(AsRef::as_ref).eq(second.iter().map(AsRef::as_ref)) {
                found.push((length, first.iter().map(|s| s.as_ref().to_string()).collect()));
                break;
            }
            start += 1;
        }
    }
    found
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextRef {
    pub id: ContextId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityDifference {
    pub node_id: NodeId,
    pub name: String,
    pub ctx1_priority: f64,
    pub ctx2_priority: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextComparison {
    pub context1: ContextRef,
    pub context2: ContextRef,
    pub common_nodes: usize,
    pub only_in_ctx1: usize,
    pub only_in_ctx2: usize,
    pub priority_differences: Vec<PriorityDifference>,
    /// Jaccard index of the two node-id sets; 0 when both are empty
    pub similarity_score: f64,
    pub accessibility_summary: String,
}

/// Compare two contexts by node membership and per-scheme priority.
///
/// Shared nodes are re-ranked under each context's own scheme; each node's
/// stored priority ends up holding the value for `ctx2`.
pub fn compare_contexts(ctx1: &Context, ctx2: &Context) -> Result<ContextComparison, PathfinderError> {
    let nodes1: BTreeSet<&NodeId> = ctx1.node_ids().collect();
    let nodes2: BTreeSet<&NodeId> = ctx2.node_ids().collect();

    let common: Vec<&NodeId> = nodes1.intersection(&nodes2).copied().collect();
    let only_in_ctx1 = nodes1.difference(&nodes2).count();
    let only_in_ctx2 = nodes2.difference(&nodes1).count();
    let union = nodes1.union(&nodes2).count();

    let mut differences = Vec::new();
    let mut common_names = Vec::with_capacity(common.len());
    // Schemes are only needed to rank shared nodes.
    if !common.is_empty() {
        let scheme1 = ctx1.scheme()?;
        let scheme2 = ctx2.scheme()?;
        for node_id in &common {
            let (Some(node1), Some(node2)) = (ctx1.node(node_id), ctx2.node(node_id)) else {
                continue;
            };
            let priority1 = crate::priority::recompute(&mut node1.write(), &scheme1)?;
            let priority2 = crate::priority::recompute(&mut node2.write(), &scheme2)?;
            let name = node1.read().display_name();

            let difference = (priority1 - priority2).abs();
            if difference > PRIORITY_DIFF_THRESHOLD {
                differences.push(PriorityDifference {
                    node_id: (*node_id).clone(),
                    name: name.clone(),
                    ctx1_priority: priority1,
                    ctx2_priority: priority2,
                    difference,
                });
            }
            common_names.push(name);
        }
    }
    differences.sort_by(|a, b| {
        b.difference
            .total_cmp(&a.difference)
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
    differences.truncate(TOP_LIMIT);

    let similarity_score = if union == 0 {
        0.0
    } else {
        common.len() as f64 / union as f64
    };

    let mut common_text = common_names
        .iter()
        .take(SUMMARY_NAME_LIMIT)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if common_names.len() > SUMMARY_NAME_LIMIT {
        common_text.push_str("...");
    }
    let accessibility_summary = format!(
        "Comparing context {} with {}. {} common nodes, {} nodes only in {}, {} nodes only in {}. Common nodes include: {}.",
        ctx1.name,
        ctx2.name,
        common.len(),
        only_in_ctx1,
        ctx1.name,
        only_in_ctx2,
        ctx2.name,
        if common_text.is_empty() { "none" } else { &common_text }
    );

    Ok(ContextComparison {
        context1: ContextRef {
            id: ctx1.id.clone(),
            name: ctx1.name.clone(),
        },
        context2: ContextRef {
            id: ctx2.id.clone(),
            name: ctx2.name.clone(),
        },
        common_nodes: common.len(),
        only_in_ctx1,
        only_in_ctx2,
        priority_differences: differences,
        similarity_score,
        accessibility_summary,
    })
}

impl ContextManager {
    /// Statistics over all stored paths, not just the one being recorded.
    pub fn analyze_context_patterns(&self) -> PatternReport {
        analyze_context_patterns(self.paths())
    }

    pub fn compare_contexts(&self, context_id_1: &str, context_id_2: &str) -> Result<ContextComparison, PathfinderError> {
        let ctx1 = self
            .context(context_id_1)
            .ok_or_else(|| PathfinderError::context_not_found(context_id_1))?;
        let ctx2 = self
            .context(context_id_2)
            .ok_or_else(|| PathfinderError::context_not_found(context_id_2))?;
        compare_contexts(ctx1, ctx2)
    }
}
