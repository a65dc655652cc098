//! Priority Ranker
//!
//! Computes a scalar priority per node under a selectable scheme and selects
//! the top-N nodes of a context. Recomputation writes the result back into
//! each node's stored `priority`.

use crate::error::PathfinderError;
use crate::model::context::{Context, SharedNode};
use crate::model::node::Node;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Scheme names, as persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityType {
    /// Most recently accessed first
    #[default]
    Recency,
    /// Most frequently accessed first
    Frequency,
    /// Highest caller-supplied relevance first
    Relevance,
    /// Reserved; no formula is defined
    Centrality,
    /// Caller-supplied ranking function
    Custom,
}

impl PriorityType {
    pub const ALL: [PriorityType; 5] = [
        PriorityType::Recency,
        PriorityType::Frequency,
        PriorityType::Relevance,
        PriorityType::Centrality,
        PriorityType::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PriorityType::Recency => "RECENCY",
            PriorityType::Frequency => "FREQUENCY",
            PriorityType::Relevance => "RELEVANCE",
            PriorityType::Centrality => "CENTRALITY",
            PriorityType::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for PriorityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityType {
    type Err = PathfinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        PriorityType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                PathfinderError::InvalidConfiguration(format!(
                    "unknown priority scheme `{}`; expected recency|frequency|relevance|centrality|custom",
                    s
                ))
            })
    }
}

/// Caller-supplied ranking function for the CUSTOM scheme
pub type RankFn = Arc<dyn Fn(&Node) -> f64 + Send + Sync>;

/// A scheme ready to rank with; CUSTOM carries its function.
#[derive(Clone, Default)]
pub enum PriorityScheme {
    #[default]
    Recency,
    Frequency,
    Relevance,
    Centrality,
    Custom(RankFn),
}

impl fmt::Debug for PriorityScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityScheme::Custom(_) => f.write_str("Custom(<fn>)"),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

type BuiltinRanker = fn(&Node) -> f64;

/// Ranking table for the schemes with a built-in formula.
fn builtin_ranker(kind: PriorityType) -> Option<BuiltinRanker> {
    match kind {
        PriorityType::Recency => Some(|node| node.metadata.last_accessed),
        PriorityType::Frequency => Some(|node| node.metadata.access_count as f64),
        PriorityType::Relevance => Some(|node| node.metadata.relevance_score),
        PriorityType::Centrality | PriorityType::Custom => None,
    }
}

impl PriorityScheme {
    /// Build a scheme from its persisted name and an optional custom function.
    ///
    /// CUSTOM without a function is an `InvalidConfiguration`.
    pub fn from_parts(kind: PriorityType, custom: Option<RankFn>) -> Result<Self, PathfinderError> {
        match kind {
            PriorityType::Recency => Ok(PriorityScheme::Recency),
            PriorityType::Frequency => Ok(PriorityScheme::Frequency),
            PriorityType::Relevance => Ok(PriorityScheme::Relevance),
            PriorityType::Centrality => Ok(PriorityScheme::Centrality),
            PriorityType::Custom => custom.map(PriorityScheme::Custom).ok_or_else(|| {
                PathfinderError::InvalidConfiguration(
                    "CUSTOM priority scheme requires a ranking function".to_string(),
                )
            }),
        }
    }

    pub fn custom<F>(rank: F) -> Self
    where
        F: Fn(&Node) -> f64 + Send + Sync + 'static,
    {
        PriorityScheme::Custom(Arc::new(rank))
    }

    pub fn kind(&self) -> PriorityType {
        match self {
            PriorityScheme::Recency => PriorityType::Recency,
            PriorityScheme::Frequency => PriorityType::Frequency,
            PriorityScheme::Relevance => PriorityType::Relevance,
            PriorityScheme::Centrality => PriorityType::Centrality,
            PriorityScheme::Custom(_) => PriorityType::Custom,
        }
    }

    /// Priority of `node` under this scheme, without storing it.
    ///
    /// A NaN or infinite result is rejected; priorities must survive a save.
    pub fn rank(&self, node: &Node) -> Result<f64, PathfinderError> {
        let priority = match self {
            PriorityScheme::Custom(rank) => rank(node),
            other => builtin_ranker(other.kind())
                .map(|rank| rank(node))
                .ok_or(PathfinderError::UnsupportedScheme(other.kind()))?,
        };
        if !priority.is_finite() {
            return Err(PathfinderError::InvalidConfiguration(format!(
                "{} scheme ranked node {} as {}",
                self.kind(),
                node.id,
                priority
            )));
        }
        Ok(priority)
    }
}

/// Recompute and store `node`'s priority under `scheme`.
///
/// The node remembers `scheme` so later accesses re-rank the same way.
pub fn recompute(node: &mut Node, scheme: &PriorityScheme) -> Result<f64, PathfinderError> {
    let priority = scheme.rank(node)?;
    node.metadata.priority = priority;
    node.remember_scheme(scheme.clone());
    Ok(priority)
}

struct Ranked {
    priority: f64,
    id: NodeId,
    node: SharedNode,
}

// Higher priority ranks first; on ties the lexicographically smaller id wins.
impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Recompute every node of `context` under its scheme and return the `n`
/// highest, best first.
///
/// Uses a bounded min-heap of size `n`, so the cost is O(nodes · log n).
/// Ties are broken by ascending node id.
pub fn top_n(context: &Context, n: usize) -> Result<Vec<SharedNode>, PathfinderError> {
    let scheme = context.scheme()?;
    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(n.saturating_add(1));

    for (id, node) in context.nodes() {
        let priority = recompute(&mut node.write(), &scheme)?;
        heap.push(Reverse(Ranked {
            priority,
            id: id.clone(),
            node: Arc::clone(node),
        }));
        if heap.len() > n {
            heap.pop();
        }
    }

    let mut ranked: Vec<Ranked> = heap.into_iter().map(|Reverse(r)| r).collect();
    ranked.sort_by(|a, b| b.cmp(a));
    Ok(ranked.into_iter().map(|r| r.node).collect())
}
