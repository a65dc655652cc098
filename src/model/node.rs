//! Node: one entity of interest inside a context, with attention metadata.

use crate::priority::PriorityScheme;
use crate::types::{now_secs, NodeId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Attention metadata persisted alongside a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default)]
    pub access_count: u64,
    pub last_accessed: Timestamp,
    /// Caller-supplied, 0.0..=1.0 by convention; not clamped
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub flags: HashSet<String>,
    /// Last value computed by the ranker; stale until re-ranked
    #[serde(default)]
    pub priority: f64,
    #[serde(default)]
    pub alt_text: String,
}

/// An entity wrapped with contextual metadata.
#[derive(Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub metadata: NodeMetadata,
    #[serde(skip)]
    last_scheme: PriorityScheme,
}

impl Node {
    /// Create a node; priority starts at the RECENCY value and alt text is
    /// derived from the display name and labels.
    pub fn new(id: impl Into<NodeId>, labels: Vec<String>, properties: Map<String, Value>) -> Self {
        let now = now_secs();
        let mut node = Node {
            id: id.into(),
            labels,
            properties,
            metadata: NodeMetadata {
                access_count: 0,
                last_accessed: now,
                relevance_score: 0.0,
                notes: Vec::new(),
                flags: HashSet::new(),
                priority: now,
                alt_text: String::new(),
            },
            last_scheme: PriorityScheme::Recency,
        };
        node.metadata.alt_text = format!("{}: {} node", node.display_name(), node.labels.join(", "));
        node
    }

    pub fn with_relevance(mut self, relevance_score: f64) -> Self {
        self.metadata.relevance_score = relevance_score;
        self
    }

    /// Replace the derived alt text. Alt text is never refreshed automatically.
    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.metadata.alt_text = alt_text.into();
        self
    }

    /// Record an access: bump the count, refresh the timestamp and re-rank
    /// under the scheme this node was last ranked with.
    pub fn access(&mut self) {
        self.metadata.access_count += 1;
        self.metadata.last_accessed = now_secs();
        // last_scheme only ever holds a scheme that ranked successfully
        if let Ok(priority) = self.last_scheme.rank(self) {
            self.metadata.priority = priority;
        }
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.metadata.notes.push(note.into());
    }

    pub fn add_flag(&mut self, flag: impl Into<String>) {
        self.metadata.flags.insert(flag.into());
    }

    /// `name` property, then `title`, then `"{labels}({id prefix}...)"`.
    pub fn display_name(&self) -> String {
        for key in ["name", "title"] {
            match self.properties.get(key) {
                Some(Value::String(s)) => return s.clone(),
                Some(Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
        let prefix: String = self.id.chars().take(8).collect();
        format!("{}({}...)", self.labels.join(":"), prefix)
    }

    pub(crate) fn remember_scheme(&mut self, scheme: PriorityScheme) {
        self.last_scheme = scheme;
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("labels", &self.labels)
            .field("properties", &self.properties)
            .field("metadata", &self.metadata)
            .field("last_scheme", &self.last_scheme)
            .finish()
    }
}

// The remembered scheme is runtime-only and not part of a node's identity.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.labels == other.labels
            && self.properties == other.properties
            && self.metadata == other.metadata
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (priority: {:.2})", self.display_name(), self.metadata.priority)
    }
}
