//! Context Store
//!
//! A context is a named working view: a node map, typed relationships
//! between nodes, a focus list and a ranking scheme. Every mutating method
//! ends in `touch()`, which recomputes the accessibility description, so the
//! description always reflects the last mutation made through this API.

use crate::error::PathfinderError;
use crate::model::node::Node;
use crate::priority::{PriorityScheme, PriorityType, RankFn};
use crate::types::{new_id, now_secs, ContextId, NodeId, Timestamp};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// A node handle. Carrying a node between contexts shares this handle, so
/// mutations through either context are visible from both.
pub type SharedNode = Arc<RwLock<Node>>;

/// source id -> relationship type -> edges
pub type RelationshipMap = BTreeMap<NodeId, BTreeMap<String, Vec<Relationship>>>;

/// One directed edge record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub target: NodeId,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub alt_text: String,
}

#[derive(Serialize, Deserialize)]
pub struct Context {
    pub id: ContextId,
    pub name: String,
    pub description: String,
    #[serde(with = "shared_nodes")]
    nodes: BTreeMap<NodeId, SharedNode>,
    #[serde(default)]
    relationships: RelationshipMap,
    #[serde(default)]
    focus_nodes: Vec<NodeId>,
    pub created_at: Timestamp,
    pub last_accessed: Timestamp,
    #[serde(default)]
    priority_scheme: PriorityType,
    #[serde(skip)]
    custom_rank: Option<RankFn>,
    #[serde(default)]
    tags: HashSet<String>,
    #[serde(default)]
    accessibility_description: String,
}

impl Context {
    pub fn new(id: impl Into<ContextId>, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = now_secs();
        let mut context = Context {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            nodes: BTreeMap::new(),
            relationships: BTreeMap::new(),
            focus_nodes: Vec::new(),
            created_at: now,
            last_accessed: now,
            priority_scheme: PriorityType::Recency,
            custom_rank: None,
            tags: HashSet::new(),
            accessibility_description: String::new(),
        };
        context.touch();
        context
    }

    /// Insert or overwrite a node by id.
    pub fn add_node(&mut self, node: Node) -> SharedNode {
        let shared = Arc::new(RwLock::new(node));
        self.add_shared_node(Arc::clone(&shared));
        shared
    }

    /// Insert an existing handle without copying the node.
    pub(crate) fn add_shared_node(&mut self, node: SharedNode) {
        let id = node.read().id.clone();
        self.nodes.insert(id, node);
        self.touch();
    }

    /// Append an edge under `relationships[source][rel_type]` and return its id.
    ///
    /// Endpoints need not be present; the alt text falls back to a generic
    /// phrase when either is missing.
    pub fn add_relationship(
        &mut self,
        source_id: &str,
        target_id: &str,
        rel_type: &str,
        properties: Option<Map<String, Value>>,
        rel_id: Option<String>,
    ) -> String {
        let id = rel_id.unwrap_or_else(new_id);
        let alt_text = self.relationship_alt_text(source_id, target_id, rel_type);
        self.relationships
            .entry(source_id.to_string())
            .or_default()
            .entry(rel_type.to_string())
            .or_default()
            .push(Relationship {
                id: id.clone(),
                target: target_id.to_string(),
                properties: properties.unwrap_or_default(),
                alt_text,
            });
        self.touch();
        id
    }

    fn relationship_alt_text(&self, source_id: &str, target_id: &str, rel_type: &str) -> String {
        match (self.nodes.get(source_id), self.nodes.get(target_id)) {
            (Some(source), Some(target)) => format!(
                "{} {} {}",
                source.read().display_name(),
                rel_type,
                target.read().display_name()
            ),
            _ => format!("Relationship of type {}", rel_type),
        }
    }

    /// Look up a node and record the access on both the node and this context.
    pub fn get_node(&mut self, node_id: &str) -> Option<SharedNode> {
        let node = self.nodes.get(node_id).cloned()?;
        node.write().access();
        self.last_accessed = now_secs();
        Some(node)
    }

    /// Look up a node without recording an access.
    pub fn node(&self, node_id: &str) -> Option<&SharedNode> {
        self.nodes.get(node_id)
    }

    /// Replace the focus list wholesale. Ids need not exist in this context.
    pub fn set_focus(&mut self, node_ids: Vec<NodeId>) {
        self.focus_nodes = node_ids;
        self.touch();
    }

    /// Select the ranking scheme. CUSTOM requires `custom`.
    pub fn set_priority_scheme(
        &mut self,
        kind: PriorityType,
        custom: Option<RankFn>,
    ) -> Result<(), PathfinderError> {
        let scheme = PriorityScheme::from_parts(kind, custom)?;
        self.custom_rank = match scheme {
            PriorityScheme::Custom(rank) => Some(rank),
            _ => None,
        };
        self.priority_scheme = kind;
        Ok(())
    }

    /// The scheme to rank with. A CUSTOM context restored from disk has no
    /// function until one is attached again.
    pub fn scheme(&self) -> Result<PriorityScheme, PathfinderError> {
        PriorityScheme::from_parts(self.priority_scheme, self.custom_rank.clone())
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, SharedNode> {
        &self.nodes
    }

    pub fn relationships(&self) -> &RelationshipMap {
        &self.relationships
    }

    pub fn focus_nodes(&self) -> &[NodeId] {
        &self.focus_nodes
    }

    pub fn is_focus(&self, node_id: &str) -> bool {
        self.focus_nodes.iter().any(|id| id == node_id)
    }

    pub fn priority_type(&self) -> PriorityType {
        self.priority_scheme
    }

    pub fn tags(&self) -> &HashSet<String> {
        &self.tags
    }

    pub fn accessibility_description(&self) -> &str {
        &self.accessibility_description
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Recompute derived text after a mutation.
    fn touch(&mut self) {
        let focus_names: Vec<String> = self
            .focus_nodes
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| node.read().display_name())
            .collect();
        let focus_text = if focus_names.is_empty() {
            "none".to_string()
        } else {
            focus_names.join(", ")
        };

        self.accessibility_description = format!(
            "Context: {}. {}. Contains {} nodes with {} focus nodes. Focus nodes: {}.",
            self.name,
            self.description,
            self.nodes.len(),
            self.focus_nodes.len(),
            focus_text
        );
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("focus_nodes", &self.focus_nodes)
            .field("priority_scheme", &self.priority_scheme)
            .finish_non_exhaustive()
    }
}

// Nodes compare by value; the custom function is runtime-only.
impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.description == other.description
            && self.nodes.len() == other.nodes.len()
            && self.nodes.iter().all(|(id, node)| {
                other
                    .nodes
                    .get(id)
                    .is_some_and(|theirs| *node.read() == *theirs.read())
            })
            && self.relationships == other.relationships
            && self.focus_nodes == other.focus_nodes
            && self.created_at == other.created_at
            && self.last_accessed == other.last_accessed
            && self.priority_scheme == other.priority_scheme
            && self.tags == other.tags
            && self.accessibility_description == other.accessibility_description
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Context: {} ({} nodes, {} focus nodes)",
            self.name,
            self.nodes.len(),
            self.focus_nodes.len()
        )
    }
}

/// Serialize shared node handles as plain node values.
mod shared_nodes {
    use super::SharedNode;
    use crate::model::node::Node;
    use crate::types::NodeId;
    use parking_lot::RwLock;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    pub fn serialize<S>(nodes: &BTreeMap<NodeId, SharedNode>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(nodes.len()))?;
        for (id, node) in nodes {
            map.serialize_entry(id, &*node.read())?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<NodeId, SharedNode>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let plain = BTreeMap::<NodeId, Node>::deserialize(deserializer)?;
        Ok(plain
            .into_iter()
            .map(|(id, node)| (id, Arc::new(RwLock::new(node))))
            .collect())
    }
}
