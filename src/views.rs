//! Context Views
//!
//! Renderer-facing snapshot of one context: nodes sized by access count and
//! colored by focus, links flattened from the adjacency map, and the
//! context's accessibility text.

use crate::error::PathfinderError;
use crate::manager::ContextManager;
use crate::model::Context;
use crate::types::{ContextId, NodeId};
use serde::Serialize;
use serde_json::{Map, Value};

pub const FOCUS_COLOR: &str = "#ff9900";
pub const DEFAULT_COLOR: &str = "#3388aa";

const BASE_SIZE: u64 = 10;
const SIZE_PER_ACCESS: u64 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    pub id: NodeId,
    /// Labels joined with `:`
    pub label: String,
    pub name: String,
    pub priority: f64,
    pub size: u64,
    pub color: &'static str,
    pub properties: Map<String, Value>,
    pub alt_text: String,
    pub aria_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualLink {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub properties: Map<String, Value>,
    pub alt_text: String,
    pub aria_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualContext {
    pub id: ContextId,
    pub name: String,
    pub description: String,
    pub accessibility_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visualization {
    pub nodes: Vec<VisualNode>,
    pub links: Vec<VisualLink>,
    pub context: VisualContext,
}

/// Build the visualization payload. Priorities are reported as last
/// computed; nothing is re-ranked.
pub fn visualize_context(context: &Context) -> Visualization {
    let nodes = context
        .nodes()
        .iter()
        .map(|(id, node)| {
            let node = node.read();
            VisualNode {
                id: id.clone(),
                label: node.labels.join(":"),
                name: node.display_name(),
                priority: node.metadata.priority,
                size: BASE_SIZE + node.metadata.access_count * SIZE_PER_ACCESS,
                color: if context.is_focus(id) { FOCUS_COLOR } else { DEFAULT_COLOR },
                properties: node.properties.clone(),
                alt_text: node.metadata.alt_text.clone(),
                aria_label: node.metadata.alt_text.clone(),
            }
        })
        .collect();

    let links = context
        .relationships()
        .iter()
        .flat_map(|(source, by_type)| {
            by_type.iter().flat_map(move |(rel_type, edges)| {
                edges.iter().map(move |edge| VisualLink {
                    id: edge.id.clone(),
                    source: source.clone(),
                    target: edge.target.clone(),
                    rel_type: rel_type.clone(),
                    properties: edge.properties.clone(),
                    alt_text: edge.alt_text.clone(),
                    aria_label: edge.alt_text.clone(),
                })
            })
        })
        .collect();

    Visualization {
        nodes,
        links,
        context: VisualContext {
            id: context.id.clone(),
            name: context.name.clone(),
            description: context.description.clone(),
            accessibility_description: context.accessibility_description().to_string(),
        },
    }
}

impl ContextManager {
    /// Visualize `context_id`, or the current context when `None`.
    pub fn visualize(&self, context_id: Option<&str>) -> Result<Visualization, PathfinderError> {
        let context_id = match context_id {
            Some(id) => id,
            None => self.current_context_id().ok_or(PathfinderError::NoCurrentContext)?,
        };
        let context = self
            .context(context_id)
            .ok_or_else(|| PathfinderError::context_not_found(context_id))?;
        Ok(visualize_context(context))
    }
}
