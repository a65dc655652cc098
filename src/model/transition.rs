//! ContextTransition: an immutable record of one context switch.

use crate::types::{now_secs, ContextId, NodeId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextTransition {
    /// `None` only for the first switch of a process lifetime
    pub from_context_id: Option<ContextId>,
    pub to_context_id: ContextId,
    pub timestamp: Timestamp,
    pub reason: String,
    #[serde(default)]
    pub carried_nodes: Vec<NodeId>,
    #[serde(default)]
    pub notes: String,
}

impl ContextTransition {
    pub fn new(
        from_context_id: Option<ContextId>,
        to_context_id: impl Into<ContextId>,
        reason: impl Into<String>,
        carried_nodes: Vec<NodeId>,
    ) -> Self {
        Self {
            from_context_id,
            to_context_id: to_context_id.into(),
            timestamp: now_secs(),
            reason: reason.into(),
            carried_nodes,
            notes: String::new(),
        }
    }
}
