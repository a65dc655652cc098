//! PathRoute: an append-only trail of context switches.

use crate::model::transition::ContextTransition;
use crate::types::{now_secs, PathId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRoute {
    pub id: PathId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    transitions: Vec<ContextTransition>,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
    #[serde(default)]
    tags: HashSet<String>,
    #[serde(default)]
    accessibility_description: String,
}

impl PathRoute {
    pub fn new(id: impl Into<PathId>, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = now_secs();
        let mut path = PathRoute {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            transitions: Vec::new(),
            created_at: now,
            last_updated: now,
            tags: HashSet::new(),
            accessibility_description: String::new(),
        };
        path.touch();
        path
    }

    /// Append a transition. Transitions are never reordered or removed.
    pub fn add_transition(&mut self, transition: ContextTransition) {
        self.transitions.push(transition);
        self.last_updated = now_secs();
        self.touch();
    }

    pub fn transitions(&self) -> &[ContextTransition] {
        &self.transitions
    }

    /// Target context of every transition, in order.
    pub fn context_sequence(&self) -> Vec<&str> {
        self.transitions
            .iter()
            .map(|t| t.to_context_id.as_str())
            .collect()
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn tags(&self) -> &HashSet<String> {
        &self.tags
    }

    pub fn accessibility_description(&self) -> &str {
        &self.accessibility_description
    }

    fn touch(&mut self) {
        self.accessibility_description = format!(
            "Path: {}. {}. Contains {} transitions.",
            self.name,
            self.description,
            self.transitions.len()
        );
    }
}
