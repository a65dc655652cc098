//! Path/Transition Orchestrator
//!
//! `ContextManager` owns every context and path, tracks the current context
//! and the recording mode, and routes all mutations through the context
//! store operations. It is single-owner and does no internal locking; hosts
//! that share it between requests must serialize access themselves.

use crate::config::{ImportConfig, PathfinderConfig, ReplayConfig};
use crate::error::PathfinderError;
use crate::model::{Context, ContextTransition, Node, PathRoute, SharedNode};
use crate::priority::{self, PriorityType, RankFn};
use crate::store::persistence::{JsonStateStore, LoadedState, ManagerState};
use crate::types::{new_id, now_secs, ContextId, NodeId, PathId};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Whether switches are currently appended to a path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording { path_id: PathId },
}

pub struct ContextManager {
    contexts: BTreeMap<ContextId, Context>,
    paths: BTreeMap<PathId, PathRoute>,
    current_context_id: Option<ContextId>,
    recording: RecordingState,
    store: Option<JsonStateStore>,
    pub(crate) import: ImportConfig,
    pub(crate) replay: ReplayConfig,
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextManager {
    /// In-memory manager with no storage attached.
    pub fn new() -> Self {
        Self {
            contexts: BTreeMap::new(),
            paths: BTreeMap::new(),
            current_context_id: None,
            recording: RecordingState::Idle,
            store: None,
            import: ImportConfig::default(),
            replay: ReplayConfig::default(),
        }
    }

    /// Load state from `store` and keep it attached for `save()`.
    pub fn open(store: JsonStateStore) -> Result<Self, PathfinderError> {
        let loaded = store.load()?;
        let mut manager = Self::new();
        manager.restore(loaded);
        manager.store = Some(store);
        Ok(manager)
    }

    /// Open the store described by `config` and apply its engine settings.
    pub fn from_config(config: &PathfinderConfig) -> Result<Self, PathfinderError> {
        let store = JsonStateStore::new(&config.storage.root)
            .with_quarantine(config.storage.quarantine_corrupt);
        let mut manager = Self::open(store)?;
        manager.import = config.import.clone();
        manager.replay = config.replay.clone();
        Ok(manager)
    }

    fn restore(&mut self, loaded: LoadedState) {
        self.contexts = loaded.contexts;
        self.paths = loaded.paths;

        let Some(state) = loaded.state else {
            info!(contexts = self.contexts.len(), paths = self.paths.len(), "Loaded state");
            return;
        };

        self.current_context_id = match state.current_context_id {
            Some(id) if self.contexts.contains_key(&id) => Some(id),
            Some(id) => {
                warn!(context_id = %id, "Restored current context does not exist; starting with none");
                None
            }
            None => None,
        };
        self.recording = match state.active_path_id {
            Some(id) if self.paths.contains_key(&id) => RecordingState::Recording { path_id: id },
            Some(id) => {
                warn!(path_id = %id, "Restored recording path does not exist; recording stays idle");
                RecordingState::Idle
            }
            None => RecordingState::Idle,
        };
        info!(contexts = self.contexts.len(), paths = self.paths.len(), "Loaded state");
    }

    /// Persist everything to the attached store.
    pub fn save(&self) -> Result<(), PathfinderError> {
        let store = self.store.as_ref().ok_or_else(|| {
            PathfinderError::InvalidConfiguration("no storage attached to this manager".to_string())
        })?;
        self.save_to(store)
    }

    pub fn save_to(&self, store: &JsonStateStore) -> Result<(), PathfinderError> {
        let state = ManagerState {
            current_context_id: self.current_context_id.clone(),
            active_path_id: self.recording_path_id().map(str::to_string),
            last_updated: now_secs(),
        };
        store.save(&self.contexts, &self.paths, &state)?;
        Ok(())
    }

    pub fn store(&self) -> Option<&JsonStateStore> {
        self.store.as_ref()
    }

    // ---- contexts -------------------------------------------------------

    pub fn create_context(&mut self, name: &str, description: &str) -> &mut Context {
        let id = new_id();
        info!(context_id = %id, context_name = %name, "Created new context");
        self.contexts
            .entry(id.clone())
            .or_insert_with(|| Context::new(id, name, description))
    }

    pub fn context(&self, context_id: &str) -> Option<&Context> {
        self.contexts.get(context_id)
    }

    pub fn context_mut(&mut self, context_id: &str) -> Result<&mut Context, PathfinderError> {
        self.contexts
            .get_mut(context_id)
            .ok_or_else(|| PathfinderError::context_not_found(context_id))
    }

    fn require_context(&self, context_id: &str) -> Result<&Context, PathfinderError> {
        self.contexts
            .get(context_id)
            .ok_or_else(|| PathfinderError::context_not_found(context_id))
    }

    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.contexts.values()
    }

    pub fn current_context_id(&self) -> Option<&str> {
        self.current_context_id.as_deref()
    }

    pub fn current_context(&self) -> Option<&Context> {
        self.current_context_id
            .as_deref()
            .and_then(|id| self.contexts.get(id))
    }

    /// The `n` most recently accessed contexts, most recent first.
    pub fn recent_contexts(&self, n: usize) -> Vec<&Context> {
        let mut contexts: Vec<&Context> = self.contexts.values().collect();
        contexts.sort_by(|a, b| b.last_accessed.total_cmp(&a.last_accessed));
        contexts.truncate(n);
        contexts
    }

    /// Insert or overwrite a node. The relevance score must be finite.
    pub fn add_node(&mut self, context_id: &str, node: Node) -> Result<SharedNode, PathfinderError> {
        if !node.metadata.relevance_score.is_finite() {
            return Err(PathfinderError::InvalidConfiguration(format!(
                "node {} has non-finite relevance score {}",
                node.id, node.metadata.relevance_score
            )));
        }
        Ok(self.context_mut(context_id)?.add_node(node))
    }

    pub fn add_relationship(
        &mut self,
        context_id: &str,
        source_id: &str,
        target_id: &str,
        rel_type: &str,
        properties: Option<Map<String, Value>>,
    ) -> Result<String, PathfinderError> {
        Ok(self
            .context_mut(context_id)?
            .add_relationship(source_id, target_id, rel_type, properties, None))
    }

    /// Look up a node, recording the access.
    pub fn get_node(&mut self, context_id: &str, node_id: &str) -> Result<SharedNode, PathfinderError> {
        self.context_mut(context_id)?
            .get_node(node_id)
            .ok_or_else(|| PathfinderError::node_not_found(node_id))
    }

    pub fn set_focus(&mut self, context_id: &str, node_ids: Vec<NodeId>) -> Result<(), PathfinderError> {
        self.context_mut(context_id)?.set_focus(node_ids);
        Ok(())
    }

    pub fn set_priority_scheme(
        &mut self,
        context_id: &str,
        kind: PriorityType,
        custom: Option<RankFn>,
    ) -> Result<(), PathfinderError> {
        self.context_mut(context_id)?.set_priority_scheme(kind, custom)
    }

    pub fn top_nodes(&self, context_id: &str, n: usize) -> Result<Vec<SharedNode>, PathfinderError> {
        priority::top_n(self.require_context(context_id)?, n)
    }

    pub fn annotate_node(&mut self, context_id: &str, node_id: &str, note: &str) -> Result<(), PathfinderError> {
        let node = self.peek_node(context_id, node_id)?;
        node.write().add_note(note);
        Ok(())
    }

    pub fn flag_node(&mut self, context_id: &str, node_id: &str, flag: &str) -> Result<(), PathfinderError> {
        let node = self.peek_node(context_id, node_id)?;
        node.write().add_flag(flag);
        Ok(())
    }

    fn peek_node(&self, context_id: &str, node_id: &str) -> Result<SharedNode, PathfinderError> {
        self.require_context(context_id)?
            .node(node_id)
            .cloned()
            .ok_or_else(|| PathfinderError::node_not_found(node_id))
    }

    pub fn tag_context(&mut self, context_id: &str, tag: &str) -> Result<(), PathfinderError> {
        self.context_mut(context_id)?.add_tag(tag);
        Ok(())
    }

    /// Switch to `context_id`, carrying the listed nodes from the current
    /// context by shared handle.
    ///
    /// While recording, the transition is appended to the active path.
    /// Carried ids missing from the current context are recorded on the
    /// transition but otherwise ignored.
    pub fn switch_context(
        &mut self,
        context_id: &str,
        reason: &str,
        carry_nodes: &[NodeId],
    ) -> Result<&Context, PathfinderError> {
        if !self.contexts.contains_key(context_id) {
            return Err(PathfinderError::context_not_found(context_id));
        }

        let transition = ContextTransition::new(
            self.current_context_id.clone(),
            context_id,
            reason,
            carry_nodes.to_vec(),
        );
        if let RecordingState::Recording { path_id } = &self.recording {
            if let Some(path) = self.paths.get_mut(path_id) {
                path.add_transition(transition);
            }
        }

        let carried: Vec<SharedNode> = match self
            .current_context_id
            .as_deref()
            .and_then(|id| self.contexts.get_mut(id))
        {
            Some(source) => carry_nodes
                .iter()
                .filter_map(|node_id| source.get_node(node_id))
                .collect(),
            None => Vec::new(),
        };

        let previous = self.current_context_id.replace(context_id.to_string());
        let target = self.context_mut(context_id)?;
        for node in carried {
            target.add_shared_node(node);
        }
        target.last_accessed = now_secs();

        info!(from = ?previous, to = %context_id, carried = carry_nodes.len(), "Switched context");
        Ok(target)
    }

    // ---- paths ----------------------------------------------------------

    pub fn create_path(&mut self, name: &str, description: &str) -> &mut PathRoute {
        let id = new_id();
        info!(path_id = %id, path_name = %name, "Created new path");
        self.paths
            .entry(id.clone())
            .or_insert_with(|| PathRoute::new(id, name, description))
    }

    pub fn path(&self, path_id: &str) -> Option<&PathRoute> {
        self.paths.get(path_id)
    }

    pub(crate) fn require_path(&self, path_id: &str) -> Result<&PathRoute, PathfinderError> {
        self.paths
            .get(path_id)
            .ok_or_else(|| PathfinderError::path_not_found(path_id))
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathRoute> {
        self.paths.values()
    }

    pub fn tag_path(&mut self, path_id: &str, tag: &str) -> Result<(), PathfinderError> {
        self.paths
            .get_mut(path_id)
            .ok_or_else(|| PathfinderError::path_not_found(path_id))?
            .add_tag(tag);
        Ok(())
    }

    /// Start appending switches to `path_id`. Starting while already
    /// recording moves recording to the new path.
    pub fn start_recording(&mut self, path_id: &str) -> Result<(), PathfinderError> {
        self.require_path(path_id)?;
        if let RecordingState::Recording { path_id: previous } = &self.recording {
            info!(previous = %previous, next = %path_id, "Recording moved to another path");
        }
        self.recording = RecordingState::Recording {
            path_id: path_id.to_string(),
        };
        info!(path_id, "Started recording path");
        Ok(())
    }

    /// Return to idle, yielding the path that was being recorded.
    pub fn stop_recording(&mut self) -> Option<PathId> {
        match std::mem::take(&mut self.recording) {
            RecordingState::Recording { path_id } => {
                info!(path_id = %path_id, "Stopped recording path");
                Some(path_id)
            }
            RecordingState::Idle => None,
        }
    }

    pub fn recording(&self) -> &RecordingState {
        &self.recording
    }

    pub fn recording_path_id(&self) -> Option<&str> {
        match &self.recording {
            RecordingState::Recording { path_id } => Some(path_id),
            RecordingState::Idle => None,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.recording, RecordingState::Recording { .. })
    }
}
