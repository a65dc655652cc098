//! Pathfinder: Context and Path Navigation
//!
//! Named working views ("contexts") over nodes drawn from a graph, ranked by
//! attention, with recorded trails of context switches that can be replayed
//! and analyzed.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod model;
pub mod priority;
pub mod replay;
pub mod source;
pub mod store;
pub mod types;
pub mod views;

pub use error::{PathfinderError, SourceError, StorageError};
pub use manager::{ContextManager, RecordingState};
pub use model::{Context, ContextTransition, Node, PathRoute, SharedNode};
pub use priority::{PriorityScheme, PriorityType};
