//! Entity Model: nodes, contexts, transitions and paths.

pub mod context;
pub mod node;
pub mod path;
pub mod transition;

pub use context::{Context, Relationship, RelationshipMap, SharedNode};
pub use node::{Node, NodeMetadata};
pub use path::PathRoute;
pub use transition::ContextTransition;
