//! Error types for the Pathfinder context navigation engine.

use crate::priority::PriorityType;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of entity a lookup failed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Context,
    Path,
    Node,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Context => write!(f, "Context"),
            EntityKind::Path => write!(f, "Path"),
            EntityKind::Node => write!(f, "Node"),
        }
    }
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt state in {path:?}: {reason}")]
    CorruptState { path: PathBuf, reason: String },

    #[error("Failed to serialize {what}: {reason}")]
    Serialize { what: &'static str, reason: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StorageError::CorruptState {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Engine-level errors surfaced to callers
#[derive(Debug, Error)]
pub enum PathfinderError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("No current context; switch to a context first")]
    NoCurrentContext,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unsupported priority scheme: {0}")]
    UnsupportedScheme(PriorityType),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Graph source error: {0}")]
    Source(#[from] SourceError),
}

/// Failures reported by an external graph-data source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Graph source unavailable: {0}")]
    Unavailable(String),

    #[error("Bad row: {0}")]
    Row(String),

    #[error("Failed to read graph source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed graph source {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

impl PathfinderError {
    pub fn context_not_found(id: impl Into<String>) -> Self {
        PathfinderError::NotFound {
            kind: EntityKind::Context,
            id: id.into(),
        }
    }

    pub fn path_not_found(id: impl Into<String>) -> Self {
        PathfinderError::NotFound {
            kind: EntityKind::Path,
            id: id.into(),
        }
    }

    pub fn node_not_found(id: impl Into<String>) -> Self {
        PathfinderError::NotFound {
            kind: EntityKind::Node,
            id: id.into(),
        }
    }

    /// Caller errors are reported back without being treated as system failures.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            PathfinderError::NotFound { .. }
                | PathfinderError::NoCurrentContext
                | PathfinderError::InvalidConfiguration(_)
                | PathfinderError::UnsupportedScheme(_)
        )
    }
}

impl From<config::ConfigError> for PathfinderError {
    fn from(err: config::ConfigError) -> Self {
        PathfinderError::Config(err.to_string())
    }
}
