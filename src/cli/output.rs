//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{PathfinderError, StorageError};

/// Map domain errors to a one-line message for stderr.
pub fn map_error(e: &PathfinderError) -> String {
    match e {
        PathfinderError::Storage(StorageError::CorruptState { path, .. }) => format!(
            "{} (set storage.quarantine_corrupt = true to move {} aside and start empty)",
            e,
            path.display()
        ),
        _ => e.to_string(),
    }
}

/// Pretty JSON, with serializer failures reported as storage errors.
pub(crate) fn to_json<T: serde::Serialize + ?Sized>(
    value: &T,
    what: &'static str,
) -> Result<String, PathfinderError> {
    serde_json::to_string_pretty(value).map_err(|e| {
        PathfinderError::Storage(StorageError::Serialize {
            what,
            reason: e.to_string(),
        })
    })
}
