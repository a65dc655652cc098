//! JSON document persistence for manager state
//!
//! State is split across three independent documents under a storage root:
//! `contexts.json`, `paths.json` and `state.json`. Each is written to a
//! temporary file and renamed into place. A missing document loads as empty.

use crate::error::StorageError;
use crate::model::{Context, PathRoute};
use crate::types::{now_secs, ContextId, PathId, Timestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONTEXTS_FILE: &str = "contexts.json";
pub const PATHS_FILE: &str = "paths.json";
pub const STATE_FILE: &str = "state.json";

/// Orchestrator state persisted in `state.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerState {
    pub current_context_id: Option<ContextId>,
    pub active_path_id: Option<PathId>,
    pub last_updated: Timestamp,
}

/// Everything read back by [`JsonStateStore::load`]
#[derive(Debug, Default)]
pub struct LoadedState {
    pub contexts: BTreeMap<ContextId, Context>,
    pub paths: BTreeMap<PathId, PathRoute>,
    pub state: Option<ManagerState>,
}

#[derive(Debug, Clone)]
pub struct JsonStateStore {
    root: PathBuf,
    quarantine_corrupt: bool,
}

impl JsonStateStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            quarantine_corrupt: false,
        }
    }

    /// When enabled, an unreadable document is renamed aside and loading
    /// continues as if it were absent.
    pub fn with_quarantine(mut self, quarantine_corrupt: bool) -> Self {
        self.quarantine_corrupt = quarantine_corrupt;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contexts_path(&self) -> PathBuf {
        self.root.join(CONTEXTS_FILE)
    }

    pub fn paths_path(&self) -> PathBuf {
        self.root.join(PATHS_FILE)
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    pub fn save(
        &self,
        contexts: &BTreeMap<ContextId, Context>,
        paths: &BTreeMap<PathId, PathRoute>,
        state: &ManagerState,
    ) -> Result<(), StorageError> {
        check_finite(contexts)?;
        fs::create_dir_all(&self.root).map_err(|e| StorageError::io(&self.root, e))?;

        write_json(&self.contexts_path(), contexts, "contexts")?;
        write_json(&self.paths_path(), paths, "paths")?;
        write_json(&self.state_path(), state, "manager state")?;

        info!(
            contexts = contexts.len(),
            paths = paths.len(),
            root = %self.root.display(),
            "Saved state"
        );
        Ok(())
    }

    pub fn load(&self) -> Result<LoadedState, StorageError> {
        let contexts: BTreeMap<ContextId, Context> = self
            .read_document(&self.contexts_path(), |path, doc| check_keys(path, doc, |c: &Context| &c.id))?
            .unwrap_or_default();

        let paths: BTreeMap<PathId, PathRoute> = self
            .read_document(&self.paths_path(), |path, doc| check_keys(path, doc, |p: &PathRoute| &p.id))?
            .unwrap_or_default();

        let state = self.read_document(&self.state_path(), |_, _: &ManagerState| Ok(()))?;

        Ok(LoadedState {
            contexts,
            paths,
            state,
        })
    }

    /// Read one document and run `check` on it. A document that fails to
    /// parse or fails `check` is corrupt, and is quarantined when enabled.
    fn read_document<T, F>(&self, path: &Path, check: F) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
        F: Fn(&Path, &T) -> Result<(), StorageError>,
    {
        let document = read_json(path).and_then(|document: Option<T>| {
            if let Some(doc) = &document {
                check(path, doc)?;
            }
            Ok(document)
        });
        match document {
            Err(StorageError::CorruptState { path, reason }) if self.quarantine_corrupt => {
                let quarantined = quarantine(&path)?;
                warn!(
                    file = %path.display(),
                    moved_to = %quarantined.display(),
                    reason = %reason,
                    "Quarantined corrupt state file; continuing with empty state"
                );
                Ok(None)
            }
            other => other,
        }
    }
}

fn check_keys<T>(
    path: &Path,
    documents: &BTreeMap<String, T>,
    id_of: impl Fn(&T) -> &String,
) -> Result<(), StorageError> {
    for (key, document) in documents {
        if id_of(document) != key {
            return Err(StorageError::corrupt(
                path,
                format!("entry `{}` carries mismatched id `{}`", key, id_of(document)),
            ));
        }
    }
    Ok(())
}

/// JSON has no NaN or infinity; serde_json would write them as `null` and
/// the document could not be read back.
fn check_finite(contexts: &BTreeMap<ContextId, Context>) -> Result<(), StorageError> {
    for context in contexts.values() {
        for (node_id, node) in context.nodes() {
            let node = node.read();
            let fields = [
                ("relevance_score", node.metadata.relevance_score),
                ("priority", node.metadata.priority),
                ("last_accessed", node.metadata.last_accessed),
            ];
            if let Some((field, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
                return Err(StorageError::Serialize {
                    what: "contexts",
                    reason: format!(
                        "node `{}` in context `{}` has non-finite {} ({})",
                        node_id, context.id, field, value
                    ),
                });
            }
        }
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, e)),
    };
    let value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            StorageError::io(path, e.into())
        } else {
            StorageError::corrupt(path, e)
        }
    })?;
    Ok(Some(value))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, what: &'static str) -> Result<(), StorageError> {
    let temp_path = path.with_extension("json.tmp");

    let result = (|| -> Result<(), StorageError> {
        let file = File::create(&temp_path).map_err(|e| StorageError::io(&temp_path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| StorageError::Serialize {
            what,
            reason: e.to_string(),
        })?;
        writer.flush().map_err(|e| StorageError::io(&temp_path, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| StorageError::io(&temp_path, e))
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StorageError::io(path, e)
    })
}

fn quarantine(path: &Path) -> Result<PathBuf, StorageError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    let stamp = (now_secs() * 1_000_000.0) as u64;
    let mut target = path.with_file_name(format!("{}.corrupt-{}", file_name, stamp));
    let mut attempt = 1;
    while target.exists() {
        target = path.with_file_name(format!("{}.corrupt-{}-{}", file_name, stamp, attempt));
        attempt += 1;
    }
    fs::rename(path, &target).map_err(|e| StorageError::io(path, e))?;
    Ok(target)
}
