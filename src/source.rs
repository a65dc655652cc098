//! External graph-data source boundary and import into the current context.
//!
//! A source answers "rows of properties for a label, up to a limit". Each
//! row becomes a new node in the current context. Rows that fail, or that
//! are not JSON objects, are skipped and counted; they never abort the
//! import.

use crate::error::{PathfinderError, SourceError};
use crate::manager::ContextManager;
use crate::model::Node;
use crate::types::{new_id, NodeId};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One row of properties as returned by a source
pub type GraphRow = Map<String, Value>;

/// Query-by-label capability of an external graph store.
///
/// The outer `Result` fails the whole fetch; inner errors fail single rows.
pub trait GraphSource {
    fn fetch(&self, label: &str, limit: usize) -> Result<Vec<Result<GraphRow, SourceError>>, SourceError>;
}

/// In-memory rows keyed by label
#[derive(Debug, Clone, Default)]
pub struct StaticGraphSource {
    rows: HashMap<String, Vec<Value>>,
}

impl StaticGraphSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, label: impl Into<String>, rows: Vec<Value>) -> Self {
        self.rows.entry(label.into()).or_default().extend(rows);
        self
    }
}

impl GraphSource for StaticGraphSource {
    fn fetch(&self, label: &str, limit: usize) -> Result<Vec<Result<GraphRow, SourceError>>, SourceError> {
        Ok(self
            .rows
            .get(label)
            .map(|rows| rows.iter().take(limit).map(row_from_value).collect())
            .unwrap_or_default())
    }
}

/// A JSON document on disk shaped `{ "<label>": [ {row}, ... ], ... }`
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read(&self) -> Result<Map<String, Value>, SourceError> {
        let file = File::open(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| SourceError::Parse {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

impl GraphSource for JsonFileSource {
    fn fetch(&self, label: &str, limit: usize) -> Result<Vec<Result<GraphRow, SourceError>>, SourceError> {
        let document = self.read()?;
        match document.get(label) {
            None => Ok(Vec::new()),
            Some(Value::Array(rows)) => Ok(rows.iter().take(limit).map(row_from_value).collect()),
            Some(_) => Err(SourceError::Parse {
                path: self.path.clone(),
                reason: format!("label `{}` is not a list of rows", label),
            }),
        }
    }
}

fn row_from_value(value: &Value) -> Result<GraphRow, SourceError> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        other => Err(SourceError::Row(format!("expected an object, got {}", other))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
    pub node_ids: Vec<NodeId>,
}

/// Turn a row into a node labelled `label`.
///
/// The id comes from a string `uuid` or `id` field, else a fresh one. A
/// nested `properties` object is used as the property map when present;
/// otherwise the row's remaining fields are.
pub fn node_from_row(label: &str, mut row: GraphRow, relevance: f64) -> Node {
    let id_field = ["uuid", "id"].into_iter().find_map(|key| match row.get(key) {
        Some(Value::String(id)) if !id.is_empty() => Some((key, id.clone())),
        _ => None,
    });

    let properties = match row.remove("properties") {
        Some(Value::Object(properties)) => properties,
        other => {
            if let Some(other) = other {
                row.insert("properties".to_string(), other);
            }
            // the id field becomes the node id, not a property
            if let Some((key, _)) = &id_field {
                row.remove(*key);
            }
            row
        }
    };

    let id = id_field.map(|(_, id)| id).unwrap_or_else(new_id);
    Node::new(id, vec![label.to_string()], properties).with_relevance(relevance)
}

impl ContextManager {
    /// Import up to `limit` rows labelled `label` into the current context.
    ///
    /// `limit` and relevance fall back to the `[import]` settings.
    pub fn import_from_source(
        &mut self,
        source: &dyn GraphSource,
        label: &str,
        limit: Option<usize>,
    ) -> Result<ImportReport, PathfinderError> {
        let context_id = self
            .current_context_id()
            .map(str::to_string)
            .ok_or(PathfinderError::NoCurrentContext)?;
        let limit = limit.unwrap_or(self.import.default_limit);
        let relevance = self.import.default_relevance;

        let rows = source.fetch(label, limit)?;
        let mut report = ImportReport::default();
        for (index, row) in rows.into_iter().enumerate() {
            match row {
                Ok(row) => {
                    let node = node_from_row(label, row, relevance);
                    report.node_ids.push(node.id.clone());
                    self.add_node(&context_id, node)?;
                    report.imported += 1;
                }
                Err(e) => {
                    warn!(label, index, error = %e, "Skipped import row");
                    report.failed += 1;
                }
            }
        }

        info!(
            context_id = %context_id,
            label,
            imported = report.imported,
            failed = report.failed,
            "Imported nodes"
        );
        Ok(report)
    }
}
