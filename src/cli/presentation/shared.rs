//! Shared presentation: timestamps, tables and node rankings.

use crate::cli::output::to_json;
use crate::cli::parse::OutputFormat;
use crate::error::PathfinderError;
use crate::model::SharedNode;
use crate::types::Timestamp;
use chrono::{DateTime, Utc};
use comfy_table::Table;
use serde::Serialize;

/// Seconds since the epoch as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_timestamp(ts: Timestamp) -> String {
    let secs = ts.trunc() as i64;
    let nanos = (ts.fract() * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{:.0}", ts))
}

pub(crate) fn table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(header);
    table
}

#[derive(Serialize)]
struct RankedRow {
    rank: usize,
    id: String,
    name: String,
    priority: f64,
    access_count: u64,
}

pub fn format_node_ranking(nodes: &[SharedNode], format: OutputFormat) -> Result<String, PathfinderError> {
    let rows: Vec<RankedRow> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let node = node.read();
            RankedRow {
                rank: i + 1,
                id: node.id.clone(),
                name: node.display_name(),
                priority: node.metadata.priority,
                access_count: node.metadata.access_count,
            }
        })
        .collect();

    if format == OutputFormat::Json {
        return to_json(&rows, "node ranking");
    }
    if rows.is_empty() {
        return Ok("No nodes.".to_string());
    }
    let mut table = table(vec!["#", "Node ID", "Name", "Priority", "Accesses"]);
    for row in &rows {
        table.add_row(vec![
            row.rank.to_string(),
            row.id.clone(),
            row.name.clone(),
            format!("{:.2}", row.priority),
            row.access_count.to_string(),
        ]);
    }
    Ok(table.to_string())
}
