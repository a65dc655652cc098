//! Path presentation: list, show and replay output.

use super::shared::{format_timestamp, table};
use crate::cli::output::to_json;
use crate::cli::parse::OutputFormat;
use crate::error::PathfinderError;
use crate::model::PathRoute;
use crate::replay::ReplayOutcome;
use serde::Serialize;

#[derive(Serialize)]
struct PathSummary<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    transitions: usize,
    last_updated: f64,
    recording: bool,
}

pub fn format_path_list(
    paths: &[&PathRoute],
    recording: Option<&str>,
    format: OutputFormat,
) -> Result<String, PathfinderError> {
    let summaries: Vec<PathSummary> = paths
        .iter()
        .map(|p| PathSummary {
            id: &p.id,
            name: &p.name,
            description: &p.description,
            transitions: p.transitions().len(),
            last_updated: p.last_updated,
            recording: recording == Some(p.id.as_str()),
        })
        .collect();
    if format == OutputFormat::Json {
        return to_json(&summaries, "path list");
    }
    if summaries.is_empty() {
        return Ok("No paths.".to_string());
    }

    let mut table = table(vec!["", "Path ID", "Name", "Transitions", "Last Updated"]);
    for s in &summaries {
        table.add_row(vec![
            if s.recording { "REC" } else { "" }.to_string(),
            s.id.to_string(),
            s.name.to_string(),
            s.transitions.to_string(),
            format_timestamp(s.last_updated),
        ]);
    }
    Ok(table.to_string())
}

/// `context_name` resolves ids to names for display; unknown ids print as-is.
pub fn format_path_show<'a, F>(
    path: &PathRoute,
    context_name: F,
    format: OutputFormat,
) -> Result<String, PathfinderError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    if format == OutputFormat::Json {
        return to_json(path, "path");
    }

    let mut output = format!("{}\nID: {}\n", path.accessibility_description(), path.id);
    if path.transitions().is_empty() {
        output.push_str("No transitions recorded.");
        return Ok(output);
    }
    let name = |id: &str| context_name(id).unwrap_or(id).to_string();
    let mut steps = table(vec!["#", "From", "To", "Reason", "Carried", "At"]);
    for (i, t) in path.transitions().iter().enumerate() {
        steps.add_row(vec![
            (i + 1).to_string(),
            t.from_context_id.as_deref().map(&name).unwrap_or_else(|| "-".to_string()),
            name(&t.to_context_id),
            t.reason.clone(),
            t.carried_nodes.join(", "),
            format_timestamp(t.timestamp),
        ]);
    }
    output.push('\n');
    output.push_str(&steps.to_string());
    Ok(output)
}

#[derive(Serialize)]
struct ReplayReport<'a> {
    path_id: &'a str,
    steps: usize,
    cancelled: bool,
    visited: &'a [String],
}

pub fn format_replay(
    path_id: &str,
    visited: &[String],
    outcome: &ReplayOutcome,
    format: OutputFormat,
) -> Result<String, PathfinderError> {
    if format == OutputFormat::Json {
        let report = ReplayReport {
            path_id,
            steps: outcome.steps,
            cancelled: outcome.cancelled,
            visited,
        };
        return to_json(&report, "replay report");
    }
    let mut lines: Vec<String> = visited
        .iter()
        .enumerate()
        .map(|(i, line)| format!("Step {}: {}", i + 1, line))
        .collect();
    lines.push(if outcome.cancelled {
        format!("Replay cancelled after {} steps", outcome.steps)
    } else {
        format!("Replay finished: {} steps", outcome.steps)
    });
    Ok(lines.join("\n"))
}
