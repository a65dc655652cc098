//! Context presentation: list, show, switch, import and visualization output.

use super::shared::{format_timestamp, table};
use crate::cli::output::to_json;
use crate::cli::parse::OutputFormat;
use crate::error::PathfinderError;
use crate::model::Context;
use crate::source::ImportReport;
use crate::views::Visualization;
use serde::Serialize;

#[derive(Serialize)]
struct ContextSummary<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    nodes: usize,
    focus_nodes: usize,
    priority_scheme: String,
    last_accessed: f64,
    current: bool,
}

impl<'a> ContextSummary<'a> {
    fn of(context: &'a Context, current: Option<&str>) -> Self {
        Self {
            id: &context.id,
            name: &context.name,
            description: &context.description,
            nodes: context.nodes().len(),
            focus_nodes: context.focus_nodes().len(),
            priority_scheme: context.priority_type().to_string(),
            last_accessed: context.last_accessed,
            current: current == Some(context.id.as_str()),
        }
    }
}

pub fn format_context_list(
    contexts: &[&Context],
    current: Option<&str>,
    format: OutputFormat,
) -> Result<String, PathfinderError> {
    let summaries: Vec<ContextSummary> = contexts
        .iter()
        .map(|c| ContextSummary::of(c, current))
        .collect();
    if format == OutputFormat::Json {
        return to_json(&summaries, "context list");
    }
    if summaries.is_empty() {
        return Ok("No contexts.".to_string());
    }

    let mut table = table(vec!["", "Context ID", "Name", "Nodes", "Focus", "Scheme", "Last Accessed"]);
    for s in &summaries {
        table.add_row(vec![
            if s.current { "*" } else { "" }.to_string(),
            s.id.to_string(),
            s.name.to_string(),
            s.nodes.to_string(),
            s.focus_nodes.to_string(),
            s.priority_scheme.clone(),
            format_timestamp(s.last_accessed),
        ]);
    }
    Ok(table.to_string())
}

pub fn format_context_show(context: &Context, format: OutputFormat) -> Result<String, PathfinderError> {
    if format == OutputFormat::Json {
        return to_json(context, "context");
    }

    let mut output = format!(
        "{}\nID: {}\nScheme: {}\nCreated: {}\nLast accessed: {}\n",
        context,
        context.id,
        context.priority_type(),
        format_timestamp(context.created_at),
        format_timestamp(context.last_accessed),
    );
    if !context.tags().is_empty() {
        let mut tags: Vec<&String> = context.tags().iter().collect();
        tags.sort();
        output.push_str(&format!(
            "Tags: {}\n",
            tags.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
        ));
    }
    output.push_str(&format!("\n{}\n", context.accessibility_description()));

    if context.nodes().is_empty() {
        return Ok(output);
    }
    let mut nodes = table(vec!["", "Node ID", "Name", "Labels", "Priority", "Accesses", "Relevance"]);
    for (id, node) in context.nodes() {
        let node = node.read();
        nodes.add_row(vec![
            if context.is_focus(id) { "*" } else { "" }.to_string(),
            id.clone(),
            node.display_name(),
            node.labels.join(":"),
            format!("{:.2}", node.metadata.priority),
            node.metadata.access_count.to_string(),
            format!("{:.2}", node.metadata.relevance_score),
        ]);
    }
    output.push('\n');
    output.push_str(&nodes.to_string());

    let edges: Vec<String> = context
        .relationships()
        .values()
        .flat_map(|by_type| by_type.values().flatten())
        .map(|edge| format!("  - {}", edge.alt_text))
        .collect();
    if !edges.is_empty() {
        output.push_str(&format!("\n\nRelationships ({}):\n{}", edges.len(), edges.join("\n")));
    }
    Ok(output)
}

pub fn format_switch_result(context: &Context, format: OutputFormat) -> Result<String, PathfinderError> {
    if format == OutputFormat::Json {
        return to_json(&ContextSummary::of(context, Some(&context.id)), "context");
    }
    Ok(format!("Switched to {}", context))
}

pub fn format_import_report(report: &ImportReport, format: OutputFormat) -> Result<String, PathfinderError> {
    if format == OutputFormat::Json {
        return to_json(report, "import report");
    }
    Ok(format!(
        "Imported {} nodes ({} rows skipped)",
        report.imported, report.failed
    ))
}

/// The visualization payload is JSON regardless of the requested format.
pub fn format_visualization(view: &Visualization) -> Result<String, PathfinderError> {
    to_json(view, "visualization")
}
