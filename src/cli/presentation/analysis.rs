//! Analysis presentation: pattern reports and context comparison.

use super::shared::table;
use crate::analysis::{ContextComparison, PatternReport};
use crate::cli::output::to_json;
use crate::cli::parse::OutputFormat;
use crate::error::PathfinderError;

pub fn format_pattern_report(report: &PatternReport, format: OutputFormat) -> Result<String, PathfinderError> {
    if format == OutputFormat::Json {
        return to_json(report, "pattern report");
    }
    if report.is_empty() {
        return Ok("No recorded transitions to analyze.".to_string());
    }

    let mut sections = Vec::new();

    let mut transitions = table(vec!["From", "To", "Count"]);
    for t in &report.common_transitions {
        transitions.add_row(vec![t.from.clone(), t.to.clone(), t.count.to_string()]);
    }
    sections.push(format!("Common transitions:\n{}", transitions));

    let mut visits = table(vec!["Context", "Visits"]);
    for v in &report.frequent_contexts {
        visits.add_row(vec![v.id.clone(), v.visits.to_string()]);
    }
    sections.push(format!("Frequent contexts:\n{}", visits));

    if report.cycles.is_empty() {
        sections.push("Cycles: none".to_string());
    } else {
        let lines: Vec<String> = report
            .cycles
            .iter()
            .map(|c| format!("  - {} (length {}): {}", c.path_name, c.cycle_length, c.contexts.join(" -> ")))
            .collect();
        sections.push(format!("Cycles ({}):\n{}", lines.len(), lines.join("\n")));
    }

    Ok(sections.join("\n\n"))
}

pub fn format_comparison(comparison: &ContextComparison, format: OutputFormat) -> Result<String, PathfinderError> {
    if format == OutputFormat::Json {
        return to_json(comparison, "context comparison");
    }

    let mut output = format!(
        "{}\nSimilarity: {:.2}\n",
        comparison.accessibility_summary, comparison.similarity_score
    );
    if comparison.priority_differences.is_empty() {
        output.push_str("No significant priority differences.");
        return Ok(output);
    }
    let mut diffs = table(vec![
        "Node ID".to_string(),
        "Name".to_string(),
        comparison.context1.name.clone(),
        comparison.context2.name.clone(),
        "Difference".to_string(),
    ]);
    for d in &comparison.priority_differences {
        diffs.add_row(vec![
            d.node_id.clone(),
            d.name.clone(),
            format!("{:.2}", d.ctx1_priority),
            format!("{:.2}", d.ctx2_priority),
            format!("{:.2}", d.difference),
        ]);
    }
    output.push_str(&diffs.to_string());
    Ok(output)
}
