//! Report rendering
//!
//! Lists each node of the active graph in declared order under its fixed
//! label. Unset fields render as empty text; nodes outside the graph are
//! left out entirely.

use serde::Serialize;

use crate::graph::PipelineGraph;
use crate::state::ReviewState;

/// Printed alone when there was nothing to review.
pub const NO_CHANGES_MESSAGE: &str = "No changes to review.";

/// One rendered report entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackEntry<'a> {
    pub node: &'a str,
    pub field: &'a str,
    pub label: &'a str,
    /// `None` when the node never wrote its field.
    pub text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    graph: &'a str,
    feedback: Vec<FeedbackEntry<'a>>,
}

/// Report entries for the graph's nodes, in declared order.
pub fn entries<'a>(graph: &'a PipelineGraph, state: &'a ReviewState) -> Vec<FeedbackEntry<'a>> {
    graph
        .nodes()
        .iter()
        .map(|node| {
            let field = node.field();
            FeedbackEntry {
                node: node.name(),
                field: field.name(),
                label: field.label(),
                text: state.get(field),
            }
        })
        .collect()
}

/// Human-readable report.
pub fn render_text(graph: &PipelineGraph, state: &ReviewState) -> String {
    entries(graph, state)
        .iter()
        .map(|entry| format!("{}\n{}", entry.label, entry.text.unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// JSON report with the same entries and ordering as [`render_text`].
pub fn render_json(graph: &PipelineGraph, state: &ReviewState) -> Result<String, serde_json::Error> {
    let report = JsonReport {
        graph: graph.name(),
        feedback: entries(graph, state),
    };
    serde_json::to_string_pretty(&report)
}
