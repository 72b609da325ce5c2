//! Review pipeline facade
//!
//! selector → diff source → review state → executor → outcome.

use tracing::info;

use crate::diff::{DiffSelector, DiffSource};
use crate::error::ReviewError;
use crate::executor::{PipelineExecutor, ReviewOutcome};
use crate::graph::PipelineGraph;

/// A diff source, an executor and the graph it runs.
pub struct ReviewPipeline<D: DiffSource> {
    source: D,
    executor: PipelineExecutor,
    graph: PipelineGraph,
}

impl<D: DiffSource> ReviewPipeline<D> {
    pub fn new(source: D, executor: PipelineExecutor, graph: PipelineGraph) -> Self {
        Self {
            source,
            executor,
            graph,
        }
    }

    pub fn graph(&self) -> &PipelineGraph {
        &self.graph
    }

    /// Review the changes named by `selector`.
    ///
    /// An invalid selector fails before any diff is fetched or node runs.
    pub async fn run(&self, selector: &str) -> Result<ReviewOutcome, ReviewError> {
        let selector = DiffSelector::parse(selector)?;
        let diff = self.source.get_diff(&selector)?;

        info!(
            selector = ?selector,
            diff_bytes = diff.len(),
            branches = ?self.graph.branches(),
            "Diff retrieved"
        );

        self.executor.review(&self.graph, diff).await
    }
}
