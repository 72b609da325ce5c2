//! Pipeline executor
//!
//! Walks a validated [`PipelineGraph`] wave by wave against one
//! [`ReviewState`]:
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌─────────────┐   ┌──────────────────────┐
//! │  wave 0  │ → │  wave 1  │ → │   wave 2    │ → │        wave 3        │
//! │summarize │   │ critique │   │ suggestions │   │ branches (concurrent)│
//! └──────────┘   └──────────┘   └─────────────┘   └──────────────────────┘
//!      Per wave: Compute → Collect (declared order) → Apply → next wave
//! ```
//!
//! A node is only started once every predecessor's write has been applied.
//! Branch nodes read only the diff and write disjoint fields, so running
//! them concurrently yields the same state as running them one by one. Any
//! generation failure aborts the run; there is no retry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument};

use crate::config::ExecutorConfig;
use crate::error::ReviewError;
use crate::graph::PipelineGraph;
use crate::llm::TextGenerator;
use crate::node::{AgentVertex, NodeOutput, ReviewNode};
use crate::state::ReviewState;

/// Result of reviewing one diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The diff was empty or whitespace-only; no node ran.
    NoChanges,
    /// The pipeline ran to completion.
    Reviewed(ReviewState),
}

/// Bookkeeping for a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Nodes that called the text generator, in wave order.
    pub executed: Vec<ReviewNode>,
    /// Nodes whose predicate was false and wrote their skip message.
    pub skipped: Vec<ReviewNode>,
    pub elapsed: Duration,
}

/// Runs pipeline graphs with an injected text generator.
pub struct PipelineExecutor {
    generator: Arc<dyn TextGenerator>,
    config: ExecutorConfig,
}

impl PipelineExecutor {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ExecutorConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Review a diff: short-circuits on an empty diff, otherwise builds a
    /// fresh state and runs the graph over it.
    pub async fn review(
        &self,
        graph: &PipelineGraph,
        diff: impl Into<String>,
    ) -> Result<ReviewOutcome, ReviewError> {
        let Some(mut state) = ReviewState::for_diff(diff) else {
            info!("Diff is empty, nothing to review");
            return Ok(ReviewOutcome::NoChanges);
        };

        self.run(graph, &mut state).await?;
        Ok(ReviewOutcome::Reviewed(state))
    }

    /// Execute every node of the graph exactly once against `state`.
    ///
    /// The state is borrowed exclusively for the whole run. On failure the
    /// fields written by completed nodes remain in `state`, but the run is
    /// over: later waves never start.
    #[instrument(skip_all, fields(graph = %graph.name(), model = %self.config.model))]
    pub async fn run(
        &self,
        graph: &PipelineGraph,
        state: &mut ReviewState,
    ) -> Result<RunSummary, ReviewError> {
        let started = Instant::now();
        let diff: Arc<str> = Arc::from(state.diff());
        let model: Arc<str> = Arc::from(self.config.model.as_str());

        let mut executed = Vec::new();
        let mut skipped = Vec::new();

        info!(
            nodes = graph.nodes().len(),
            waves = graph.waves().len(),
            diff_bytes = diff.len(),
            "Starting review pipeline"
        );

        for (index, wave) in graph.waves().iter().enumerate() {
            debug!(wave = index, nodes = ?wave, "Running wave");

            if let Some(node) = wave.iter().find(|node| state.is_set(node.field())) {
                return Err(ReviewError::StateConflict {
                    field: node.field(),
                });
            }

            let results = self.run_wave(wave, &diff, &model).await;

            let mut updates = Vec::with_capacity(results.len());
            let mut failure = None;
            for result in results {
                match result {
                    Ok(NodeOutput {
                        node,
                        update,
                        skipped: was_skipped,
                    }) => {
                        if was_skipped {
                            skipped.push(node);
                        } else {
                            executed.push(node);
                        }
                        updates.push(update);
                    }
                    Err(e) => {
                        if failure.is_none() {
                            failure = Some(e);
                        }
                    }
                }
            }

            state.apply_updates(updates)?;

            if let Some(e) = failure {
                error!(wave = index, error = %e, "Review pipeline aborted");
                return Err(e);
            }
        }

        let summary = RunSummary {
            executed,
            skipped,
            elapsed: started.elapsed(),
        };

        info!(
            executed = summary.executed.len(),
            skipped = summary.skipped.len(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Review pipeline finished"
        );

        Ok(summary)
    }

    /// Compute one wave. Results come back in the wave's declared order.
    async fn run_wave(
        &self,
        wave: &[ReviewNode],
        diff: &Arc<str>,
        model: &Arc<str>,
    ) -> Vec<Result<NodeOutput, ReviewError>> {
        if let [node] = wave {
            return vec![self.vertex(*node, model).compute(diff).await];
        }

        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let handles: Vec<_> = wave
            .iter()
            .map(|node| {
                let vertex = self.vertex(*node, model);
                let diff = Arc::clone(diff);
                let semaphore = Arc::clone(&semaphore);

                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| ReviewError::TaskJoin(e.to_string()))?;
                    vertex.compute(&diff).await
                })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap_or_else(|e| Err(ReviewError::TaskJoin(e.to_string()))))
            .collect()
    }

    fn vertex(&self, node: ReviewNode, model: &Arc<str>) -> AgentVertex {
        AgentVertex::new(
            node,
            Arc::clone(&self.generator),
            Arc::clone(model),
            self.config.node_timeout,
        )
    }
}
