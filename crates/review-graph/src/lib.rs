//! review-graph: agent graph orchestration for LLM commit review
//!
//! A diff is reviewed by a chain of specialised agents over one shared
//! [`ReviewState`]:
//! - a strictly ordered spine (`summarize → critique → suggestions`),
//! - followed by independent branches (security, architecture, test
//!   coverage, UI, dependency, performance, readability) that may run
//!   concurrently,
//! - each gated by an applicability predicate over the diff.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use review_graph::{
//!     ExecutorConfig, GitDiffSource, OllamaGenerator, PipelineExecutor, PipelineGraph,
//!     ReviewOutcome, ReviewPipeline, render_text,
//! };
//!
//! let generator = Arc::new(OllamaGenerator::new("http://localhost:11434"));
//! let executor = PipelineExecutor::new(generator, ExecutorConfig::default());
//! let pipeline = ReviewPipeline::new(GitDiffSource::new(), executor, PipelineGraph::full_review()?);
//!
//! if let ReviewOutcome::Reviewed(state) = pipeline.run("HEAD~1").await? {
//!     println!("{}", render_text(pipeline.graph(), &state));
//! }
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod executor;
pub mod graph;
pub mod llm;
pub mod node;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod state;
pub mod visualization;

// Re-exports for convenience
pub use config::{ExecutorConfig, DEFAULT_MODEL, DEFAULT_NODE_TIMEOUT};
pub use diff::{DiffSelector, DiffSource, GitDiffSource, StaticDiffSource};
pub use error::{GraphBuildError, ReviewError};
pub use executor::{PipelineExecutor, ReviewOutcome, RunSummary};
pub use graph::{GraphEdge, PipelineGraph, PipelineGraphBuilder};
pub use llm::{GenerationError, OllamaGenerator, TextGenerator, DEFAULT_OLLAMA_HOST};
pub use node::{
    AgentVertex, Applicability, NodeOutput, ReviewNode, DEPENDENCY_SKIP, TEST_COVERAGE_SKIP,
    UI_SKIP,
};
pub use pipeline::ReviewPipeline;
pub use prompts::ReviewPrompts;
pub use report::{render_json, render_text, FeedbackEntry, NO_CHANGES_MESSAGE};
pub use state::{ReviewField, ReviewState, ReviewUpdate};
