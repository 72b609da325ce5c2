//! Error types for the review pipeline
//!
//! Skipped nodes and empty diffs are not errors; everything here aborts the
//! whole pipeline run.

use std::time::Duration;

use thiserror::Error;

use crate::node::ReviewNode;
use crate::state::ReviewField;

/// Errors raised while validating a pipeline graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphBuildError {
    #[error("pipeline entry point not set")]
    NoEntryPoint,

    #[error("pipeline finish point not set")]
    NoFinishPoint,

    #[error("unknown node: {0}")]
    UnknownNode(ReviewNode),

    #[error("node declared twice: {0}")]
    DuplicateNode(ReviewNode),

    #[error("edge {from} -> {to} closes a cycle")]
    Cycle { from: ReviewNode, to: ReviewNode },

    #[error("node {0} is not reachable from the entry point")]
    Unreachable(ReviewNode),

    #[error("finish node {0} has outgoing edges")]
    FinishNotTerminal(ReviewNode),
}

/// Top-level pipeline error.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The text-generation call for a node failed.
    #[error("generation failed in node '{node}': {message}")]
    GenerationFailure { node: ReviewNode, message: String },

    /// The text-generation call for a node exceeded the configured bound.
    #[error("generation in node '{node}' timed out after {timeout:?}")]
    GenerationTimeout { node: ReviewNode, timeout: Duration },

    /// The diff selector could not be tokenized safely.
    #[error("invalid diff selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The version-control tool could not produce a diff.
    #[error("diff source error: {0}")]
    DiffSource(String),

    #[error("invalid pipeline graph: {0}")]
    Graph(#[from] GraphBuildError),

    /// A node tried to write a field that was already written this run.
    #[error("field '{field}' was already written in this run")]
    StateConflict { field: ReviewField },

    /// A spawned branch task panicked or was cancelled.
    #[error("node task failed to complete: {0}")]
    TaskJoin(String),
}

impl ReviewError {
    /// Create an invalid selector error
    pub fn invalid_selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// The node whose generation call failed, if this is a generation error.
    pub fn node(&self) -> Option<ReviewNode> {
        match self {
            ReviewError::GenerationFailure { node, .. }
            | ReviewError::GenerationTimeout { node, .. } => Some(*node),
            _ => None,
        }
    }

    /// Check if the error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReviewError::GenerationTimeout { .. })
    }
}
