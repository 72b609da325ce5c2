//! Agent nodes
//!
//! Every review agent follows one template:
//!
//! 1. an applicability predicate over the raw diff (pure, case-sensitive
//!    substring checks),
//! 2. a prompt built from a fixed instruction and the verbatim diff,
//! 3. exactly one text-generation call when applicable, whose trimmed
//!    response is written to the node's own field.
//!
//! A node whose predicate is false writes its fixed skip message instead and
//! never calls the generator. Skips are normal results, not errors.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::ReviewError;
use crate::llm::{GenerationError, TextGenerator};
use crate::prompts::ReviewPrompts;
use crate::state::{ReviewField, ReviewUpdate};

/// The nodes of the review pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewNode {
    Summarize,
    Critique,
    Suggestions,
    Security,
    Architecture,
    TestCoverage,
    Ui,
    Dependency,
    Performance,
    Readability,
}

/// When a node's concern is relevant to a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    Always,
    /// Applicable when any keyword appears in the diff; otherwise the skip
    /// message is written.
    AnyKeyword {
        keywords: &'static [&'static str],
        skip_message: &'static str,
    },
}

impl Applicability {
    pub fn is_applicable(&self, diff: &str) -> bool {
        match self {
            Applicability::Always => true,
            Applicability::AnyKeyword { keywords, .. } => keywords.iter().any(|k| diff.contains(k)),
        }
    }

    pub fn skip_message(&self) -> Option<&'static str> {
        match self {
            Applicability::Always => None,
            Applicability::AnyKeyword { skip_message, .. } => Some(skip_message),
        }
    }
}

pub const TEST_COVERAGE_SKIP: &str = "Skipped: No test files modified.";
pub const UI_SKIP: &str = "Skipped: No Compose or XML UI changes found.";
pub const DEPENDENCY_SKIP: &str = "Skipped: No dependencies updated.";

impl ReviewNode {
    /// The strictly ordered spine.
    pub const SPINE: [ReviewNode; 3] = [
        ReviewNode::Summarize,
        ReviewNode::Critique,
        ReviewNode::Suggestions,
    ];

    /// Branch nodes in declared order.
    pub const BRANCHES: [ReviewNode; 7] = [
        ReviewNode::Security,
        ReviewNode::Architecture,
        ReviewNode::TestCoverage,
        ReviewNode::Ui,
        ReviewNode::Dependency,
        ReviewNode::Performance,
        ReviewNode::Readability,
    ];

    pub const ALL: [ReviewNode; 10] = [
        ReviewNode::Summarize,
        ReviewNode::Critique,
        ReviewNode::Suggestions,
        ReviewNode::Security,
        ReviewNode::Architecture,
        ReviewNode::TestCoverage,
        ReviewNode::Ui,
        ReviewNode::Dependency,
        ReviewNode::Performance,
        ReviewNode::Readability,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReviewNode::Summarize => "summarize",
            ReviewNode::Critique => "critique",
            ReviewNode::Suggestions => "suggestions",
            ReviewNode::Security => "security",
            ReviewNode::Architecture => "architecture",
            ReviewNode::TestCoverage => "test_coverage",
            ReviewNode::Ui => "ui",
            ReviewNode::Dependency => "dependency",
            ReviewNode::Performance => "performance",
            ReviewNode::Readability => "readability",
        }
    }

    /// The single state field this node writes.
    pub fn field(&self) -> ReviewField {
        match self {
            ReviewNode::Summarize => ReviewField::Summary,
            ReviewNode::Critique => ReviewField::Critique,
            ReviewNode::Suggestions => ReviewField::Suggestions,
            ReviewNode::Security => ReviewField::SecurityFeedback,
            ReviewNode::Architecture => ReviewField::ArchitectureFeedback,
            ReviewNode::TestCoverage => ReviewField::TestCoverageFeedback,
            ReviewNode::Ui => ReviewField::UiFeedback,
            ReviewNode::Dependency => ReviewField::DependencyFeedback,
            ReviewNode::Performance => ReviewField::PerformanceFeedback,
            ReviewNode::Readability => ReviewField::ReadabilityFeedback,
        }
    }

    pub fn is_spine(&self) -> bool {
        Self::SPINE.contains(self)
    }

    pub fn applicability(&self) -> Applicability {
        match self {
            ReviewNode::TestCoverage => Applicability::AnyKeyword {
                keywords: &["Test", "test"],
                skip_message: TEST_COVERAGE_SKIP,
            },
            ReviewNode::Ui => Applicability::AnyKeyword {
                keywords: &[".xml", "@Composable", "Modifier.", "remember"],
                skip_message: UI_SKIP,
            },
            ReviewNode::Dependency => Applicability::AnyKeyword {
                keywords: &["implementation", "dependency"],
                skip_message: DEPENDENCY_SKIP,
            },
            _ => Applicability::Always,
        }
    }

    pub fn is_applicable(&self, diff: &str) -> bool {
        self.applicability().is_applicable(diff)
    }

    pub fn prompt(&self, diff: &str) -> String {
        ReviewPrompts::build(*self, diff)
    }
}

impl fmt::Display for ReviewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReviewNode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|n| n.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|n| n.name()).collect();
                format!("unknown review node '{}' (expected one of: {})", wanted, known.join(", "))
            })
    }
}

/// What a node produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutput {
    pub node: ReviewNode,
    pub update: ReviewUpdate,
    pub skipped: bool,
}

/// Executable form of a node: the shared agent template bound to a generator.
#[derive(Clone)]
pub struct AgentVertex {
    node: ReviewNode,
    generator: Arc<dyn TextGenerator>,
    model: Arc<str>,
    timeout: Duration,
}

impl AgentVertex {
    pub fn new(
        node: ReviewNode,
        generator: Arc<dyn TextGenerator>,
        model: Arc<str>,
        timeout: Duration,
    ) -> Self {
        Self {
            node,
            generator,
            model,
            timeout,
        }
    }

    pub fn node(&self) -> ReviewNode {
        self.node
    }

    /// Run the node against a diff.
    ///
    /// Reads only the diff; the returned update targets this node's field.
    pub async fn compute(&self, diff: &str) -> Result<NodeOutput, ReviewError> {
        let node = self.node;
        let field = node.field();
        let applicability = node.applicability();

        if !applicability.is_applicable(diff) {
            let message = applicability.skip_message().unwrap_or_default();
            info!(node = %node, "Node not applicable, writing skip message");
            return Ok(NodeOutput {
                node,
                update: ReviewUpdate::new(field, message),
                skipped: true,
            });
        }

        let prompt = node.prompt(diff);
        debug!(
            node = %node,
            model = %self.model,
            provider = self.generator.name(),
            prompt_len = prompt.len(),
            "Invoking text generation"
        );

        let started = Instant::now();
        let response = match timeout(self.timeout, self.generator.generate(&self.model, &prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(generation_failure(node, e)),
            Err(_) => {
                return Err(ReviewError::GenerationTimeout {
                    node,
                    timeout: self.timeout,
                })
            }
        };

        info!(
            node = %node,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Node completed"
        );

        Ok(NodeOutput {
            node,
            update: ReviewUpdate::new(field, response.trim()),
            skipped: false,
        })
    }
}

fn generation_failure(node: ReviewNode, error: GenerationError) -> ReviewError {
    ReviewError::GenerationFailure {
        node,
        message: error.to_string(),
    }
}
