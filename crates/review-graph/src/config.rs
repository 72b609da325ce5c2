//! Executor configuration
//!
//! Model selection, the per-call generation bound, and how many branch
//! nodes may run at once.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "codellama";

/// Default bound on a single text-generation call.
pub const DEFAULT_NODE_TIMEOUT: Duration = Duration::from_secs(120);

/// Pipeline executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Model identifier passed to the text generator
    pub model: String,

    /// Timeout for a single text-generation call
    #[serde(with = "humantime_serde")]
    pub node_timeout: Duration,

    /// Maximum concurrent node computations within a wave
    pub parallelism: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            node_timeout: DEFAULT_NODE_TIMEOUT,
            parallelism: num_cpus::get(),
        }
    }
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_node_timeout(mut self, timeout: Duration) -> Self {
        self.node_timeout = timeout;
        self
    }

    /// Set parallelism level (at least 1)
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }
}
