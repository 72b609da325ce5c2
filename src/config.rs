//! # Configuration Module
//!
//! Loads reviewer settings from the environment (and an optional `.env`
//! file), then lets command-line flags override them.
//!
//! | Variable              | Default                  |
//! |-----------------------|--------------------------|
//! | `OLLAMA_MODEL`        | `codellama`              |
//! | `OLLAMA_API_BASE_URL` | `http://localhost:11434` |
//! | `REVIEW_TIMEOUT`      | `120s`                   |
//! | `REVIEW_BRANCHES`     | all seven branches       |
//! | `REVIEW_PARALLELISM`  | number of CPUs           |

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::env;
use std::time::Duration;

use humantime_serde::re::humantime;
use review_graph::{
    ExecutorConfig, PipelineGraph, ReviewNode, DEFAULT_MODEL, DEFAULT_NODE_TIMEOUT,
    DEFAULT_OLLAMA_HOST,
};

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
/// Main configuration for the commit reviewer.
#[derive(Debug, Clone)]
pub struct Config {
    /// The Ollama model to use (e.g., "codellama", "qwen2.5-coder")
    pub model: String,

    /// Ollama server URL
    pub ollama_host: String,

    /// Upper bound on a single generation call
    pub timeout: Duration,

    /// Branch nodes attached after the spine, in declared order
    pub branches: Vec<ReviewNode>,

    /// Maximum number of branch nodes generating at once
    pub parallelism: usize,
}

impl Default for Config {
    fn default() -> Self {
        let executor = ExecutorConfig::default();
        Self {
            model: DEFAULT_MODEL.to_string(),
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            timeout: DEFAULT_NODE_TIMEOUT,
            branches: ReviewNode::BRANCHES.to_vec(),
            parallelism: executor.parallelism,
        }
    }
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup. Unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(val) = lookup("OLLAMA_MODEL") {
            config.model = val;
        }

        if let Some(val) = lookup("OLLAMA_API_BASE_URL") {
            config.ollama_host = val;
        }

        if let Some(val) = lookup("REVIEW_TIMEOUT") {
            config.timeout = parse_timeout(&val)
                .context("REVIEW_TIMEOUT must be a duration such as 90s or 2m")?;
        }

        if let Some(val) = lookup("REVIEW_BRANCHES") {
            config.branches = parse_branches(&val).context("REVIEW_BRANCHES is invalid")?;
        }

        if let Some(val) = lookup("REVIEW_PARALLELISM") {
            config.parallelism = val
                .trim()
                .parse()
                .context("REVIEW_PARALLELISM must be a valid positive integer")?;
        }

        Ok(config)
    }

    /// Validate the configuration before anything talks to Ollama.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            anyhow::bail!("OLLAMA_MODEL cannot be empty");
        }

        if self.timeout.is_zero() {
            anyhow::bail!("Review timeout must be greater than zero");
        }

        if self.parallelism == 0 {
            anyhow::bail!("REVIEW_PARALLELISM must be at least 1");
        }

        let mut seen = HashSet::new();
        for branch in &self.branches {
            if branch.is_spine() {
                anyhow::bail!("'{}' is part of the spine and cannot be a branch", branch);
            }
            if !seen.insert(*branch) {
                anyhow::bail!("Branch '{}' is listed more than once", branch);
            }
        }

        Ok(())
    }

    /// Executor settings derived from this configuration.
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig::new()
            .with_model(self.model.clone())
            .with_node_timeout(self.timeout)
            .with_parallelism(self.parallelism)
    }

    /// The full review graph for the configured branches.
    pub fn review_graph(&self) -> Result<PipelineGraph> {
        PipelineGraph::review(&self.branches).context("Failed to build review graph")
    }
}

/// Parse a humantime duration such as `90s`, `2m` or `1m 30s`.
pub fn parse_timeout(raw: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(raw.trim())
}

/// Parse a comma-separated list of node names. Blank entries are ignored.
pub fn parse_branches(raw: &str) -> Result<Vec<ReviewNode>> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.parse::<ReviewNode>().map_err(anyhow::Error::msg))
        .collect()
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.model, "codellama");
        assert_eq!(config.ollama_host, "http://localhost:11434");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.branches, ReviewNode::BRANCHES.to_vec());
        assert!(config.parallelism >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OLLAMA_MODEL", "qwen2.5-coder"),
            ("OLLAMA_API_BASE_URL", "http://gpu-box:11434"),
            ("REVIEW_TIMEOUT", "1m 30s"),
            ("REVIEW_BRANCHES", "security, ui,"),
            ("REVIEW_PARALLELISM", "2"),
        ]))
        .unwrap();

        assert_eq!(config.model, "qwen2.5-coder");
        assert_eq!(config.ollama_host, "http://gpu-box:11434");
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.branches, vec![ReviewNode::Security, ReviewNode::Ui]);
        assert_eq!(config.parallelism, 2);
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("REVIEW_TIMEOUT", "soon")])).is_err());
        assert!(Config::from_lookup(lookup(&[("REVIEW_PARALLELISM", "-1")])).is_err());
        assert!(Config::from_lookup(lookup(&[("REVIEW_BRANCHES", "security,lint")])).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_model() {
        let mut config = Config::default();
        config.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        let mut config = Config::default();
        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.parallelism = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_branches() {
        let mut config = Config::default();
        config.branches = vec![ReviewNode::Critique];
        assert!(config.validate().is_err());

        config.branches = vec![ReviewNode::Ui, ReviewNode::Ui];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_executor_config_carries_settings() {
        let mut config = Config::default();
        config.model = "llama3.2".to_string();
        config.timeout = Duration::from_secs(5);
        config.parallelism = 3;

        let executor = config.executor_config();
        assert_eq!(executor.model, "llama3.2");
        assert_eq!(executor.node_timeout, Duration::from_secs(5));
        assert_eq!(executor.parallelism, 3);
    }

    #[test]
    fn test_empty_branch_list_reviews_spine_only() {
        let mut config = Config::default();
        config.branches = parse_branches("").unwrap();

        let graph = config.review_graph().unwrap();
        assert_eq!(graph.nodes(), &ReviewNode::SPINE);
    }
}
