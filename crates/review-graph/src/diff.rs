//! Diff source
//!
//! Turns a user-supplied selector into diff text. The selector is tokenized
//! with POSIX shell-word rules and handed to `git` as an argument vector; it
//! never reaches a shell.

use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::ReviewError;

/// Which changes to review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSelector {
    /// Index vs HEAD (`git diff --cached`).
    Staged,
    /// Anything else `git diff` accepts as revisions or paths, pre-tokenized.
    Revisions(Vec<String>),
}

impl DiffSelector {
    /// Parse a raw selector such as `staged`, `HEAD~1`, `HEAD~3..HEAD` or
    /// `main -- src/`.
    ///
    /// Rejects empty input, unbalanced quotes, NUL bytes and any token that
    /// looks like an option (except the bare `--` path separator).
    pub fn parse(raw: &str) -> Result<Self, ReviewError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ReviewError::invalid_selector(raw, "selector is empty"));
        }
        if trimmed.contains('\0') {
            return Err(ReviewError::invalid_selector(raw, "selector contains a NUL byte"));
        }
        if trimmed == "staged" {
            return Ok(Self::Staged);
        }

        let tokens = shell_words::split(trimmed)
            .map_err(|e| ReviewError::invalid_selector(raw, e.to_string()))?;

        if tokens.is_empty() {
            return Err(ReviewError::invalid_selector(raw, "selector is empty"));
        }
        if let Some(option) = tokens.iter().find(|t| t.starts_with('-') && t.as_str() != "--") {
            return Err(ReviewError::invalid_selector(
                raw,
                format!("option-like token '{}' is not allowed", option),
            ));
        }

        Ok(Self::Revisions(tokens))
    }

    /// Arguments for `git`.
    pub fn git_args(&self) -> Vec<String> {
        match self {
            DiffSelector::Staged => vec!["diff".to_string(), "--cached".to_string()],
            DiffSelector::Revisions(tokens) => {
                let mut args = vec!["diff".to_string()];
                args.extend(tokens.iter().cloned());
                args
            }
        }
    }
}

/// Supplies diff text for a selector. Empty text means nothing to show.
pub trait DiffSource: Send + Sync {
    fn get_diff(&self, selector: &DiffSelector) -> Result<String, ReviewError>;
}

/// Diff source backed by the `git` command line.
#[derive(Debug, Clone, Default)]
pub struct GitDiffSource {
    repo: Option<PathBuf>,
}

impl GitDiffSource {
    /// Use the current working directory's repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run git inside a specific repository.
    pub fn in_repo(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: Some(repo.into()),
        }
    }
}

impl DiffSource for GitDiffSource {
    fn get_diff(&self, selector: &DiffSelector) -> Result<String, ReviewError> {
        let args = selector.git_args();
        debug!(args = ?args, "Running git");

        let mut command = Command::new("git");
        command.args(&args);
        if let Some(repo) = &self.repo {
            command.current_dir(repo);
        }

        let output = command
            .output()
            .map_err(|e| ReviewError::DiffSource(format!("failed to execute git diff: {}", e)))?;

        if !output.status.success() {
            return Err(ReviewError::DiffSource(format!(
                "git diff failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // Surrounding whitespace would land inside every prompt's diff fence.
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Fixed diff text, for driving the pipeline without a repository.
#[derive(Debug, Clone, Default)]
pub struct StaticDiffSource {
    diff: String,
}

impl StaticDiffSource {
    pub fn new(diff: impl Into<String>) -> Self {
        Self { diff: diff.into() }
    }
}

impl DiffSource for StaticDiffSource {
    fn get_diff(&self, _selector: &DiffSelector) -> Result<String, ReviewError> {
        Ok(self.diff.clone())
    }
}
