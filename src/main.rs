//! # Commit Review
//!
//! An LLM-powered commit reviewer. A diff is passed through a graph of
//! specialised agents running on a local Ollama model:
//! - `summarize → critique → suggestions` in strict order,
//! - then security, architecture, test coverage, UI, dependency,
//!   performance and readability branches, concurrently.
//!
//! ## Quick Start
//! ```bash
//! review commit                 # review HEAD~1
//! review staged                 # review what is about to be committed
//! review install-prehook        # run `review staged` before every commit
//! ```

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// Configuration management
mod config;

/// Pre-commit hook installation
mod hook;

// =============================================================================
// IMPORTS
// =============================================================================
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use review_graph::{
    render_json, render_text, GitDiffSource, OllamaGenerator, PipelineExecutor, PipelineGraph,
    ReviewNode, ReviewOutcome, ReviewPipeline, NO_CHANGES_MESSAGE,
};

use crate::config::{parse_branches, parse_timeout, Config};

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "review",
    version,
    about = "Review commits with a graph of local LLM agents",
    long_about = r#"
Commit Review - a second pair of eyes before you push.

Each review runs a summary, a critique and improvement suggestions, then
specialised security, architecture, test coverage, UI, dependency,
performance and readability reviews of the same diff.

PREREQUISITES:
  1. Install Ollama: https://ollama.ai
  2. Pull a model: ollama pull codellama
  3. Start Ollama: ollama serve

EXAMPLES:
  # Review the last commit
  review commit

  # Review a revision range with a different model
  review --model qwen2.5-coder commit --diff "main..feature"

  # Only the security and UI branches, as JSON
  review --branches security,ui --format json staged
"#
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// The Ollama model to use (overrides OLLAMA_MODEL)
    #[arg(short = 'm', long = "model", global = true)]
    model: Option<String>,

    /// Upper bound on each generation call, e.g. 90s or 2m (overrides REVIEW_TIMEOUT)
    #[arg(long = "timeout", global = true, value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Comma-separated branch nodes to run (overrides REVIEW_BRANCHES)
    #[arg(long = "branches", global = true)]
    branches: Option<String>,

    /// Maximum branches generating at once (overrides REVIEW_PARALLELISM)
    #[arg(long = "parallelism", global = true)]
    parallelism: Option<usize>,

    /// Report format written to stdout
    #[arg(long = "format", global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Review a commit or revision range
    Commit {
        /// Revision selector passed to `git diff`
        #[arg(long = "diff", default_value = "HEAD~1")]
        diff: String,
    },

    /// Review the staged changes
    Staged,

    /// Review test coverage of a diff (spine plus the test coverage branch)
    Coverage {
        #[arg(long = "diff", default_value = "staged")]
        diff: String,
    },

    /// Install the git pre-commit hook that reviews staged changes
    InstallPrehook {
        /// Repository to install into
        #[arg(long = "repo", default_value = ".")]
        repo: PathBuf,
    },

    /// Print the review graph as a Mermaid diagram
    Graph,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    if let Command::InstallPrehook { repo } = &args.command {
        let path = hook::install_prehook(repo)?;
        println!("✅ Pre-commit hook installed at {}", path.display());
        return Ok(());
    }

    let config = load_config(&args)?;

    match &args.command {
        Command::Commit { diff } => {
            info!("Running LLM commit review on diff: {}...", diff);
            review(&config, config.review_graph()?, diff, args.format).await
        }
        Command::Staged => {
            info!("Reviewing staged changes...");
            review(&config, config.review_graph()?, "staged", args.format).await
        }
        Command::Coverage { diff } => {
            info!("Checking test coverage on diff: {}...", diff);
            let graph = PipelineGraph::review(&[ReviewNode::TestCoverage])
                .context("Failed to build coverage graph")?;
            review(&config, graph, diff, args.format).await
        }
        Command::Graph => {
            println!("{}", config.review_graph()?.to_mermaid());
            Ok(())
        }
        Command::InstallPrehook { .. } => Ok(()),
    }
}

/// Environment first, then command-line overrides, then validation.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(model) = &args.model {
        info!(model = %model, "Using model from command line");
        config.model = model.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    if let Some(branches) = &args.branches {
        config.branches = parse_branches(branches).context("--branches is invalid")?;
    }
    if let Some(parallelism) = args.parallelism {
        config.parallelism = parallelism;
    }

    config.validate()?;

    info!(
        model = %config.model,
        host = %config.ollama_host,
        branches = config.branches.len(),
        "Configuration loaded"
    );

    Ok(config)
}

/// Run one pipeline invocation and print its report to stdout.
async fn review(
    config: &Config,
    graph: PipelineGraph,
    selector: &str,
    format: OutputFormat,
) -> Result<()> {
    let generator = Arc::new(OllamaGenerator::new(config.ollama_host.clone()));
    let executor = PipelineExecutor::new(generator, config.executor_config());
    let pipeline = ReviewPipeline::new(GitDiffSource::new(), executor, graph);

    let outcome = match pipeline.run(selector).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Review failed");
            if e.node().is_some() {
                eprintln!("\n💡 Tip: Make sure Ollama is running and the model is pulled:");
                eprintln!("   ollama serve && ollama pull {}", config.model);
            }
            return Err(e.into());
        }
    };

    match outcome {
        ReviewOutcome::NoChanges => println!("{}", NO_CHANGES_MESSAGE),
        ReviewOutcome::Reviewed(state) => {
            let report = match format {
                OutputFormat::Text => render_text(pipeline.graph(), &state),
                OutputFormat::Json => render_json(pipeline.graph(), &state)
                    .context("Failed to serialise review report")?,
            };
            println!("{}", report);
        }
    }

    info!("Review completed");
    Ok(())
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Initialize the tracing subscriber. Logs go to stderr; `RUST_LOG` wins
/// unless `--verbose` asks for debug output.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_defaults_to_previous_commit() {
        let args = Args::parse_from(["review", "commit"]);
        assert_eq!(
            args.command,
            Command::Commit {
                diff: "HEAD~1".to_string()
            }
        );
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.verbose);
    }

    #[test]
    fn test_coverage_defaults_to_staged() {
        let args = Args::parse_from(["review", "coverage"]);
        assert_eq!(
            args.command,
            Command::Coverage {
                diff: "staged".to_string()
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from([
            "review",
            "commit",
            "--diff",
            "main..feature",
            "--model",
            "llama3.2",
            "--timeout",
            "90s",
            "--branches",
            "security,ui",
            "--parallelism",
            "2",
            "--format",
            "json",
            "--verbose",
        ]);

        assert_eq!(
            args.command,
            Command::Commit {
                diff: "main..feature".to_string()
            }
        );
        assert_eq!(args.model.as_deref(), Some("llama3.2"));
        assert_eq!(args.timeout, Some(Duration::from_secs(90)));
        assert_eq!(args.branches.as_deref(), Some("security,ui"));
        assert_eq!(args.parallelism, Some(2));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.verbose);
    }

    #[test]
    fn test_install_prehook_repo_flag() {
        let args = Args::parse_from(["review", "install-prehook", "--repo", "/tmp/project"]);
        assert_eq!(
            args.command,
            Command::InstallPrehook {
                repo: PathBuf::from("/tmp/project")
            }
        );
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Args::try_parse_from(["review", "--format", "yaml", "staged"]).is_err());
    }

    #[test]
    fn test_rejects_bad_timeout() {
        assert!(Args::try_parse_from(["review", "--timeout", "later", "staged"]).is_err());
    }
}
