//! # Pre-commit Hook Installation
//!
//! Writes the bundled `scripts/pre-commit.sh` into the repository's hooks
//! directory so every commit gets an advisory review of its staged changes.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// The hook script, embedded at build time.
pub const PRE_COMMIT_SCRIPT: &str = include_str!("../scripts/pre-commit.sh");

const HOOK_NAME: &str = "pre-commit";

/// Install the pre-commit hook into the repository at `repo`.
///
/// Returns the path of the installed hook. An existing hook is overwritten.
pub fn install_prehook(repo: &Path) -> Result<PathBuf> {
    let hooks_dir = hooks_dir(repo)?;
    fs::create_dir_all(&hooks_dir)
        .with_context(|| format!("failed to create hooks directory {}", hooks_dir.display()))?;

    let hook_path = hooks_dir.join(HOOK_NAME);
    if hook_path.exists() {
        warn!(path = %hook_path.display(), "Overwriting existing pre-commit hook");
    }

    fs::write(&hook_path, PRE_COMMIT_SCRIPT)
        .with_context(|| format!("failed to write {}", hook_path.display()))?;
    make_executable(&hook_path)?;

    info!(path = %hook_path.display(), "Pre-commit hook installed");
    Ok(hook_path)
}

/// Resolve the hooks directory, honouring worktrees and `core.hooksPath`.
///
/// Falls back to `<repo>/.git/hooks` when git itself cannot be run.
fn hooks_dir(repo: &Path) -> Result<PathBuf> {
    let output = match Command::new("git")
        .arg("rev-parse")
        .arg("--git-path")
        .arg("hooks")
        .current_dir(repo)
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            debug!(error = %e, "git unavailable, using default hooks directory");
            return Ok(repo.join(".git").join("hooks"));
        }
    };

    if !output.status.success() {
        bail!(
            "{} is not a git repository: {}",
            repo.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let resolved = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
    if resolved.is_absolute() {
        Ok(resolved)
    } else {
        Ok(repo.join(resolved))
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o775))
        .with_context(|| format!("failed to mark {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
