//! Thin wrappers over the `git` binary.
//!
//! Clone variants match the pinning modes a package identifier can carry:
//! a shallow clone by default, a shallow single-branch clone for a pinned
//! branch, and a full clone followed by a hard reset for a pinned commit.

use std::path::Path;
use std::process::Command;

use crate::error::InstallError;

/// `git clone --depth 1 <url> <dest>`.
///
/// # Errors
///
/// Returns [`InstallError::Subprocess`] when git exits nonzero.
pub fn clone_shallow(url: &str, dest: &Path) -> Result<(), InstallError> {
    run_git(None, &["clone", "--depth", "1", url, &dest.to_string_lossy(), "-q"])
}

/// `git clone --depth 1 -b <branch> <url> <dest>`.
///
/// # Errors
///
/// Returns [`InstallError::Subprocess`] when git exits nonzero.
pub fn clone_branch(url: &str, dest: &Path, branch: &str) -> Result<(), InstallError> {
    run_git(
        None,
        &["clone", "--depth", "1", url, &dest.to_string_lossy(), "-q", "-b", branch],
    )
}

/// Full clone, for checkouts that will be reset to an arbitrary commit.
///
/// # Errors
///
/// Returns [`InstallError::Subprocess`] when git exits nonzero.
pub fn clone_full(url: &str, dest: &Path) -> Result<(), InstallError> {
    run_git(None, &["clone", url, &dest.to_string_lossy(), "-q"])
}

/// `git reset --hard [<ref>]` inside `dir`.
///
/// # Errors
///
/// Returns [`InstallError::Subprocess`] when git exits nonzero.
pub fn hard_reset(dir: &Path, reference: Option<&str>) -> Result<(), InstallError> {
    match reference {
        Some(r) => run_git(Some(dir), &["reset", "--hard", r, "-q"]),
        None => run_git(Some(dir), &["reset", "--hard", "-q"]),
    }
}

/// `git pull` inside `dir`.
///
/// # Errors
///
/// Returns [`InstallError::Subprocess`] when git exits nonzero.
pub fn pull(dir: &Path) -> Result<(), InstallError> {
    run_git(Some(dir), &["pull", "-q"])
}

fn run_git(cwd: Option<&Path>, args: &[&str]) -> Result<(), InstallError> {
    tracing::debug!("git {}", args.join(" "));

    let mut cmd = Command::new("git");
    // Fail on missing credentials instead of prompting; a hung subprocess
    // hangs the whole command.
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let status = cmd.status().map_err(|e| InstallError::Subprocess {
        command: format!("git {}", args.join(" ")),
        code: e.raw_os_error().unwrap_or(-1),
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(InstallError::Subprocess {
            command: format!("git {}", args.join(" ")),
            code: status.code().unwrap_or(-1),
        })
    }
}
