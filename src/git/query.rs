//! Read-only questions the lifecycle commands ask before mutating anything.
//!
//! Each query is stateless: it takes the git collaborator and, where a path
//! must be interpreted, the explicit [`WorktreeStorage`] context.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::list::{WorktreeEntry, parse_worktree_list};
use crate::storage::WorktreeStorage;
use crate::traits::GitOperations;

/// Whether `path` is the main repository's working directory
///
/// # Errors
/// Returns an error if `path` cannot be resolved to an absolute path.
pub fn is_main_repository_root(storage: &WorktreeStorage, path: &Path) -> Result<bool> {
    let resolved = dunce::canonicalize(path)?;
    Ok(resolved == storage.main_root())
}

/// Whether the worktree at `path` has staged, unstaged, or untracked changes
///
/// # Errors
/// Returns an error if the status query fails.
pub fn has_uncommitted_changes(git: &dyn GitOperations, path: &Path) -> Result<bool> {
    let status = git.status_porcelain(path)?;
    Ok(status.lines().any(|line| !line.trim().is_empty()))
}

/// Whether HEAD of the worktree at `path` has commits no remote-tracking ref
/// contains
///
/// Never fails: with no remote configured, or when the query itself errors,
/// the answer is `false`.
pub fn has_unpushed_commits(git: &dyn GitOperations, path: &Path) -> bool {
    match git.remotes(path) {
        Ok(remotes) if remotes.is_empty() => {
            log::debug!("No remotes configured for {}; skipping unpushed check", path.display());
            return false;
        }
        Ok(_) => {}
        Err(e) => {
            log::debug!("Could not list remotes for {}: {e:#}", path.display());
            return false;
        }
    }

    match git.unpushed_commits(path) {
        Ok(output) => output.lines().any(|line| !line.trim().is_empty()),
        Err(e) => {
            log::warn!(
                "Unpushed-commit check failed for {}; treating as none: {e:#}",
                path.display()
            );
            false
        }
    }
}

/// Path of the worktree that has `branch` checked out, if any
///
/// # Errors
/// Returns an error if the worktree listing cannot be read or parsed.
pub fn is_branch_checked_out(git: &dyn GitOperations, branch: &str) -> Result<Option<PathBuf>> {
    Ok(list_worktrees(git)?
        .into_iter()
        .find(|entry| entry.branch() == Some(branch))
        .map(|entry| entry.path))
}

/// Every registered worktree, main repository first
///
/// # Errors
/// Returns an error if the worktree listing cannot be read or parsed.
pub fn list_worktrees(git: &dyn GitOperations) -> Result<Vec<WorktreeEntry>> {
    parse_worktree_list(&git.worktree_list()?)
}

/// Paths of every registered worktree
///
/// # Errors
/// Returns an error if the worktree listing cannot be read or parsed.
pub fn list_worktree_paths(git: &dyn GitOperations) -> Result<Vec<PathBuf>> {
    Ok(list_worktrees(git)?
        .into_iter()
        .map(|entry| entry.path)
        .collect())
}
