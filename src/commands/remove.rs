use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::error::{UnsafeReason, WorktreeError};
use crate::git::query::{has_uncommitted_changes, has_unpushed_commits, is_main_repository_root};
use crate::storage::WorktreeStorage;
use crate::traits::GitOperations;

/// Recursive delete of a staged worktree still running in the background
///
/// Dropping the handle detaches the delete. [`PendingRemoval::wait`] blocks
/// until it has finished; delete failures are logged, never returned.
#[derive(Debug)]
#[must_use = "the staged copy is only guaranteed to be deleted if the handle is waited on"]
pub struct PendingRemoval {
    staged_path: PathBuf,
    handle: Option<JoinHandle<()>>,
}

impl PendingRemoval {
    /// Where the worktree was moved before deletion
    pub fn staged_path(&self) -> &Path {
        &self.staged_path
    }

    pub fn wait(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!(
                    "Background delete of {} panicked",
                    self.staged_path.display()
                );
            }
        }
    }
}

/// Removes the worktree at `../<dir_name>` after the safety checks pass
///
/// # Errors
/// See [`remove_worktree_with_git`].
pub fn remove_worktree(dir_name: &str) -> Result<PendingRemoval> {
    let (git_repo, storage) = super::open_current()?;
    remove_worktree_with_git(&git_repo, &storage, dir_name)
}

/// Test version that accepts a mock git repository
///
/// The directory is renamed out of place before this returns, so the
/// worktree is gone from git's listing even while the returned delete is
/// still running.
///
/// # Errors
/// Returns an error if:
/// - The worktree directory doesn't exist
/// - The directory is the main repository
/// - The worktree has uncommitted changes or unpushed commits
/// - The directory cannot be moved to a staging location
pub fn remove_worktree_with_git(
    git: &dyn GitOperations,
    storage: &WorktreeStorage,
    dir_name: &str,
) -> Result<PendingRemoval> {
    let worktree_path = storage.get_worktree_path(dir_name)?;

    if !worktree_path.exists() {
        return Err(WorktreeError::NotFound {
            path: worktree_path,
        }
        .into());
    }

    if is_main_repository_root(storage, &worktree_path)? {
        return Err(WorktreeError::ProtectedPath {
            action: "remove",
            path: worktree_path,
        }
        .into());
    }

    ensure_safe_to_move(git, &worktree_path, "remove")?;

    let staged_path = stage_for_removal(storage, &worktree_path, dir_name)?;
    log::debug!(
        "Staged {} at {}",
        worktree_path.display(),
        staged_path.display()
    );
    let handle = delete_in_background(staged_path.clone());

    if let Err(e) = git.prune_worktrees() {
        eprintln!("Warning: git worktree prune failed: {e:#}");
    }

    println!("Removed worktree: {}", dir_name);

    Ok(PendingRemoval {
        staged_path,
        handle,
    })
}

/// Refuses to move a worktree that would lose local work
///
/// Shared with rename, which applies the same checks in the same order.
pub(crate) fn ensure_safe_to_move(
    git: &dyn GitOperations,
    worktree_path: &Path,
    action: &'static str,
) -> Result<()> {
    if has_uncommitted_changes(git, worktree_path)? {
        return Err(WorktreeError::UnsafeState {
            action,
            reason: UnsafeReason::UncommittedChanges,
        }
        .into());
    }

    if has_unpushed_commits(git, worktree_path) {
        return Err(WorktreeError::UnsafeState {
            action,
            reason: UnsafeReason::UnpushedCommits,
        }
        .into());
    }

    Ok(())
}

/// Moves the worktree to the system temp dir, or next to the worktrees when
/// the temp dir is on another filesystem
fn stage_for_removal(
    storage: &WorktreeStorage,
    worktree_path: &Path,
    dir_name: &str,
) -> Result<PathBuf> {
    let temp_path = storage.temp_staging_path(dir_name);
    match fs::rename(worktree_path, &temp_path) {
        Ok(()) => return Ok(temp_path),
        Err(e) => log::debug!(
            "Cannot stage {} in temp dir ({e}); using local staging",
            worktree_path.display()
        ),
    }

    let local_path = storage.local_staging_path(dir_name);
    fs::rename(worktree_path, &local_path).with_context(|| {
        format!(
            "Failed to move {} out of the worktree area",
            worktree_path.display()
        )
    })?;
    Ok(local_path)
}

fn delete_in_background(staged_path: PathBuf) -> Option<JoinHandle<()>> {
    let path = staged_path.clone();
    let spawned = thread::Builder::new()
        .name("worktree-delete".to_string())
        .spawn(move || {
            if let Err(e) = fs::remove_dir_all(&path) {
                log::warn!("Failed to delete {}: {}", path.display(), e);
            }
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Could not start background delete ({e}); deleting inline");
            if let Err(e) = fs::remove_dir_all(&staged_path) {
                log::warn!("Failed to delete {}: {}", staged_path.display(), e);
            }
            None
        }
    }
}
