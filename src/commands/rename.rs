use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::remove::ensure_safe_to_move;
use crate::error::WorktreeError;
use crate::git::query::is_main_repository_root;
use crate::storage::WorktreeStorage;
use crate::traits::GitOperations;

/// Moves the worktree at `../<old_dir>` to `../<new_dir>` and repairs git's
/// registration of it
///
/// # Errors
/// See [`rename_worktree_with_git`].
pub fn rename_worktree(old_dir: &str, new_dir: &str) -> Result<PathBuf> {
    let (git_repo, storage) = super::open_current()?;
    rename_worktree_with_git(&git_repo, &storage, old_dir, new_dir)
}

/// Test version that accepts a mock git repository
///
/// Returns the absolute path of the renamed worktree. If the repair step
/// fails the directory is moved back to `old_dir` before the error is
/// returned.
///
/// # Errors
/// Returns an error if:
/// - The old worktree doesn't exist or the new path is taken
/// - The old worktree is the main repository
/// - The old worktree has uncommitted changes or unpushed commits
/// - The directory cannot be moved
/// - `git worktree repair` fails
pub fn rename_worktree_with_git(
    git: &dyn GitOperations,
    storage: &WorktreeStorage,
    old_dir: &str,
    new_dir: &str,
) -> Result<PathBuf> {
    let old_path = storage.get_worktree_path(old_dir)?;
    let new_path = storage.get_worktree_path(new_dir)?;

    if !old_path.exists() {
        return Err(WorktreeError::NotFound { path: old_path }.into());
    }

    if new_path.exists() {
        return Err(WorktreeError::AlreadyExists { path: new_path }.into());
    }

    if is_main_repository_root(storage, &old_path)? {
        return Err(WorktreeError::ProtectedPath {
            action: "rename",
            path: old_path,
        }
        .into());
    }

    ensure_safe_to_move(git, &old_path, "rename")?;

    let created_parent = new_path.parent().and_then(topmost_missing_dir);
    if let Some(parent) = new_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    if let Err(e) = fs::rename(&old_path, &new_path) {
        remove_created_parents(&new_path, created_parent.as_deref());
        return Err(e).with_context(|| {
            format!(
                "Failed to move {} to {}",
                old_path.display(),
                new_path.display()
            )
        });
    }

    // git stores absolute gitdir links, so repair with the resolved path
    let resolved = dunce::canonicalize(&new_path)?;
    if let Err(e) = git.repair_worktree(&resolved) {
        log::debug!("Repair failed, moving {} back", new_path.display());
        if let Err(rollback) = fs::rename(&new_path, &old_path) {
            eprintln!(
                "Warning: could not move {} back to {}: {}",
                new_path.display(),
                old_path.display(),
                rollback
            );
        } else {
            remove_created_parents(&new_path, created_parent.as_deref());
        }
        return Err(e);
    }

    println!("Renamed worktree from {} to {}", old_dir, new_dir);
    Ok(resolved)
}

/// Highest ancestor of `dir` that does not exist yet, i.e. the first
/// directory `create_dir_all(dir)` would create
fn topmost_missing_dir(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .take_while(|ancestor| !ancestor.exists())
        .last()
        .map(Path::to_path_buf)
}

/// Removes the empty directories between `new_path` and `created`, inclusive
fn remove_created_parents(new_path: &Path, created: Option<&Path>) {
    let (Some(created), Some(parent)) = (created, new_path.parent()) else {
        return;
    };
    for dir in parent.ancestors() {
        if let Err(e) = fs::remove_dir(dir) {
            log::debug!("Leaving {} in place: {}", dir.display(), e);
            break;
        }
        if dir == created {
            break;
        }
    }
}
