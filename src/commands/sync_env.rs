use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::WorktreeConfig;
use crate::env_sync::copy_env_files;
use crate::error::WorktreeError;
use crate::git::query::list_worktree_paths;
use crate::storage::WorktreeStorage;
use crate::traits::GitOperations;

/// Which worktrees receive the current worktree's env files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget<'a> {
    /// The sibling worktree `../<dir>`
    Dir(&'a str),
    /// Every registered worktree except the current one
    All,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub targets: Vec<PathBuf>,
    pub files: usize,
}

/// Copies env files from the worktree containing the current directory
///
/// # Errors
/// See [`sync_env_with_git`].
pub fn sync_env(target: SyncTarget<'_>) -> Result<SyncReport> {
    let (git_repo, storage) = super::open_current()?;
    sync_env_with_git(&git_repo, &storage, target)
}

/// Test version that accepts a mock git repository
///
/// # Errors
/// Returns an error if:
/// - The `--to` worktree doesn't exist
/// - The worktree listing cannot be read
/// - Copying into any target fails; earlier targets keep their copies
pub fn sync_env_with_git(
    git: &dyn GitOperations,
    storage: &WorktreeStorage,
    target: SyncTarget<'_>,
) -> Result<SyncReport> {
    let source = storage.current_root();
    let targets = resolve_targets(git, storage, target)?;

    if targets.is_empty() {
        println!("No target worktrees found");
        return Ok(SyncReport::default());
    }

    let config = WorktreeConfig::load_from_repo(storage.main_root())?;

    println!("Syncing .env files from current worktree...");
    let mut files = 0;
    for target_path in &targets {
        println!("\nTo: {}", target_path.display());
        files += copy_env_files(source, target_path, &config)?;
    }

    println!(
        "\nDone syncing {} .env file(s) to {} worktree(s)",
        files,
        targets.len()
    );

    Ok(SyncReport { targets, files })
}

fn resolve_targets(
    git: &dyn GitOperations,
    storage: &WorktreeStorage,
    target: SyncTarget<'_>,
) -> Result<Vec<PathBuf>> {
    match target {
        SyncTarget::Dir(dir) => {
            let path = storage.get_worktree_path(dir)?;
            if !path.exists() {
                return Err(WorktreeError::NotFound { path }.into());
            }
            Ok(vec![path])
        }
        SyncTarget::All => Ok(list_worktree_paths(git)?
            .into_iter()
            .filter(|path| {
                let present = path.exists();
                if !present {
                    log::debug!("Skipping missing worktree {}", path.display());
                }
                present && !is_same_dir(path, storage.current_root())
            })
            .collect()),
    }
}

fn is_same_dir(path: &Path, root: &Path) -> bool {
    dunce::canonicalize(path).is_ok_and(|resolved| resolved == root)
}
