pub mod create;
pub mod find;
pub mod list;
pub mod remove;
pub mod rename;
pub mod sync_env;

use anyhow::Result;

use crate::git::GitRepo;
use crate::storage::WorktreeStorage;

/// Resolves the worktree layout of the repository containing the working
/// directory and opens git at its main repository
fn open_current() -> Result<(GitRepo, WorktreeStorage)> {
    let current_dir = std::env::current_dir()?;
    let storage = WorktreeStorage::discover(&GitRepo::open(&current_dir)?, &current_dir)?;

    // Repository-wide git calls run from the main repository; the worktree
    // the command started in may be moved away before prune or repair
    let git_repo = GitRepo::open(storage.main_root())?;
    Ok((git_repo, storage))
}
