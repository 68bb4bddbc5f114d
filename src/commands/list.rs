use anyhow::Result;

use crate::traits::GitOperations;

/// Prints `git worktree list` for the current repository
///
/// # Errors
/// Returns an error if the repository cannot be opened or git fails.
pub fn list_worktrees() -> Result<()> {
    let (git_repo, _storage) = super::open_current()?;
    println!("{}", listing_with_git(&git_repo)?);
    Ok(())
}

/// The listing exactly as git prints it, minus trailing whitespace
///
/// # Errors
/// Returns an error if `git worktree list` fails.
pub fn listing_with_git(git: &dyn GitOperations) -> Result<String> {
    Ok(git.worktree_list()?.trim_end().to_string())
}
