use anyhow::Result;

use crate::error::WorktreeError;
use crate::traits::GitOperations;

/// Prints the worktree listing lines containing `search`
///
/// # Errors
/// See [`find_worktrees_with_git`].
pub fn find_worktrees(search: Option<&str>) -> Result<()> {
    let (git_repo, _storage) = super::open_current()?;
    for line in find_worktrees_with_git(&git_repo, search)? {
        println!("{}", line);
    }
    Ok(())
}

/// Listing lines containing `search`, compared case-insensitively
///
/// Without a search term every non-blank line is returned.
///
/// # Errors
/// Returns an error if `git worktree list` fails or no line matches.
pub fn find_worktrees_with_git(
    git: &dyn GitOperations,
    search: Option<&str>,
) -> Result<Vec<String>> {
    let listing = git.worktree_list()?;
    let lines = listing.lines().filter(|line| !line.trim().is_empty());

    let Some(term) = search.filter(|s| !s.is_empty()) else {
        return Ok(lines.map(str::to_string).collect());
    };

    let needle = term.to_lowercase();
    let matches: Vec<String> = lines
        .filter(|line| line.to_lowercase().contains(&needle))
        .map(str::to_string)
        .collect();

    if matches.is_empty() {
        return Err(WorktreeError::NoMatch {
            term: term.to_string(),
        }
        .into());
    }

    Ok(matches)
}
