use anyhow::Result;
use std::path::{Path, PathBuf};

/// How `git worktree add` should obtain the branch for a new worktree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorktreeAddMode<'a> {
    /// Attach to a local branch that already exists
    Existing,
    /// Create a local branch tracking `upstream` (e.g. `origin/feature`)
    Track { upstream: &'a str },
    /// Create a brand-new branch from HEAD with no upstream
    NewBranch,
}

/// Trait for Git operations to enable mocking in tests
///
/// Every method maps to one git invocation. Methods returning raw text hand
/// back stdout untouched; interpretation lives in [`crate::git::query`].
pub trait GitOperations {
    /// Absolute top-level directory of the worktree containing `path`
    fn show_toplevel(&self, path: &Path) -> Result<PathBuf>;

    /// Refresh remote-tracking refs
    fn fetch(&self) -> Result<()>;

    fn local_branch_exists(&self, branch_name: &str) -> Result<bool>;

    fn remote_branch_exists(&self, remote: &str, branch_name: &str) -> Result<bool>;

    fn add_worktree(
        &self,
        worktree_path: &Path,
        branch_name: &str,
        mode: WorktreeAddMode<'_>,
    ) -> Result<()>;

    /// Raw `git worktree list` output
    fn worktree_list(&self) -> Result<String>;

    fn prune_worktrees(&self) -> Result<()>;

    fn repair_worktree(&self, worktree_path: &Path) -> Result<()>;

    /// Raw `git status --porcelain` output for the worktree at `path`
    fn status_porcelain(&self, path: &Path) -> Result<String>;

    /// Names of configured remotes, as seen from `path`
    fn remotes(&self, path: &Path) -> Result<Vec<String>>;

    /// Raw `git rev-list HEAD --not --remotes` output for the worktree at `path`
    fn unpushed_commits(&self, path: &Path) -> Result<String>;
}
