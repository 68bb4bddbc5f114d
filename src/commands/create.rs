use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::WorktreeConfig;
use crate::env_sync::copy_env_files;
use crate::error::WorktreeError;
use crate::git::query::is_branch_checked_out;
use crate::storage::WorktreeStorage;
use crate::traits::{GitOperations, WorktreeAddMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    /// Fetch, then pick local / tracking / new branch based on what exists
    Smart,
    /// Attach directly to an existing local branch, no fetch or detection
    Attach,
}

/// Where the branch of a new worktree came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSource {
    Local,
    RemoteOnly,
    New,
}

#[derive(Debug)]
pub struct CreateOutcome {
    pub path: PathBuf,
    pub branch: String,
    pub source: BranchSource,
    pub env_files_copied: usize,
}

/// Creates a worktree at `../<dir>` for `branch` and copies env files into it
///
/// Either name may be omitted; the missing one defaults to the other.
///
/// # Errors
/// See [`create_worktree_with_git`].
pub fn create_worktree(
    branch: Option<&str>,
    dir: Option<&str>,
    mode: CreateMode,
) -> Result<CreateOutcome> {
    let (git_repo, storage) = super::open_current()?;
    create_worktree_with_git(&git_repo, &storage, branch, dir, mode)
}

/// Test version that accepts a mock git repository
///
/// # Errors
/// Returns an error if:
/// - Neither a branch nor a directory name is given
/// - The branch is already checked out in another worktree
/// - The target directory already exists
/// - `git worktree add` fails
/// - Copying env files fails
pub fn create_worktree_with_git(
    git: &dyn GitOperations,
    storage: &WorktreeStorage,
    branch: Option<&str>,
    dir: Option<&str>,
    mode: CreateMode,
) -> Result<CreateOutcome> {
    let branch = branch.filter(|b| !b.is_empty());
    let dir = dir.filter(|d| !d.is_empty());
    let (branch, dir) = match (branch, dir) {
        (Some(branch), Some(dir)) => (branch, dir),
        (Some(name), None) | (None, Some(name)) => (name, name),
        (None, None) => {
            return Err(WorktreeError::MissingArgument { flag: "branchName" }.into());
        }
    };

    let worktree_path = storage.get_worktree_path(dir)?;

    if let Some(location) = is_branch_checked_out(git, branch)? {
        return Err(WorktreeError::AlreadyCheckedOut {
            branch: branch.to_string(),
            location,
        }
        .into());
    }

    if worktree_path.exists() {
        return Err(WorktreeError::AlreadyExists {
            path: worktree_path,
        }
        .into());
    }

    let config = WorktreeConfig::load_from_repo(storage.main_root())?;

    let source = match mode {
        CreateMode::Attach => {
            println!(
                "Creating worktree at {} for branch {}...",
                worktree_path.display(),
                branch
            );
            git.add_worktree(&worktree_path, branch, WorktreeAddMode::Existing)
                .map_err(|e| creation_failed(branch, &e))?;
            BranchSource::Local
        }
        CreateMode::Smart => add_with_detected_branch(git, &config, &worktree_path, branch)?,
    };

    println!("\nCopying .env files...");
    let count = copy_env_files(storage.main_root(), &worktree_path, &config)?;
    println!("Done copying {} .env file(s)", count);

    Ok(CreateOutcome {
        path: worktree_path,
        branch: branch.to_string(),
        source,
        env_files_copied: count,
    })
}

fn add_with_detected_branch(
    git: &dyn GitOperations,
    config: &WorktreeConfig,
    worktree_path: &Path,
    branch: &str,
) -> Result<BranchSource> {
    println!("Fetching latest from remote...");
    if let Err(e) = git.fetch() {
        log::debug!("fetch failed: {e:#}");
        eprintln!("Warning: git fetch failed, continuing anyway...");
    }

    let remote = config.remote();
    let source = if git.local_branch_exists(branch)? {
        BranchSource::Local
    } else if git.remote_branch_exists(remote, branch)? {
        BranchSource::RemoteOnly
    } else {
        BranchSource::New
    };

    println!(
        "Creating worktree at {} for branch {}...",
        worktree_path.display(),
        branch
    );

    let upstream = format!("{remote}/{branch}");
    let mode = match source {
        BranchSource::Local => WorktreeAddMode::Existing,
        BranchSource::RemoteOnly => WorktreeAddMode::Track {
            upstream: &upstream,
        },
        BranchSource::New => {
            println!(
                "Branch '{}' not found locally or on remote, creating new branch...",
                branch
            );
            WorktreeAddMode::NewBranch
        }
    };

    git.add_worktree(worktree_path, branch, mode)
        .map_err(|e| creation_failed(branch, &e))?;

    if source == BranchSource::New {
        println!(
            "\nTip: Run `git push -u {} {}` to push and set up tracking, otherwise you'll get an error about setting upstream on first push.",
            remote, branch
        );
    }

    Ok(source)
}

fn creation_failed(branch: &str, err: &anyhow::Error) -> anyhow::Error {
    WorktreeError::WorktreeCreationFailed {
        branch: branch.to_string(),
        detail: format!("{err:#}"),
    }
    .into()
}
