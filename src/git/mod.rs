//! Git collaborator: subprocess calls to the `git` executable.
//!
//! Every mutation (fetch, worktree add/prune/repair) and every status query
//! goes through `git` itself. `git2` is only used to open the repository and
//! to look up whether a branch exists locally or on a remote.

pub mod list;
pub mod query;

use anyhow::{Context, Result};
use git2::{BranchType, Repository};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::WorktreeError;
use crate::traits::{GitOperations, WorktreeAddMode};

pub struct GitRepo {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepo {
    /// Opens the git repository containing the specified path
    ///
    /// # Errors
    /// Returns an error if:
    /// - The path is not inside a git repository
    /// - The repository is bare (worktrees need a working directory)
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).context("Failed to find git repository")?;
        let workdir = repo
            .workdir()
            .context("Bare repositories are not supported")?
            .to_path_buf();
        Ok(Self { repo, workdir })
    }

    /// Checks if a local branch exists in the repository
    ///
    /// # Errors
    /// Returns an error if git operations fail
    pub fn branch_exists(&self, branch_name: &str) -> Result<bool> {
        self.find_branch(branch_name, BranchType::Local)
    }

    fn find_branch(&self, name: &str, branch_type: BranchType) -> Result<bool> {
        match self.repo.find_branch(name, branch_type) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Runs git in `dir` and returns its stdout
    fn output(&self, dir: &Path, args: &[&str]) -> Result<String> {
        log::debug!("$ git -C {} {}", dir.display(), args.join(" "));
        let output = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_failure(args, &e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WorktreeError::ExternalToolFailure {
                command: args.join(" "),
                detail: stderr.trim().to_string(),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs git in the repository with output shown to the user
    fn run(&self, args: &[&str]) -> Result<()> {
        log::debug!("$ git -C {} {}", self.workdir.display(), args.join(" "));
        let status = Command::new("git")
            .arg("-C")
            .arg(&self.workdir)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| spawn_failure(args, &e))?;

        if !status.success() {
            return Err(WorktreeError::ExternalToolFailure {
                command: args.join(" "),
                detail: status.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn spawn_failure(args: &[&str], err: &std::io::Error) -> anyhow::Error {
    WorktreeError::ExternalToolFailure {
        command: args.join(" "),
        detail: format!("failed to run git: {err}"),
    }
    .into()
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))
}

impl GitOperations for GitRepo {
    fn show_toplevel(&self, path: &Path) -> Result<PathBuf> {
        let stdout = self.output(path, &["rev-parse", "--show-toplevel"])?;
        let toplevel = stdout.trim();
        if toplevel.is_empty() {
            anyhow::bail!("git rev-parse --show-toplevel returned no path");
        }
        Ok(PathBuf::from(toplevel))
    }

    fn fetch(&self) -> Result<()> {
        self.run(&["fetch"])
    }

    fn local_branch_exists(&self, branch_name: &str) -> Result<bool> {
        self.branch_exists(branch_name)
    }

    fn remote_branch_exists(&self, remote: &str, branch_name: &str) -> Result<bool> {
        self.find_branch(&format!("{remote}/{branch_name}"), BranchType::Remote)
    }

    fn add_worktree(
        &self,
        worktree_path: &Path,
        branch_name: &str,
        mode: WorktreeAddMode<'_>,
    ) -> Result<()> {
        let path = path_str(worktree_path)?;
        match mode {
            WorktreeAddMode::Existing => self.run(&["worktree", "add", path, branch_name]),
            WorktreeAddMode::Track { upstream } => self.run(&[
                "worktree",
                "add",
                "--track",
                "-b",
                branch_name,
                path,
                upstream,
            ]),
            WorktreeAddMode::NewBranch => {
                self.run(&["worktree", "add", "-b", branch_name, path])
            }
        }
    }

    fn worktree_list(&self) -> Result<String> {
        self.output(&self.workdir, &["worktree", "list"])
    }

    fn prune_worktrees(&self) -> Result<()> {
        self.run(&["worktree", "prune"])
    }

    fn repair_worktree(&self, worktree_path: &Path) -> Result<()> {
        self.run(&["worktree", "repair", path_str(worktree_path)?])
    }

    fn status_porcelain(&self, path: &Path) -> Result<String> {
        self.output(path, &["status", "--porcelain"])
    }

    fn remotes(&self, path: &Path) -> Result<Vec<String>> {
        let stdout = self.output(path, &["remote"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn unpushed_commits(&self, path: &Path) -> Result<String> {
        self.output(path, &["rev-list", "HEAD", "--not", "--remotes"])
    }
}
