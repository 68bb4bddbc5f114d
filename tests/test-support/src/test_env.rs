use anyhow::{Context, Result};
use assert_fs::TempDir;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;

use std::path::Path;
use std::process::Command;

/// A real git repository `test_repo` inside a temp directory
///
/// Worktrees created by `wt` land next to it, so `worktree_path("x")` is the
/// sibling `<temp>/x`.
pub struct CliTestEnvironment {
    pub repo_dir: ChildPath,
    temp_dir: TempDir,
}

impl CliTestEnvironment {
    /// Creates a repository on `main` with one commit
    ///
    /// `.env` files and `node_modules` are gitignored so copied env files do
    /// not make a worktree dirty.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Failed to create temporary directory
    /// - Failed to initialize git repository
    /// - Failed to configure git settings
    /// - Failed to create initial commit
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temporary directory")?;
        let repo_dir = temp_dir.child("test_repo");
        repo_dir.create_dir_all()?;

        git(repo_dir.path(), &["init"])?;
        git(repo_dir.path(), &["config", "user.name", "Test User"])?;
        git(repo_dir.path(), &["config", "user.email", "test@example.com"])?;
        git(repo_dir.path(), &["config", "commit.gpgsign", "false"])?;

        repo_dir.child("README.md").write_str("# Test Repo")?;
        repo_dir
            .child(".gitignore")
            .write_str(".env\n.env.*\nnode_modules/\n")?;
        git(repo_dir.path(), &["add", "."])?;
        git(repo_dir.path(), &["commit", "-m", "Initial commit"])?;

        // Ensure we have a main branch (some git versions default to 'master')
        git(repo_dir.path(), &["branch", "-M", "main"])?;

        Ok(Self { repo_dir, temp_dir })
    }

    /// Runs `wt` from the main repository
    ///
    /// # Errors
    /// Returns an error if the binary cannot be found
    pub fn run_command(&self, args: &[&str]) -> Result<assert_cmd::Command> {
        self.run_command_in(self.repo_dir.path(), args)
    }

    /// Runs `wt` from an arbitrary directory, e.g. inside another worktree
    ///
    /// # Errors
    /// Returns an error if the binary cannot be found
    pub fn run_command_in(&self, dir: &Path, args: &[&str]) -> Result<assert_cmd::Command> {
        let mut cmd = assert_cmd::Command::cargo_bin("wt").context("Failed to find wt binary")?;

        cmd.current_dir(dir).env_remove("WT_LOG");
        cmd.args(args);
        Ok(cmd)
    }

    /// Sibling directory of the main repository
    pub fn worktree_path(&self, dir_name: &str) -> ChildPath {
        self.temp_dir.child(dir_name)
    }

    /// Runs git in `dir` and returns trimmed stdout
    ///
    /// # Errors
    /// Returns an error if git exits non-zero
    pub fn git(&self, dir: &Path, args: &[&str]) -> Result<String> {
        git(dir, args)
    }

    /// Stages and commits everything in `dir`
    ///
    /// # Errors
    /// Returns an error if git exits non-zero
    pub fn commit_all(&self, dir: &Path, message: &str) -> Result<()> {
        git(dir, &["add", "."])?;
        git(dir, &["commit", "-m", message])?;
        Ok(())
    }

    /// Adds a bare `origin` remote and pushes `main` to it
    ///
    /// # Errors
    /// Returns an error if any git step fails
    pub fn add_origin_remote(&self) -> Result<()> {
        let remote_dir = self.temp_dir.child("remotes").child("origin.git");
        remote_dir.create_dir_all()?;
        git(remote_dir.path(), &["init", "--bare"])?;

        let remote_path = remote_dir
            .path()
            .to_str()
            .context("Temp path is not valid UTF-8")?;
        git(self.repo_dir.path(), &["remote", "add", "origin", remote_path])?;
        git(self.repo_dir.path(), &["push", "-u", "origin", "main"])?;
        Ok(())
    }
}

fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .context("Failed to execute git command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("git {} failed: {}", args.join(" "), stderr);
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn test_cli_test_environment_creation() -> Result<()> {
        let env = CliTestEnvironment::new()?;

        env.repo_dir.assert(predicate::path::is_dir());
        env.repo_dir.child(".git").assert(predicate::path::exists());
        env.repo_dir
            .child("README.md")
            .assert(predicate::str::contains("# Test Repo"));

        let branch = env.git(env.repo_dir.path(), &["branch", "--show-current"])?;
        assert_eq!(branch, "main");

        Ok(())
    }

    #[test]
    fn test_worktree_paths_are_siblings() -> Result<()> {
        let env = CliTestEnvironment::new()?;

        let path = env.worktree_path("feature-x");
        assert_eq!(path.path().parent(), env.repo_dir.path().parent());

        Ok(())
    }
}
