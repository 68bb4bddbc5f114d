//! In-memory [`GitOperations`] used by unit tests.

use anyhow::Result;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use crate::error::WorktreeError;
use crate::traits::{GitOperations, WorktreeAddMode};

/// Scriptable git double. Mutations are recorded in `calls`; `add_worktree`
/// creates the directory and registers it in the listing the way git would.
#[derive(Default)]
pub struct MockGit {
    listing: RefCell<String>,
    status: RefCell<String>,
    remotes: RefCell<Vec<String>>,
    unpushed: RefCell<String>,
    local_branches: RefCell<Vec<String>>,
    remote_branches: RefCell<Vec<String>>,
    fail_unpushed: Cell<bool>,
    fail_fetch: Cell<bool>,
    fail_add: Cell<bool>,
    fail_repair: Cell<bool>,
    pub calls: RefCell<Vec<String>>,
}

impl MockGit {
    /// A mock whose listing contains only the main repository at `main_root`
    pub fn with_main(main_root: &Path) -> Self {
        let git = Self::default();
        git.set_listing(&format!("{}  1111111 [main]\n", main_root.display()));
        git.local_branches.borrow_mut().push("main".to_string());
        git
    }

    pub fn set_listing(&self, listing: &str) {
        *self.listing.borrow_mut() = listing.to_string();
    }

    pub fn set_status(&self, status: &str) {
        *self.status.borrow_mut() = status.to_string();
    }

    pub fn set_remotes(&self, remotes: &[&str]) {
        *self.remotes.borrow_mut() = remotes.iter().map(ToString::to_string).collect();
    }

    pub fn set_unpushed(&self, output: &str) {
        *self.unpushed.borrow_mut() = output.to_string();
    }

    pub fn add_local_branch(&self, branch: &str) {
        self.local_branches.borrow_mut().push(branch.to_string());
    }

    /// Registers `remote/branch` as a remote-tracking branch
    pub fn add_remote_branch(&self, remote: &str, branch: &str) {
        self.remote_branches
            .borrow_mut()
            .push(format!("{remote}/{branch}"));
    }

    pub fn fail_unpushed(&self) {
        self.fail_unpushed.set(true);
    }

    pub fn fail_fetch(&self) {
        self.fail_fetch.set(true);
    }

    pub fn fail_add(&self) {
        self.fail_add.set(true);
    }

    pub fn fail_repair(&self) {
        self.fail_repair.set(true);
    }

    pub fn recorded(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn failure(command: &str) -> anyhow::Error {
        WorktreeError::ExternalToolFailure {
            command: command.to_string(),
            detail: "mock failure".to_string(),
        }
        .into()
    }
}

impl GitOperations for MockGit {
    fn show_toplevel(&self, path: &Path) -> Result<PathBuf> {
        Ok(path.to_path_buf())
    }

    fn fetch(&self) -> Result<()> {
        self.calls.borrow_mut().push("fetch".to_string());
        if self.fail_fetch.get() {
            return Err(Self::failure("fetch"));
        }
        Ok(())
    }

    fn local_branch_exists(&self, branch_name: &str) -> Result<bool> {
        Ok(self.local_branches.borrow().iter().any(|b| b == branch_name))
    }

    fn remote_branch_exists(&self, remote: &str, branch_name: &str) -> Result<bool> {
        let wanted = format!("{remote}/{branch_name}");
        Ok(self.remote_branches.borrow().iter().any(|b| *b == wanted))
    }

    fn add_worktree(
        &self,
        worktree_path: &Path,
        branch_name: &str,
        mode: WorktreeAddMode<'_>,
    ) -> Result<()> {
        let call = match mode {
            WorktreeAddMode::Existing => format!("add {branch_name}"),
            WorktreeAddMode::Track { upstream } => format!("add --track {branch_name} {upstream}"),
            WorktreeAddMode::NewBranch => format!("add -b {branch_name}"),
        };
        self.calls.borrow_mut().push(call);

        if self.fail_add.get() {
            return Err(Self::failure("worktree add"));
        }

        std::fs::create_dir_all(worktree_path)?;
        self.listing.borrow_mut().push_str(&format!(
            "{}  2222222 [{}]\n",
            worktree_path.display(),
            branch_name
        ));
        self.add_local_branch(branch_name);
        Ok(())
    }

    fn worktree_list(&self) -> Result<String> {
        Ok(self.listing.borrow().clone())
    }

    fn prune_worktrees(&self) -> Result<()> {
        self.calls.borrow_mut().push("prune".to_string());
        let kept: String = self
            .listing
            .borrow()
            .lines()
            .filter(|line| {
                line.split_whitespace()
                    .next()
                    .is_some_and(|path| Path::new(path).exists())
            })
            .map(|line| format!("{line}\n"))
            .collect();
        self.set_listing(&kept);
        Ok(())
    }

    fn repair_worktree(&self, worktree_path: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("repair {}", worktree_path.display()));
        if self.fail_repair.get() {
            return Err(Self::failure("worktree repair"));
        }
        Ok(())
    }

    fn status_porcelain(&self, _path: &Path) -> Result<String> {
        Ok(self.status.borrow().clone())
    }

    fn remotes(&self, _path: &Path) -> Result<Vec<String>> {
        Ok(self.remotes.borrow().clone())
    }

    fn unpushed_commits(&self, _path: &Path) -> Result<String> {
        if self.fail_unpushed.get() {
            return Err(Self::failure("rev-list"));
        }
        Ok(self.unpushed.borrow().clone())
    }
}
