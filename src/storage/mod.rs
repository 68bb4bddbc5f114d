use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::git::list::{Annotation, parse_worktree_list};
use crate::traits::GitOperations;

static STAGING_SEQUENCE: AtomicUsize = AtomicUsize::new(0);

/// Where the worktrees of one repository live.
///
/// Worktrees are siblings of the main repository: `<dirName>` resolves to
/// `<parent of main root>/<dirName>`, whatever the process working directory
/// is. Every query and command takes this value explicitly.
#[derive(Debug, Clone)]
pub struct WorktreeStorage {
    main_root: PathBuf,
    current_root: PathBuf,
    root_dir: PathBuf,
}

impl WorktreeStorage {
    /// Builds the storage layout for the repository containing `cwd`
    ///
    /// The main repository is the first entry git lists; the current root is
    /// the top-level of the worktree containing `cwd`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - `cwd` is not inside a git worktree
    /// - The worktree listing cannot be read or parsed
    /// - The main repository is bare
    pub fn discover(git: &dyn GitOperations, cwd: &Path) -> Result<Self> {
        let current_root = git.show_toplevel(cwd)?;
        let entries = parse_worktree_list(&git.worktree_list()?)?;
        let main = entries
            .first()
            .context("Worktree listing has no main repository entry")?;

        if main.annotation == Annotation::Bare {
            anyhow::bail!(
                "Bare repositories are not supported: {}",
                main.path.display()
            );
        }

        Self::new(&main.path, &current_root)
    }

    /// Creates a storage layout from known roots
    ///
    /// # Errors
    /// Returns an error if either root cannot be resolved to an absolute path
    /// or the main root has no parent directory.
    pub fn new(main_root: &Path, current_root: &Path) -> Result<Self> {
        let main_root = dunce::canonicalize(main_root).with_context(|| {
            format!("Failed to resolve main repository: {}", main_root.display())
        })?;
        let current_root = dunce::canonicalize(current_root).with_context(|| {
            format!("Failed to resolve current worktree: {}", current_root.display())
        })?;
        let root_dir = main_root
            .parent()
            .context("Main repository has no parent directory")?
            .to_path_buf();

        Ok(Self {
            main_root,
            current_root,
            root_dir,
        })
    }

    #[must_use]
    pub fn main_root(&self) -> &Path {
        &self.main_root
    }

    /// Top-level of the worktree the command was started from
    #[must_use]
    pub fn current_root(&self) -> &Path {
        &self.current_root
    }

    /// Directory holding the main repository and all sibling worktrees
    #[must_use]
    pub fn get_root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Resolves `../<dir_name>` relative to the main repository
    ///
    /// # Errors
    /// Returns an error if the name is empty, absolute, or escapes the
    /// worktree directory via `..`.
    pub fn get_worktree_path(&self, dir_name: &str) -> Result<PathBuf> {
        validate_dir_name(dir_name)?;
        Ok(self.root_dir.join(dir_name))
    }

    /// Process-scoped staging location in the system temp directory
    #[must_use]
    pub fn temp_staging_path(&self, dir_name: &str) -> PathBuf {
        std::env::temp_dir().join(Self::staging_name(dir_name))
    }

    /// Staging location next to the worktrees, on the same filesystem
    #[must_use]
    pub fn local_staging_path(&self, dir_name: &str) -> PathBuf {
        self.root_dir
            .join(format!(".{}.removing", Self::staging_name(dir_name)))
    }

    fn staging_name(dir_name: &str) -> String {
        format!(
            "worktree_{}_{}_{}",
            std::process::id(),
            STAGING_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            Self::sanitize_dir_name(dir_name)
        )
    }

    fn sanitize_dir_name(dir_name: &str) -> String {
        dir_name.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "-")
    }
}

fn validate_dir_name(dir_name: &str) -> Result<()> {
    let path = Path::new(dir_name);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));

    if dir_name.trim().is_empty() || escapes {
        anyhow::bail!("Invalid worktree directory name: '{}'", dir_name);
    }

    Ok(())
}
