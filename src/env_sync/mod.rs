//! Propagation of untracked env files between worktrees.
//!
//! Files are keyed by their path relative to the worktree root, so
//! `apps/web/.env.local` in the source always lands at `apps/web/.env.local`
//! in the target. Existing target files are overwritten without comparison.

pub mod discovery;

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::WorktreeConfig;
pub use discovery::{find_env_files, find_project_dirs};

/// Copies every env file found under `source_root` to the same relative path
/// under `target_root` and returns how many were copied
///
/// There is no rollback: if a copy fails, files already copied stay in place
/// and the error is returned.
///
/// # Errors
/// Returns an error if:
/// - Source and target resolve to the same directory
/// - Discovery fails
/// - A target directory cannot be created or a file cannot be copied
pub fn copy_env_files(
    source_root: &Path,
    target_root: &Path,
    config: &WorktreeConfig,
) -> Result<usize> {
    if same_dir(source_root, target_root) {
        anyhow::bail!(
            "Source and target are the same worktree: {}",
            source_root.display()
        );
    }

    let mut count = 0;
    for source_file in find_env_files(source_root, config)? {
        let relative_path = source_file.strip_prefix(source_root)?;
        let target_file = target_root.join(relative_path);

        if let Some(parent) = target_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::copy(&source_file, &target_file)
            .with_context(|| format!("Failed to copy {}", relative_path.display()))?;
        println!("  Copied: {}", relative_path.display());
        count += 1;
    }

    Ok(count)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
