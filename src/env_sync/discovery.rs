use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::WorktreeConfig;

/// Finds every env file that sits directly inside a project directory under
/// `root`.
///
/// A project directory is any directory containing one of the configured
/// manifest files. Ignored directories (dependency caches) and hidden
/// directories are never searched for manifests. Symlinked files and
/// directories are followed. Returned paths are absolute
/// when `root` is, and sorted.
///
/// # Errors
/// Returns an error if:
/// - A configured env pattern is not a valid glob
/// - `root` or a project directory cannot be read
pub fn find_env_files(root: &Path, config: &WorktreeConfig) -> Result<Vec<PathBuf>> {
    let patterns = config
        .env_patterns()
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid env file pattern: {p}")))
        .collect::<Result<Vec<_>>>()?;

    let mut env_files = Vec::new();
    for dir in find_project_dirs(root, config)? {
        env_files.extend(env_files_in(&dir, &patterns)?);
    }

    Ok(env_files)
}

/// Distinct directories under `root` that directly contain a manifest file
///
/// # Errors
/// Returns an error if `root` cannot be walked.
pub fn find_project_dirs(root: &Path, config: &WorktreeConfig) -> Result<BTreeSet<PathBuf>> {
    let manifests = config.manifests();
    let ignored = config.ignored_dirs();
    let mut project_dirs = BTreeSet::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry, ignored));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.loop_ancestor().is_some() => {
                log::debug!("Skipping symlink loop: {e}");
                continue;
            }
            Err(e)
                if e
                    .io_error()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound) =>
            {
                log::debug!("Skipping dangling symlink: {e}");
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to scan {}", root.display()));
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if manifests.iter().any(|m| *m == name) {
            if let Some(parent) = entry.path().parent() {
                project_dirs.insert(parent.to_path_buf());
            }
        }
    }

    Ok(project_dirs)
}

fn is_skipped_dir(entry: &DirEntry, ignored: &[String]) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || ignored.iter().any(|i| *i == name)
}

/// Env files directly inside `dir`, hidden files and symlinks to files included
fn env_files_in(dir: &Path, patterns: &[Pattern]) -> Result<Vec<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut matches = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        // follows symlinks; dangling links are not files
        if !entry.path().is_file() {
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        if patterns.iter().any(|p| p.matches_with(&name, options)) {
            matches.push(entry.path());
        }
    }

    matches.sort();
    Ok(matches)
}
