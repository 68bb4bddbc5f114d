//! Parsing for `git worktree list` output.
//!
//! Each line looks like `<path> <short-sha> [<branch>]`, with `(detached HEAD)`
//! in place of the branch for detached worktrees and `<path> (bare)` for a bare
//! main repository. Git may append `locked` or `prunable` after the annotation.

use anyhow::Result;
use std::path::PathBuf;

use crate::error::WorktreeError;

const TRAILING_FLAGS: &[&str] = &["locked", "prunable"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Branch(String),
    Detached,
    Bare,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeEntry {
    pub path: PathBuf,
    /// Abbreviated commit id; absent for bare repositories
    pub head: Option<String>,
    pub annotation: Annotation,
}

impl WorktreeEntry {
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        match &self.annotation {
            Annotation::Branch(name) => Some(name),
            Annotation::Detached | Annotation::Bare => None,
        }
    }

    /// Parses a single listing line
    ///
    /// # Errors
    /// Returns [`WorktreeError::MalformedListing`] if the line has no
    /// recognizable annotation, commit id, or path.
    pub fn parse_line(line: &str) -> Result<Self> {
        let malformed = || WorktreeError::MalformedListing {
            line: line.to_string(),
        };

        let mut rest = line.trim_end();
        while let Some(stripped) = TRAILING_FLAGS
            .iter()
            .find_map(|flag| rest.strip_suffix(flag))
            .filter(|s| s.ends_with(char::is_whitespace))
        {
            rest = stripped.trim_end();
        }

        if let Some(path) = rest.strip_suffix("(bare)") {
            let path = path.trim();
            if path.is_empty() {
                return Err(malformed().into());
            }
            return Ok(Self {
                path: PathBuf::from(path),
                head: None,
                annotation: Annotation::Bare,
            });
        }

        let (rest, annotation) = if let Some(prefix) = rest.strip_suffix("(detached HEAD)") {
            (prefix, Annotation::Detached)
        } else if rest.ends_with(']') {
            let open = rest.rfind(" [").ok_or_else(malformed)?;
            let branch = &rest[open + 2..rest.len() - 1];
            if branch.is_empty() {
                return Err(malformed().into());
            }
            (&rest[..open], Annotation::Branch(branch.to_string()))
        } else {
            return Err(malformed().into());
        };

        let (path, head) = rest
            .trim_end()
            .rsplit_once(char::is_whitespace)
            .ok_or_else(malformed)?;
        let path = path.trim_end();
        if path.is_empty() || head.is_empty() || !head.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(malformed().into());
        }

        Ok(Self {
            path: PathBuf::from(path),
            head: Some(head.to_string()),
            annotation,
        })
    }
}

/// Parses the full output of `git worktree list`
///
/// # Errors
/// Returns an error if any line is malformed or if the output lists no
/// worktrees at all (git always lists at least the main worktree).
pub fn parse_worktree_list(output: &str) -> Result<Vec<WorktreeEntry>> {
    let entries = output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(WorktreeEntry::parse_line)
        .collect::<Result<Vec<_>>>()?;

    if entries.is_empty() {
        return Err(WorktreeError::EmptyListing.into());
    }

    Ok(entries)
}
