//! Typed errors for worktree operations.
//!
//! Library functions return [`anyhow::Result`]; these variants are raised with
//! `.into()` so callers can still `downcast_ref::<WorktreeError>()` and match
//! on the failure kind. Every variant is reported the same way by the binary:
//! the message on stderr and exit code 1.

use std::fmt;
use std::path::PathBuf;

/// Why a destructive operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafeReason {
    UncommittedChanges,
    UnpushedCommits,
}

impl fmt::Display for UnsafeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsafeReason::UncommittedChanges => write!(f, "uncommitted changes"),
            UnsafeReason::UnpushedCommits => write!(f, "unpushed commits"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorktreeError {
    /// A required flag was not supplied
    #[error("Missing --{flag}=...")]
    MissingArgument { flag: &'static str },

    #[error("Branch '{branch}' is already checked out at:\n{}", location.display())]
    AlreadyCheckedOut { branch: String, location: PathBuf },

    #[error("Worktree not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Destination already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    /// The operation targets the main repository
    #[error("Cannot {action}: that path is the main repository")]
    ProtectedPath {
        action: &'static str,
        path: PathBuf,
    },

    #[error("Cannot {action}: {reason} in worktree")]
    UnsafeState {
        action: &'static str,
        reason: UnsafeReason,
    },

    #[error("No worktree found matching: {term}")]
    NoMatch { term: String },

    #[error("Failed to create worktree for branch '{branch}': {detail}")]
    WorktreeCreationFailed { branch: String, detail: String },

    /// A git subprocess exited non-zero or could not be spawned
    #[error("git {command} failed: {detail}")]
    ExternalToolFailure { command: String, detail: String },

    #[error("Malformed line in worktree listing: {line:?}")]
    MalformedListing { line: String },

    #[error("git worktree list returned no entries")]
    EmptyListing,
}
