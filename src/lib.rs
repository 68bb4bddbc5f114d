//! # wt
//!
//! A CLI tool for managing the git worktrees of one repository as sibling
//! directories, with safety checks before destructive operations and
//! automatic propagation of untracked `.env` files.
//!
//! ## Features
//!
//! - **Sibling Layout** - Worktrees live next to the main checkout at `../<dirName>`
//! - **Smart Branch Detection** - `add` attaches a local branch, tracks a remote-only one, or creates a new one
//! - **Safe Removal** - `remove` and `rename` refuse the main repository and worktrees with uncommitted or unpushed work
//! - **Env Propagation** - `.env` / `.env.*` files next to `package.json` or `project.json` are copied into new worktrees
//! - **Configurable Patterns** - Extend manifests, env patterns and ignored directories via `.worktree-config.toml`
//!
//! ## Quick Start
//!
//! ```bash
//! # Create ../feature-auth for branch feature/auth
//! wt add --branchName=feature/auth --dirName=feature-auth
//!
//! # Find it again
//! wt find --search=auth
//!
//! # Push .env changes from the current worktree everywhere
//! wt sync-env --all
//!
//! # Remove it once merged
//! wt rm --dirName=feature-auth
//! ```
//!
//! ## Module Structure
//!
//! - [`commands`] - One module per subcommand (add, list, find, rename, remove, sync-env)
//! - [`git`] - Subprocess wrapper around `git`, listing parser and read-only safety queries
//! - [`storage`] - Resolves `../<dirName>` paths and staging locations for removal
//! - [`env_sync`] - Env file discovery and copying between worktrees
//! - [`config`] - Handles `.worktree-config.toml`
//! - [`error`] - Typed failure kinds surfaced to the user
//! - [`traits`] - Defines the `GitOperations` trait for testability and abstraction

pub mod commands;
pub mod config;
pub mod env_sync;
pub mod error;
pub mod git;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod testing;

pub use anyhow::Result;
