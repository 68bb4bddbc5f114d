//! Configuration for env-file propagation and branch lookup.
//!
//! Loaded from an optional `.worktree-config.toml` in the main repository.
//! User lists are merged with the defaults rather than replacing them:
//!
//! ```toml
//! remote = "upstream"
//!
//! [env-sync]
//! manifests = ["Cargo.toml"]
//! patterns = [".envrc"]
//! ignore = ["target"]
//! # Result: package.json + project.json + Cargo.toml markers,
//! #         .env + .env.* + .envrc files, node_modules + target skipped
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = ".worktree-config.toml";

const DEFAULT_REMOTE: &str = "origin";

/// Main configuration structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct WorktreeConfig {
    /// Remote consulted for remote-only branches and tracking setup
    #[serde(default)]
    pub remote: Option<String>,

    #[serde(rename = "env-sync", default)]
    pub env_sync: EnvSyncPatterns,
}

/// What counts as a project directory and which files in it are env files.
///
/// All fields are optional so a partial table merges with the defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EnvSyncPatterns {
    /// File names marking a project directory
    #[serde(default)]
    pub manifests: Option<Vec<String>>,

    /// Glob patterns for env file names inside a project directory
    #[serde(default)]
    pub patterns: Option<Vec<String>>,

    /// Directory names never descended into while looking for manifests
    #[serde(default)]
    pub ignore: Option<Vec<String>>,
}

impl Default for WorktreeConfig {
    fn default() -> Self {
        Self {
            remote: Some(DEFAULT_REMOTE.to_string()),
            env_sync: EnvSyncPatterns {
                manifests: Some(Self::default_manifests()),
                patterns: Some(Self::default_env_patterns()),
                ignore: Some(Self::default_ignored_dirs()),
            },
        }
    }
}

impl WorktreeConfig {
    fn default_manifests() -> Vec<String> {
        vec!["package.json".to_string(), "project.json".to_string()]
    }

    fn default_env_patterns() -> Vec<String> {
        vec![".env".to_string(), ".env.*".to_string()]
    }

    fn default_ignored_dirs() -> Vec<String> {
        vec!["node_modules".to_string()]
    }

    /// Loads configuration from the repository at `repo_path`.
    ///
    /// A missing or blank file yields the defaults. Invalid TOML prints a
    /// warning and also yields the defaults.
    ///
    /// # Errors
    ///
    /// Only returns an error if the file exists but cannot be read.
    pub fn load_from_repo(repo_path: &Path) -> Result<Self> {
        let config_path = repo_path.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        match toml::from_str::<WorktreeConfig>(&content) {
            Ok(config) => Ok(config.merged_with_defaults()),
            Err(e) => {
                eprintln!("Warning: Invalid TOML syntax in {CONFIG_FILE_NAME}:");
                eprintln!("  {}", e);
                eprintln!("  Using default configuration. Please fix the syntax and try again.");
                Ok(Self::default())
            }
        }
    }

    /// Adds user entries to the defaults, skipping duplicates. A user remote
    /// replaces the default one.
    #[must_use]
    pub fn merged_with_defaults(self) -> Self {
        Self {
            remote: Some(self.remote.unwrap_or_else(|| DEFAULT_REMOTE.to_string())),
            env_sync: EnvSyncPatterns {
                manifests: Some(merge(Self::default_manifests(), self.env_sync.manifests)),
                patterns: Some(merge(Self::default_env_patterns(), self.env_sync.patterns)),
                ignore: Some(merge(Self::default_ignored_dirs(), self.env_sync.ignore)),
            },
        }
    }

    #[must_use]
    pub fn remote(&self) -> &str {
        self.remote.as_deref().unwrap_or(DEFAULT_REMOTE)
    }

    #[must_use]
    pub fn manifests(&self) -> &[String] {
        self.env_sync.manifests.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn env_patterns(&self) -> &[String] {
        self.env_sync.patterns.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn ignored_dirs(&self) -> &[String] {
        self.env_sync.ignore.as_deref().unwrap_or_default()
    }
}

fn merge(mut defaults: Vec<String>, user: Option<Vec<String>>) -> Vec<String> {
    for entry in user.unwrap_or_default() {
        if !defaults.contains(&entry) {
            defaults.push(entry);
        }
    }
    defaults
}
