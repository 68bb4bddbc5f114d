use anyhow::Result;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Writes a `.worktree-config.toml` with extra `[env-sync]` entries
pub fn create_worktree_config(
    repo_dir: &ChildPath,
    manifests: &[&str],
    patterns: &[&str],
) -> Result<()> {
    let config_content = format!(
        r#"[env-sync]
manifests = {:?}
patterns = {:?}
"#,
        manifests, patterns
    );

    repo_dir
        .child(".worktree-config.toml")
        .write_str(&config_content)?;

    Ok(())
}

/// Lays out a small monorepo: root and `apps/web` are projects with env
/// files, `node_modules/pkg` looks like one but must be skipped
///
/// Manifests are plain files; callers commit them if the worktree must
/// receive them through git.
pub fn create_env_project(repo_dir: &ChildPath) -> Result<()> {
    repo_dir.child("package.json").write_str("{}")?;
    repo_dir.child(".env").write_str("ROOT_VAR=root")?;

    let web = repo_dir.child("apps").child("web");
    web.create_dir_all()?;
    web.child("package.json").write_str("{}")?;
    web.child(".env.local").write_str("WEB_VAR=web")?;

    let cached = repo_dir.child("node_modules").child("pkg");
    cached.create_dir_all()?;
    cached.child("package.json").write_str("{}")?;
    cached.child(".env").write_str("CACHED=1")?;

    Ok(())
}

/// Asserts the env files from [`create_env_project`] exist under `worktree_path`
/// at the same relative paths, and the cached one does not
pub fn assert_env_files_copied(worktree_path: &ChildPath) -> Result<()> {
    worktree_path
        .child(".env")
        .assert(predicate::str::contains("ROOT_VAR=root"));

    worktree_path
        .child("apps")
        .child("web")
        .child(".env.local")
        .assert(predicate::str::contains("WEB_VAR=web"));

    worktree_path
        .child("node_modules")
        .child("pkg")
        .child(".env")
        .assert(predicate::path::missing());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_project_helpers() -> Result<()> {
        let temp_dir = assert_fs::TempDir::new()?;
        let repo_dir = temp_dir.child("test_repo");
        repo_dir.create_dir_all()?;

        create_env_project(&repo_dir)?;
        repo_dir
            .child("apps/web/.env.local")
            .assert(predicate::path::exists());

        create_worktree_config(&repo_dir, &["Cargo.toml"], &[".envrc"])?;
        repo_dir
            .child(".worktree-config.toml")
            .assert(predicate::str::contains("[env-sync]"))
            .assert(predicate::str::contains("\"Cargo.toml\""));

        Ok(())
    }
}
