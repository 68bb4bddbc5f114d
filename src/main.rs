use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use worktree_utils::Result;
use worktree_utils::commands::create::CreateMode;
use worktree_utils::commands::sync_env::SyncTarget;
use worktree_utils::commands::{create, find, list, remove, rename, sync_env};
use worktree_utils::error::WorktreeError;

#[derive(Parser)]
#[command(name = "wt")]
#[command(about = "Manage sibling git worktrees and keep their .env files in sync")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a worktree at ../<dirName> and copy .env files into it
    Add {
        /// Directory name for the worktree (defaults to the branch name)
        #[arg(long = "dirName", value_hint = ValueHint::Other)]
        dir_name: Option<String>,
        /// Branch to check out (defaults to the directory name)
        #[arg(long = "branchName", value_hint = ValueHint::Other)]
        branch_name: Option<String>,
        /// Attach to an existing local branch without fetching or detection
        #[arg(long = "existingBranch")]
        existing_branch: bool,
    },
    /// Print all worktrees
    #[command(visible_alias = "ls")]
    List,
    /// Print worktrees whose listing line contains a search term
    #[command(visible_alias = "search")]
    Find {
        /// Case-insensitive search term
        #[arg(long)]
        search: Option<String>,
    },
    /// Rename a worktree directory and repair git's registration
    #[command(visible_alias = "mv")]
    Rename {
        #[arg(long = "oldDirName", value_hint = ValueHint::Other)]
        old_dir_name: Option<String>,
        #[arg(long = "newDirName", value_hint = ValueHint::Other)]
        new_dir_name: Option<String>,
    },
    /// Remove a worktree that has no uncommitted or unpushed work
    #[command(visible_alias = "rm")]
    Remove {
        #[arg(long = "dirName", value_hint = ValueHint::Other)]
        dir_name: Option<String>,
    },
    /// Copy .env files from the current worktree to other worktrees
    #[command(name = "sync-env", visible_alias = "sync")]
    SyncEnv {
        /// Target worktree directory name
        #[arg(long, conflicts_with = "all", value_hint = ValueHint::Other)]
        to: Option<String>,
        /// Sync to every other worktree
        #[arg(long)]
        all: bool,
    },
}

fn main() -> Result<()> {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let is_failure = e.use_stderr();
            let _ = e.print();
            if is_failure {
                eprintln!("\nRun \"wt help\" for usage information");
                std::process::exit(1);
            }
            std::process::exit(0);
        }
    };

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Add {
            dir_name,
            branch_name,
            existing_branch,
        } => {
            let mode = if existing_branch {
                CreateMode::Attach
            } else {
                CreateMode::Smart
            };
            create::create_worktree(branch_name.as_deref(), dir_name.as_deref(), mode)?;
        }
        Commands::List => {
            list::list_worktrees()?;
        }
        Commands::Find { search } => {
            find::find_worktrees(search.as_deref())?;
        }
        Commands::Rename {
            old_dir_name,
            new_dir_name,
        } => {
            let old_dir = required(old_dir_name, "oldDirName")?;
            let new_dir = required(new_dir_name, "newDirName")?;
            rename::rename_worktree(&old_dir, &new_dir)?;
        }
        Commands::Remove { dir_name } => {
            let dir = required(dir_name, "dirName")?;
            let pending = remove::remove_worktree(&dir)?;
            pending.wait();
        }
        Commands::SyncEnv { to, all } => {
            let target = match (to.as_deref(), all) {
                (Some(dir), _) => SyncTarget::Dir(dir),
                (None, true) => SyncTarget::All,
                (None, false) => {
                    println!("Usage: wt sync-env --to=<dirName> | --all");
                    return Err(WorktreeError::MissingArgument { flag: "to" }.into());
                }
            };
            sync_env::sync_env(target)?;
        }
    }

    Ok(())
}

/// Logs go to stderr, filtered by `WT_LOG` (default `warn`)
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("WT_LOG", "warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn required(value: Option<String>, flag: &'static str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WorktreeError::MissingArgument { flag }.into())
}
