use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use rvs_worktree::AddOptions;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct WorktreeArgs {
    #[command(subcommand)]
    pub command: WorktreeCommand,
}

#[derive(Subcommand)]
pub enum WorktreeCommand {
    /// Create a new working tree
    Add {
        /// Path for the new working tree
        path: PathBuf,
        /// Commit-ish to check out
        commit_ish: Option<String>,
        /// Create a new branch
        #[arg(short = 'b', long = "new-branch")]
        new_branch: Option<String>,
        /// Create or reset a new branch
        #[arg(short = 'B', long = "force-new-branch")]
        force_new_branch: Option<String>,
        /// Detach HEAD in the new working tree
        #[arg(long)]
        detach: bool,
        /// Force creation in a non-empty directory
        #[arg(short, long)]
        force: bool,
    },
    /// List details of each working tree
    List,
    /// Remove a working tree
    Remove {
        worktree: PathBuf,
        #[arg(short, long)]
        force: bool,
    },
    /// Prune working tree information
    Prune {
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Lock a working tree against removal and pruning
    Lock {
        worktree: PathBuf,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Unlock a working tree
    Unlock { worktree: PathBuf },
    /// Move a working tree to a new location
    Move {
        worktree: PathBuf,
        new_path: PathBuf,
    },
}

pub fn run(args: &WorktreeArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    match &args.command {
        WorktreeCommand::Add {
            path,
            commit_ish,
            new_branch,
            force_new_branch,
            detach,
            force,
        } => {
            let opts = AddOptions {
                new_branch: new_branch.clone(),
                force_new_branch: force_new_branch.clone(),
                detach: *detach,
                force: *force,
            };
            let added = rvs_worktree::add(&repo, path, commit_ish.as_deref(), &opts)?;
            match &added.branch {
                Some(branch) => println!("Prepared worktree (branch '{branch}')"),
                None => println!(
                    "Prepared worktree (detached HEAD {})",
                    added.commit.short_hex()
                ),
            }
            println!("HEAD is now at {}", added.commit.short_hex());
        }
        WorktreeCommand::List => {
            for info in rvs_worktree::list(&repo)? {
                let commit = info
                    .commit
                    .map(|oid| oid.short_hex())
                    .unwrap_or_else(|| "0000000".to_string());
                let branch = match &info.branch {
                    Some(name) => format!("[{name}]"),
                    None => "[detached]".to_string(),
                };
                let lock_marker = if info.locked { " locked" } else { "" };
                println!("{}  {} {}{}", info.path.display(), commit, branch, lock_marker);
            }
        }
        WorktreeCommand::Remove { worktree, force } => {
            rvs_worktree::remove(&repo, worktree, *force)?;
            println!("Removed worktree '{}'", worktree.display());
        }
        WorktreeCommand::Prune { dry_run } => {
            let pruned = rvs_worktree::prune(&repo, *dry_run)?;
            for path in &pruned {
                let action = if *dry_run { "would prune" } else { "pruned" };
                println!("{action} {}", path.display());
            }
        }
        WorktreeCommand::Lock { worktree, reason } => {
            rvs_worktree::lock(&repo, worktree, reason.as_deref())?;
            println!("Locked worktree '{}'", worktree.display());
        }
        WorktreeCommand::Unlock { worktree } => {
            if rvs_worktree::unlock(&repo, worktree)? {
                println!("Unlocked worktree '{}'", worktree.display());
            } else {
                println!("Worktree '{}' is not locked", worktree.display());
            }
        }
        WorktreeCommand::Move { worktree, new_path } => {
            let new_root = rvs_worktree::move_worktree(&repo, worktree, new_path)?;
            println!(
                "Moved worktree '{}' to '{}'",
                worktree.display(),
                new_root.display()
            );
        }
    }

    Ok(0)
}
