use anyhow::Result;
use clap::Args;
use rvs_checkout::{reset, reset_paths, PathResetAction, ResetMode};

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct ResetArgs {
    /// Commit to reset to
    #[arg(default_value = "HEAD")]
    pub commit: String,

    /// Limit reset to specific paths
    pub paths: Vec<String>,

    /// Reset only HEAD
    #[arg(long)]
    pub soft: bool,

    /// Reset HEAD and index (default)
    #[arg(long)]
    pub mixed: bool,

    /// Reset HEAD, index, and working tree
    #[arg(long)]
    pub hard: bool,

    /// Reset HEAD but keep local changes
    #[arg(long)]
    pub keep: bool,

    /// Only report errors
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn run(args: &ResetArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    if !args.paths.is_empty() {
        let results = reset_paths(&repo, &args.commit, &args.paths)?;
        if !args.quiet {
            println!("Unstaged changes after reset:");
            for result in &results {
                match result.action {
                    PathResetAction::Staged => println!("M\t{}", result.path),
                    PathResetAction::Removed => println!("D\t{}", result.path),
                    PathResetAction::Missing => {
                        println!("pathspec '{}' did not match any files", result.path);
                    }
                }
            }
        }
        return Ok(0);
    }

    let mode = if args.hard {
        ResetMode::Hard
    } else if args.soft {
        ResetMode::Soft
    } else if args.keep {
        ResetMode::Keep
    } else {
        ResetMode::Mixed
    };

    let oid = reset(&repo, &args.commit, mode)?;
    if !args.quiet {
        println!("HEAD is now at {}", oid.short_hex());
    }
    Ok(0)
}
