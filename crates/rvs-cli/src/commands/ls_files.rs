use anyhow::Result;
use clap::Args;
use rvs_utils::matches_any;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct LsFilesArgs {
    /// Show staged files (default)
    #[arg(short, long)]
    pub cached: bool,

    /// Show files whose working copy differs from the index
    #[arg(short, long)]
    pub modified: bool,

    /// Show staged files missing from the working tree
    #[arg(short, long)]
    pub deleted: bool,

    /// Show untracked files
    #[arg(short, long)]
    pub others: bool,

    /// Show only untracked files matching an exclude pattern
    #[arg(short, long)]
    pub ignored: bool,

    /// Skip untracked files matching this pattern (repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub exclude: Vec<String>,
}

pub fn run(args: &LsFilesArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let index = repo.load_index()?;
    let working = repo.scan_working_tree()?;

    let any_selector =
        args.cached || args.modified || args.deleted || args.others || args.ignored;
    let show_cached = args.cached || !any_selector;

    if show_cached {
        for (path, _) in index.iter() {
            println!("{path}");
        }
    }

    if args.modified {
        for (path, staged) in index.iter() {
            if let Some(actual) = working.get(path) {
                if actual != staged {
                    println!("{path}");
                }
            }
        }
    }

    if args.deleted {
        for (path, _) in index.iter() {
            if !working.contains_key(path) {
                println!("{path}");
            }
        }
    }

    if args.others {
        for path in working.keys() {
            if !index.contains(path) && !matches_any(&args.exclude, path) {
                println!("{path}");
            }
        }
    }

    if args.ignored {
        for path in working.keys() {
            if !index.contains(path) && matches_any(&args.exclude, path) {
                println!("{path}");
            }
        }
    }

    Ok(0)
}
