use anyhow::{bail, Result};
use clap::Args;

use super::{open_repo, print_map_diff, DiffFormat};
use crate::Cli;

#[derive(Args)]
pub struct DiffArgs {
    /// Commits to compare (0, 1, or 2)
    pub commits: Vec<String>,

    /// Compare the index against HEAD
    #[arg(long, alias = "staged")]
    pub cached: bool,

    /// Show only names of changed files
    #[arg(long)]
    pub name_only: bool,

    /// Show names and statuses of changed files
    #[arg(long)]
    pub name_status: bool,
}

pub fn run(args: &DiffArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let format = if args.name_only {
        DiffFormat::NameOnly
    } else if args.name_status {
        DiffFormat::NameStatus
    } else {
        DiffFormat::Patch
    };

    if args.commits.len() > 2 {
        bail!("too many arguments");
    }

    let (old, new) = if args.cached {
        // index vs HEAD
        (repo.head_tree_map()?, repo.load_index()?.into_map())
    } else {
        match args.commits.len() {
            // working tree vs index
            0 => (repo.load_index()?.into_map(), repo.scan_working_tree()?),
            // working tree vs a commit
            1 => {
                let oid = repo.resolve_commit_ish(&args.commits[0])?;
                (repo.tree_map_of(&oid)?, repo.scan_working_tree()?)
            }
            // commit vs commit
            _ => {
                let a = repo.resolve_commit_ish(&args.commits[0])?;
                let b = repo.resolve_commit_ish(&args.commits[1])?;
                (repo.tree_map_of(&a)?, repo.tree_map_of(&b)?)
            }
        }
    };

    print_map_diff(&repo, &old, &new, format)?;
    Ok(0)
}
