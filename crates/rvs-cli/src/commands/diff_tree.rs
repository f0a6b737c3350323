use anyhow::Result;
use clap::Args;

use super::{open_repo, print_map_diff, DiffFormat};
use crate::Cli;

#[derive(Args)]
pub struct DiffTreeArgs {
    /// Old tree-ish
    pub old: String,
    /// New tree-ish
    pub new: String,

    /// Show only names of changed files
    #[arg(long)]
    pub name_only: bool,
}

pub fn run(args: &DiffTreeArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let old_tree = repo.resolve_tree_ish(&args.old)?;
    let new_tree = repo.resolve_tree_ish(&args.new)?;
    let old_map = repo.odb().require_tree(&old_tree)?.to_map();
    let new_map = repo.odb().require_tree(&new_tree)?.to_map();

    let format = if args.name_only {
        DiffFormat::NameOnly
    } else {
        DiffFormat::NameStatus
    };
    print_map_diff(&repo, &old_map, &new_map, format)?;
    Ok(0)
}
