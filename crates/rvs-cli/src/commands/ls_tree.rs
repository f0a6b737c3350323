use anyhow::Result;
use clap::Args;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct LsTreeArgs {
    /// Tree-ish to list
    pub tree_ish: String,

    /// Recurse into subtrees (trees are flat, so this is implied)
    #[arg(short, long)]
    pub recursive: bool,

    /// List only path names
    #[arg(long)]
    pub name_only: bool,
}

pub fn run(args: &LsTreeArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let tree_oid = repo.resolve_tree_ish(&args.tree_ish)?;
    let tree = repo.odb().require_tree(&tree_oid)?;

    for entry in tree.entries() {
        if args.name_only {
            println!("{}", entry.path);
        } else {
            println!("100644 blob {}\t{}", entry.oid.to_hex(), entry.path);
        }
    }

    Ok(0)
}
