use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use clap::Args;
use rvs_object::Object;

use super::{format_commit_date, open_repo, print_map_diff, DiffFormat};
use crate::Cli;

#[derive(Args)]
pub struct ShowArgs {
    /// Object to show (commit-ish, tree, or blob)
    #[arg(default_value = "HEAD")]
    pub object: String,

    /// Suppress the patch output for commits
    #[arg(short = 's', long)]
    pub no_patch: bool,
}

pub fn run(args: &ShowArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    // Commit-ish resolution first; a non-commit spec may still name a tree
    // or blob by hex prefix.
    let oid = match repo.resolve_commit_ish(&args.object) {
        Ok(oid) => oid,
        Err(_) => repo.odb().resolve_prefix(&args.object)?,
    };
    let object = repo.odb().require(&oid)?;

    match object {
        Object::Commit(commit) => {
            println!("commit {}", oid.to_hex());
            println!("Author: {} <rvs@example.com>", commit.author);
            println!("Date:   {}", format_commit_date(commit.timestamp));
            println!();
            for line in commit.message.lines() {
                println!("    {line}");
            }
            println!();

            if !args.no_patch {
                let new_map = repo.odb().require_tree(&commit.tree)?.to_map();
                let old_map = match commit.first_parent() {
                    Some(parent) => repo.tree_map_of(&parent)?,
                    None => BTreeMap::new(),
                };
                print_map_diff(&repo, &old_map, &new_map, DiffFormat::Patch)?;
            }
        }
        Object::Tree(tree) => {
            for entry in tree.entries() {
                println!("100644 blob {}\t{}", entry.oid.to_hex(), entry.path);
            }
        }
        Object::Blob(blob) => {
            std::io::stdout().write_all(&blob.data)?;
        }
    }

    Ok(0)
}
