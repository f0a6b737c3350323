use anyhow::Result;
use clap::Args;
use rvs_checkout::materialize::write_blob_file;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct RestoreArgs {
    /// Files to restore; defaults to everything
    pub paths: Vec<String>,

    /// Restore from this tree-ish instead of the default source
    #[arg(short, long)]
    pub source: Option<String>,

    /// Restore the index
    #[arg(short = 'S', long)]
    pub staged: bool,

    /// Restore the working tree (default)
    #[arg(short = 'W', long)]
    pub worktree: bool,
}

pub fn run(args: &RestoreArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    // Neither flag means worktree-only.
    let staged = args.staged;
    let worktree = args.worktree || !args.staged;

    // Worktree restores default to the index as source; index restores
    // default to HEAD. An empty index falls back to HEAD.
    let index = repo.load_index()?;
    let source_map = match &args.source {
        Some(spec) => {
            let tree = repo.resolve_tree_ish(spec)?;
            repo.odb().require_tree(&tree)?.to_map()
        }
        None if staged => repo.head_tree_map()?,
        None if !index.is_empty() => index.entries().clone(),
        None => repo.head_tree_map()?,
    };

    // An empty pathspec (or `.`) selects everything in the source.
    let selected: Vec<String> = if args.paths.is_empty() || args.paths.iter().any(|p| p == ".") {
        source_map.keys().cloned().collect()
    } else {
        let mut out = Vec::new();
        for raw in &args.paths {
            out.push(repo.normalize(std::path::Path::new(raw))?);
        }
        out
    };

    let mut missing = Vec::new();
    let mut new_index = index.clone();

    for path in &selected {
        match source_map.get(path) {
            Some(oid) => {
                if worktree {
                    write_blob_file(&repo, path, oid)?;
                }
                if staged {
                    new_index.insert(path.clone(), *oid);
                }
            }
            None => {
                if staged && new_index.remove(path).is_some() {
                    continue;
                }
                missing.push(path.clone());
            }
        }
    }

    if staged {
        repo.save_index(&new_index)?;
    }

    for path in &missing {
        println!("pathspec '{path}' did not match any file(s)");
    }
    Ok(if missing.is_empty() { 0 } else { 1 })
}
