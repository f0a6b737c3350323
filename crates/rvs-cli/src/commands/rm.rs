use anyhow::{bail, Result};
use clap::Args;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct RmArgs {
    /// Files to remove
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Only remove from the index
    #[arg(long)]
    pub cached: bool,

    /// Allow recursive removal when a leading directory name is given
    #[arg(short, long)]
    pub recursive: bool,

    /// Override the up-to-date check
    #[arg(short, long)]
    pub force: bool,
}

pub fn run(args: &RmArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let committed = repo.head_tree_map()?;
    let mut index = repo.load_index()?;

    // Expand each pathspec against the index (tracked paths only).
    let mut selected: Vec<String> = Vec::new();
    for raw in &args.paths {
        let normalized = repo.normalize(std::path::Path::new(raw))?;
        if index.contains(&normalized) {
            selected.push(normalized);
            continue;
        }

        let dir_prefix = format!("{normalized}/");
        let under_dir: Vec<String> = index
            .iter()
            .map(|(p, _)| p.clone())
            .filter(|p| p.starts_with(&dir_prefix))
            .collect();
        if !under_dir.is_empty() {
            if !args.recursive {
                bail!("not removing '{raw}' recursively without -r");
            }
            selected.extend(under_dir);
            continue;
        }

        bail!("pathspec '{raw}' did not match any files");
    }

    // Refuse to drop content that differs from HEAD unless forced.
    if !args.force {
        for path in &selected {
            let staged = index.get(path);
            if staged != committed.get(path).copied() {
                bail!(
                    "'{path}' has changes staged in the index\n\
                     (use --force to remove anyway)"
                );
            }
        }
    }

    for path in &selected {
        index.remove(path);
        if !args.cached {
            let full = repo.work_dir().join(path);
            if full.exists() {
                std::fs::remove_file(&full)?;
            }
        }
        println!("rm '{path}'");
    }

    repo.save_index(&index)?;
    Ok(0)
}
