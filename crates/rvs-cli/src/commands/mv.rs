use anyhow::{bail, Result};
use clap::Args;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct MvArgs {
    /// Source file
    pub source: String,
    /// Destination path
    pub destination: String,

    /// Overwrite an existing destination
    #[arg(short, long)]
    pub force: bool,
}

pub fn run(args: &MvArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let source = repo.normalize(std::path::Path::new(&args.source))?;
    let dest = repo.normalize(std::path::Path::new(&args.destination))?;

    let source_full = repo.work_dir().join(&source);
    let dest_full = repo.work_dir().join(&dest);

    if !source_full.exists() {
        bail!("bad source, source={}", args.source);
    }

    let mut index = repo.load_index()?;
    let Some(oid) = index.get(&source) else {
        bail!("not under version control, source={}", args.source);
    };

    if dest_full.exists() && !args.force {
        bail!(
            "destination exists, source={}, destination={}",
            args.source,
            args.destination
        );
    }

    if let Some(parent) = dest_full.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::rename(&source_full, &dest_full)?;

    index.remove(&source);
    index.insert(dest, oid);
    repo.save_index(&index)?;

    Ok(0)
}
