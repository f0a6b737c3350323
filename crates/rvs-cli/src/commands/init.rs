use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rvs_repository::{init_repository, META_DIR};

use crate::Cli;

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    pub directory: Option<PathBuf>,
}

pub fn run(args: &InitArgs, _cli: &Cli) -> Result<i32> {
    let path = args
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    if !path.exists() {
        std::fs::create_dir_all(&path)?;
    }

    let created = init_repository(&path)?;
    let meta = std::fs::canonicalize(&path)?.join(META_DIR);
    if created {
        println!("Initialized empty RVS repository in {}", meta.display());
    } else {
        println!("Reinitialized existing RVS repository in {}", meta.display());
    }
    Ok(0)
}
