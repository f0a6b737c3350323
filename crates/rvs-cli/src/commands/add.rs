use anyhow::Result;
use clap::Args;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct AddArgs {
    /// Paths to stage; `.` stages the whole tree and any deletions
    #[arg(required = true)]
    pub paths: Vec<String>,
}

pub fn run(args: &AddArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    rvs_snapshot::add(&repo, &args.paths)?;
    Ok(0)
}
