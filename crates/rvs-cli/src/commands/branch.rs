use anyhow::{bail, Result};
use clap::Args;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct BranchArgs {
    /// Branch to create at the current HEAD
    pub name: Option<String>,

    /// List branches
    #[arg(long)]
    pub list: bool,
}

pub fn run(args: &BranchArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    if args.list || args.name.is_none() {
        let current = repo.head()?.branch_name().map(str::to_string);
        for (name, _oid) in repo.refs().iter_branches()? {
            let marker = if Some(&name) == current.as_ref() { "* " } else { "  " };
            println!("{marker}{name}");
        }
        return Ok(0);
    }

    let name = args.name.as_deref().unwrap_or_default();
    match repo.head_commit()? {
        Some(oid) => {
            repo.refs().set_branch(name, &oid)?;
            Ok(0)
        }
        None => bail!("not a valid object name: 'HEAD'"),
    }
}
