use std::io::Write;

use anyhow::Result;
use clap::Args;
use rvs_checkout::{switch, SwitchOptions, SwitchOutcome};
use rvs_ref::Head;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct SwitchArgs {
    /// Branch or commit to switch to
    pub target: Option<String>,

    /// Create a new branch and switch to it
    #[arg(short = 'c', long = "create", value_name = "new-branch")]
    pub create: Option<String>,

    /// Create or reset a branch and switch to it
    #[arg(short = 'C', long = "force-create", value_name = "new-branch")]
    pub force_create: Option<String>,

    /// Switch to a commit for inspection and discardable experiments
    #[arg(long)]
    pub detach: bool,

    /// Force switch (discard local changes)
    #[arg(short, long)]
    pub force: bool,

    /// Create a new orphan branch
    #[arg(long, value_name = "new-branch")]
    pub orphan: Option<String>,

    /// Switch even if the branch is checked out in another worktree
    #[arg(long)]
    pub ignore_other_worktrees: bool,
}

pub fn run(args: &SwitchArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let stderr = std::io::stderr();
    let mut err = stderr.lock();

    // Bare `switch` reports where we are.
    if args.target.is_none()
        && args.create.is_none()
        && args.force_create.is_none()
        && args.orphan.is_none()
    {
        match repo.head()? {
            Head::Branch { name, .. } | Head::Unborn { name } => println!("On branch {name}"),
            Head::Detached(oid) => println!("HEAD detached at {}", oid.short_hex()),
        }
        return Ok(0);
    }

    let opts = SwitchOptions {
        create: args.create.clone(),
        create_force: args.force_create.clone(),
        detach: args.detach,
        force: args.force,
        orphan: args.orphan.clone(),
        ignore_other_worktrees: args.ignore_other_worktrees,
    };

    match switch(&repo, args.target.as_deref(), &opts)? {
        SwitchOutcome::SwitchedToBranch { name, .. } => {
            writeln!(err, "Switched to branch '{name}'")?;
        }
        SwitchOutcome::CreatedBranch { name, reset, .. } => {
            if reset {
                writeln!(err, "Reset branch '{name}'")?;
            } else {
                writeln!(err, "Switched to a new branch '{name}'")?;
            }
        }
        SwitchOutcome::DetachedAt(oid) => {
            writeln!(err, "HEAD is now at {}", oid.short_hex())?;
        }
        SwitchOutcome::OrphanBranch { name } => {
            writeln!(err, "Switched to a new branch '{name}'")?;
        }
    }

    Ok(0)
}
