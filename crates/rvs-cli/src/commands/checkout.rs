use std::io::Write;

use anyhow::Result;
use clap::Args;
use rvs_checkout::{checkout_paths, switch, SwitchOptions, SwitchOutcome};

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct CheckoutArgs {
    /// Branch name or commit to check out
    pub target: Option<String>,

    /// Limit checkout to specific paths (after `--`)
    #[arg(last = true)]
    pub paths: Vec<String>,

    /// Create and checkout a new branch
    #[arg(short = 'b', value_name = "new-branch")]
    pub create_branch: Option<String>,

    /// Create or reset and checkout a branch
    #[arg(short = 'B', value_name = "new-branch")]
    pub force_create_branch: Option<String>,

    /// Detach HEAD at the named commit
    #[arg(long)]
    pub detach: bool,

    /// Force checkout (lose local changes)
    #[arg(short, long)]
    pub force: bool,
}

pub fn run(args: &CheckoutArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let stderr = std::io::stderr();
    let mut err = stderr.lock();

    // Path-scoped form: restore files from a tree-ish, index untouched.
    if !args.paths.is_empty() {
        let source = args.target.as_deref().unwrap_or("HEAD");
        let result = checkout_paths(&repo, source, &args.paths)?;
        for path in &result.updated {
            println!("Updated {path}");
        }
        for path in &result.missing {
            println!("pathspec '{path}' did not match any files");
        }
        return Ok(if result.missing.is_empty() { 0 } else { 1 });
    }

    if args.target.is_none() && args.create_branch.is_none() && args.force_create_branch.is_none()
    {
        let head = repo.head()?;
        match head.branch_name() {
            Some(name) => println!("On branch {name}"),
            None => println!("HEAD detached"),
        }
        return Ok(0);
    }

    let opts = SwitchOptions {
        create: args.create_branch.clone(),
        create_force: args.force_create_branch.clone(),
        detach: args.detach,
        force: args.force,
        orphan: None,
        ignore_other_worktrees: false,
    };

    match switch(&repo, args.target.as_deref(), &opts)? {
        SwitchOutcome::SwitchedToBranch { name, .. } => {
            writeln!(err, "Switched to branch '{name}'")?;
        }
        SwitchOutcome::CreatedBranch { name, reset, target } => {
            if reset {
                writeln!(err, "Reset branch '{}' to {}", name, target.short_hex())?;
            } else {
                writeln!(err, "Switched to a new branch '{name}'")?;
            }
        }
        SwitchOutcome::DetachedAt(oid) => {
            writeln!(err, "HEAD is now at {} (detached)", oid.short_hex())?;
        }
        SwitchOutcome::OrphanBranch { name } => {
            writeln!(err, "Switched to a new branch '{name}'")?;
        }
    }

    Ok(0)
}
