use anyhow::Result;
use clap::Args;
use rvs_merge::{rebase, RebaseOutcome};
use rvs_revwalk::commits_to_replay;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct RebaseArgs {
    /// Upstream branch or commit to replay onto
    pub upstream: String,

    /// List the commits about to be rebased before replaying them
    #[arg(short, long)]
    pub interactive: bool,
}

pub fn run(args: &RebaseArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    // The interactive list is informational; the replay is the same.
    if args.interactive {
        if let (Some(tip), Ok(upstream)) = (
            repo.head_commit()?,
            repo.resolve_commit_ish(&args.upstream),
        ) {
            for oid in commits_to_replay(&repo, &tip, &upstream)? {
                let commit = repo.odb().require_commit(&oid)?;
                let subject = commit.message.lines().next().unwrap_or_default();
                println!("pick {} {}", oid.short_hex(), subject);
            }
        }
    }

    match rebase(&repo, &args.upstream)? {
        RebaseOutcome::UpToDate => {
            println!("Current branch is up to date.");
        }
        RebaseOutcome::Rebased { new_tip, replayed } => {
            println!(
                "Successfully rebased {} commit(s) onto {}; HEAD is now at {}",
                replayed.len(),
                args.upstream,
                new_tip.short_hex()
            );
        }
    }

    Ok(0)
}
