use anyhow::Result;
use clap::Args;
use rvs_merge::{merge, MergeOptions, MergeOutcome};

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct MergeArgs {
    /// Commit to merge into the current branch
    pub commit: String,

    /// Set the commit message for the merge commit
    #[arg(short, long)]
    pub message: Option<String>,

    /// Perform the merge but do not commit the result
    #[arg(long)]
    pub no_commit: bool,

    /// Create a merge commit even when the merge resolves as a fast-forward
    #[arg(long)]
    pub no_ff: bool,

    /// Refuse to merge unless the current HEAD can fast-forward
    #[arg(long)]
    pub ff_only: bool,

    /// Record the result as a single-parent commit
    #[arg(long)]
    pub squash: bool,
}

pub fn run(args: &MergeArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let opts = MergeOptions {
        no_ff: args.no_ff,
        ff_only: args.ff_only,
        squash: args.squash,
        no_commit: args.no_commit,
        message: args.message.clone(),
    };

    match merge(&repo, &args.commit, &opts)? {
        MergeOutcome::AlreadyUpToDate => {
            println!("Already up to date.");
        }
        MergeOutcome::FastForward { target } => {
            println!("Fast-forward to {}", target.short_hex());
        }
        MergeOutcome::Merged { commit, squash } => {
            if squash {
                println!("Squash merge from {}", args.commit);
            } else {
                println!("Merge made by the 'recursive' strategy.");
            }
            println!("Created merge commit {}", commit.short_hex());
        }
        MergeOutcome::AppliedWithoutCommit => {
            println!("Merge completed but not committed (--no-commit)");
        }
        MergeOutcome::Conflicts { paths } => {
            println!("CONFLICT (content): Merge conflict in the following files:");
            for path in &paths {
                println!("\t{path}");
            }
            println!("Automatic merge failed; fix conflicts and then commit the result.");
        }
    }

    Ok(0)
}
