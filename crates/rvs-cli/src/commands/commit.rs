use anyhow::Result;
use clap::Args;
use rvs_snapshot::CommitOutcome;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct CommitArgs {
    /// Commit message
    #[arg(short, long, required = true)]
    pub message: String,
}

pub fn run(args: &CommitArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    match rvs_snapshot::commit(&repo, &args.message)? {
        CommitOutcome::NothingToCommit => {
            let head = repo.head()?;
            match head.branch_name() {
                Some(branch) => println!("On branch {branch}"),
                None => println!("HEAD detached"),
            }
            println!("nothing to commit, working tree clean");
            Ok(0)
        }
        CommitOutcome::Created {
            commit,
            branch,
            root,
            stats,
        } => {
            let label = branch.as_deref().unwrap_or("detached HEAD");
            let root_text = if root { " (root-commit)" } else { "" };
            println!(
                "[{}{} {}] {}",
                label,
                root_text,
                commit.short_hex(),
                args.message
            );

            let files_changed = stats.files_changed();
            if files_changed > 0 {
                let mut parts = vec![if files_changed == 1 {
                    "1 file changed".to_string()
                } else {
                    format!("{files_changed} files changed")
                }];
                if stats.insertions > 0 {
                    parts.push(format!("{} insertions(+)", stats.insertions));
                }
                if stats.deletions > 0 {
                    parts.push(format!("{} deletions(-)", stats.deletions));
                }
                println!(" {}", parts.join(", "));
            }

            for path in &stats.new_files {
                println!(" create mode 100644 {path}");
            }
            for path in &stats.deleted_files {
                println!(" delete mode 100644 {path}");
            }
            Ok(0)
        }
    }
}
