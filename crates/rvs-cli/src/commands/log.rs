use anyhow::Result;
use clap::Args;
use rvs_revwalk::FirstParentWalk;

use super::{format_commit_date, open_repo};
use crate::Cli;

#[derive(Args)]
pub struct LogArgs {
    /// Limit the number of commits shown
    #[arg(short = 'n', long = "max-count", default_value_t = 10)]
    pub max_count: usize,

    /// One line per commit
    #[arg(long)]
    pub oneline: bool,

    /// Draw a text graph of the history
    #[arg(long)]
    pub graph: bool,
}

pub fn run(args: &LogArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let Some(tip) = repo.head_commit()? else {
        println!("No commits found");
        return Ok(0);
    };
    let branch = repo.head()?.branch_name().map(str::to_string);

    for (i, result) in FirstParentWalk::new(&repo, tip)
        .take(args.max_count)
        .enumerate()
    {
        let oid = result?;
        let commit = repo.odb().require_commit(&oid)?;

        let decoration = if i == 0 {
            match &branch {
                Some(name) => format!(" (HEAD -> {name})"),
                None => " (HEAD)".to_string(),
            }
        } else {
            String::new()
        };

        let graph_prefix = if args.graph { "* " } else { "" };

        if args.oneline {
            let subject = commit.message.lines().next().unwrap_or_default();
            println!("{}{}{} {}", graph_prefix, oid.short_hex(), decoration, subject);
        } else {
            println!("{}commit {}{}", graph_prefix, oid.to_hex(), decoration);
            println!("Author: {} <rvs@example.com>", commit.author);
            println!("Date:   {}", format_commit_date(commit.timestamp));
            println!();
            for line in commit.message.lines() {
                println!("    {line}");
            }
            println!();
        }
    }

    Ok(0)
}
