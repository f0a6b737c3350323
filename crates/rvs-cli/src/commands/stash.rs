use anyhow::Result;
use clap::{Args, Subcommand};
use rvs_stash::SaveOutcome;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct StashArgs {
    #[command(subcommand)]
    pub command: Option<StashCommand>,
}

#[derive(Subcommand)]
pub enum StashCommand {
    /// Save local changes to a new stash entry (default)
    Save {
        /// Stash message
        message: Option<String>,
        /// Include untracked files
        #[arg(short = 'u', long)]
        include_untracked: bool,
    },
    /// List stash entries
    List,
    /// Show the files touched by a stash entry
    Show {
        #[arg(default_value = "0")]
        stash: usize,
    },
    /// Apply a stash entry and drop it
    Pop {
        #[arg(default_value = "0")]
        stash: usize,
    },
    /// Apply a stash entry, keeping it on the stack
    Apply {
        #[arg(default_value = "0")]
        stash: usize,
    },
    /// Remove a stash entry
    Drop {
        #[arg(default_value = "0")]
        stash: usize,
    },
}

pub fn run(args: &StashArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    match args.command.as_ref().unwrap_or(&StashCommand::Save {
        message: None,
        include_untracked: false,
    }) {
        StashCommand::Save {
            message,
            include_untracked,
        } => match rvs_stash::save(&repo, message.clone(), *include_untracked)? {
            SaveOutcome::NoChanges => println!("No local changes to save"),
            SaveOutcome::Saved { message } => {
                println!("Saved working directory and index state {message}");
            }
        },
        StashCommand::List => {
            for (i, record) in rvs_stash::load_stack(&repo)?.iter().enumerate() {
                println!("stash@{{{i}}}: {}", record.message);
            }
        }
        StashCommand::Show { stash } => {
            let stack = rvs_stash::load_stack(&repo)?;
            if let Some(record) = stack.get(*stash) {
                let modified = record.modified_paths();
                for path in &modified {
                    println!(" {path}");
                }
                println!(
                    " {} file{} changed",
                    modified.len(),
                    if modified.len() == 1 { "" } else { "s" }
                );
            }
        }
        StashCommand::Pop { stash } => {
            let record = rvs_stash::pop(&repo, *stash)?;
            println!("Dropped stash@{{{stash}}} ({})", record.message);
        }
        StashCommand::Apply { stash } => {
            rvs_stash::apply(&repo, *stash)?;
            if let Some(branch) = repo.head()?.branch_name() {
                println!("On branch {branch}");
            }
        }
        StashCommand::Drop { stash } => {
            let record = rvs_stash::drop_entry(&repo, *stash)?;
            println!("Dropped stash@{{{stash}}} ({})", record.message);
        }
    }

    Ok(0)
}
