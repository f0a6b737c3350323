pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod diff_tree;
pub mod init;
pub mod log;
pub mod ls_files;
pub mod ls_tree;
pub mod merge;
pub mod mv;
pub mod rebase;
pub mod reset;
pub mod restore;
pub mod rm;
pub mod show;
pub mod stash;
pub mod status;
pub mod switch;
pub mod worktree;

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Subcommand;
use rvs_hash::ObjectId;
use rvs_repository::Repository;

use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty repository or reinitialize an existing one
    Init(init::InitArgs),
    /// Add file contents to the index
    Add(add::AddArgs),
    /// Record changes to the repository
    Commit(commit::CommitArgs),
    /// Show the working tree status
    Status(status::StatusArgs),
    /// Show commit logs
    Log(log::LogArgs),
    /// List or create branches
    Branch(branch::BranchArgs),
    /// Switch branches or restore working tree files
    Checkout(checkout::CheckoutArgs),
    /// Switch branches
    Switch(switch::SwitchArgs),
    /// Join two development histories together
    Merge(merge::MergeArgs),
    /// Reapply commits on top of another base tip
    Rebase(rebase::RebaseArgs),
    /// Restore working tree files
    Restore(restore::RestoreArgs),
    /// Remove files from the working tree and from the index
    Rm(rm::RmArgs),
    /// Move or rename a file or a directory
    Mv(mv::MvArgs),
    /// Show information about files in the index and the working tree
    LsFiles(ls_files::LsFilesArgs),
    /// List the contents of a tree object
    LsTree(ls_tree::LsTreeArgs),
    /// Show changes between commits, commit and working tree, etc
    Diff(diff::DiffArgs),
    /// Compare the trees of two commits
    DiffTree(diff_tree::DiffTreeArgs),
    /// Show various types of objects
    Show(show::ShowArgs),
    /// Reset current HEAD to the specified state
    Reset(reset::ResetArgs),
    /// Stash the changes in a dirty working directory
    Stash(stash::StashArgs),
    /// Manage multiple working trees
    Worktree(worktree::WorktreeArgs),
}

/// Open the repository at the current directory.
pub fn open_repo(_cli: &Cli) -> Result<Repository> {
    Ok(Repository::open(".")?)
}

pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Init(args) => init::run(args, &cli),
        Commands::Add(args) => add::run(args, &cli),
        Commands::Commit(args) => commit::run(args, &cli),
        Commands::Status(args) => status::run(args, &cli),
        Commands::Log(args) => log::run(args, &cli),
        Commands::Branch(args) => branch::run(args, &cli),
        Commands::Checkout(args) => checkout::run(args, &cli),
        Commands::Switch(args) => switch::run(args, &cli),
        Commands::Merge(args) => merge::run(args, &cli),
        Commands::Rebase(args) => rebase::run(args, &cli),
        Commands::Restore(args) => restore::run(args, &cli),
        Commands::Rm(args) => rm::run(args, &cli),
        Commands::Mv(args) => mv::run(args, &cli),
        Commands::LsFiles(args) => ls_files::run(args, &cli),
        Commands::LsTree(args) => ls_tree::run(args, &cli),
        Commands::Diff(args) => diff::run(args, &cli),
        Commands::DiffTree(args) => diff_tree::run(args, &cli),
        Commands::Show(args) => show::run(args, &cli),
        Commands::Reset(args) => reset::run(args, &cli),
        Commands::Stash(args) => stash::run(args, &cli),
        Commands::Worktree(args) => worktree::run(args, &cli),
    }
}

/// How to render a tree-map comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffFormat {
    Patch,
    NameOnly,
    NameStatus,
}

/// Render the difference between two path → blob maps.
///
/// Shared by `diff`, `diff-tree`, and `show`: paths in the union are
/// classified added/modified/deleted and printed as names, statuses, or
/// unified patches.
pub fn print_map_diff(
    repo: &Repository,
    old: &BTreeMap<String, ObjectId>,
    new: &BTreeMap<String, ObjectId>,
    format: DiffFormat,
) -> Result<()> {
    let all_paths: std::collections::BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    for path in all_paths {
        let old_oid = old.get(path);
        let new_oid = new.get(path);
        if old_oid == new_oid {
            continue;
        }

        let status = match (old_oid, new_oid) {
            (None, Some(_)) => 'A',
            (Some(_), None) => 'D',
            _ => 'M',
        };

        match format {
            DiffFormat::NameOnly => println!("{path}"),
            DiffFormat::NameStatus => println!("{status}\t{path}"),
            DiffFormat::Patch => {
                let old_data = read_opt_blob(repo, old_oid)?;
                let new_data = read_opt_blob(repo, new_oid)?;
                let old_label = match old_oid {
                    Some(_) => format!("a/{path}"),
                    None => "/dev/null".to_string(),
                };
                let new_label = match new_oid {
                    Some(_) => format!("b/{path}"),
                    None => "/dev/null".to_string(),
                };
                print!(
                    "{}",
                    rvs_diff::format_unified(&old_label, &new_label, &old_data, &new_data)
                );
            }
        }
    }

    Ok(())
}

fn read_opt_blob(repo: &Repository, oid: Option<&ObjectId>) -> Result<Vec<u8>> {
    match oid {
        Some(oid) => Ok(repo.odb().require_blob(oid)?.data),
        None => Ok(Vec::new()),
    }
}

/// Format a timestamp the way `log` and `show` print dates.
pub fn format_commit_date(timestamp: i64) -> String {
    use chrono::{Local, TimeZone};
    match Local.timestamp_opt(timestamp, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%a %b %d %H:%M:%S %Y %z").to_string(),
        _ => String::new(),
    }
}
