use anyhow::Result;
use clap::Args;
use rvs_ref::Head;

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct StatusArgs {}

pub fn run(_args: &StatusArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;

    let head = repo.head()?;
    match &head {
        Head::Branch { name, .. } | Head::Unborn { name } => println!("On branch {name}"),
        Head::Detached(oid) => println!("HEAD detached at {}", oid.short_hex()),
    }

    let has_commits = head.commit().is_some();
    if !has_commits {
        println!();
        println!("No commits yet");
    }

    let committed = repo.head_tree_map()?;
    let index = repo.load_index()?;
    let working = repo.scan_working_tree()?;

    // Staged changes: index vs committed tree.
    let mut to_commit: Vec<(&str, String)> = Vec::new();
    for (path, staged) in index.iter() {
        match committed.get(path) {
            None => to_commit.push(("new file", path.clone())),
            Some(oid) if oid != staged => to_commit.push(("modified", path.clone())),
            Some(_) => {}
        }
    }
    for path in committed.keys() {
        if !index.contains(path) {
            to_commit.push(("deleted", path.clone()));
        }
    }

    // Unstaged changes: working tree vs index (or committed for untracked-
    // by-index paths).
    let mut modified: Vec<String> = Vec::new();
    for (path, actual) in &working {
        if let Some(staged) = index.get(path) {
            if staged != *actual {
                modified.push(path.clone());
            }
        } else if let Some(committed_oid) = committed.get(path) {
            if committed_oid != actual {
                modified.push(path.clone());
            }
        }
    }
    let mut deleted: Vec<String> = Vec::new();
    for path in committed.keys() {
        if index.contains(path) && !working.contains_key(path) {
            deleted.push(path.clone());
        }
    }

    // Untracked: neither committed nor staged.
    let untracked: Vec<&String> = working
        .keys()
        .filter(|p| !committed.contains_key(*p) && !index.contains(p))
        .collect();

    if !to_commit.is_empty() {
        println!();
        println!("Changes to be committed:");
        if has_commits {
            println!("  (use \"rvs restore --staged <file>...\" to unstage)");
        } else {
            println!("  (use \"rvs rm --cached <file>...\" to unstage)");
        }
        for (kind, path) in &to_commit {
            println!("\t{kind}:   {path}");
        }
    }

    if !modified.is_empty() || !deleted.is_empty() {
        println!();
        println!("Changes not staged for commit:");
        println!("  (use \"rvs add <file>...\" to update what will be committed)");
        println!("  (use \"rvs restore <file>...\" to discard changes in working directory)");
        for path in &modified {
            println!("\tmodified:   {path}");
        }
        for path in &deleted {
            println!("\tdeleted:    {path}");
        }
    }

    if !untracked.is_empty() {
        println!();
        println!("Untracked files:");
        println!("  (use \"rvs add <file>...\" to include in what will be committed)");
        for path in &untracked {
            println!("\t{path}");
        }
    }

    if to_commit.is_empty() && modified.is_empty() && deleted.is_empty() {
        println!();
        if !untracked.is_empty() {
            println!("nothing added to commit but untracked files present (use \"rvs add\" to track)");
        } else if has_commits {
            println!("nothing to commit, working tree clean");
        } else {
            println!("nothing to commit (create/copy files and use \"rvs add\" to track)");
        }
    }

    Ok(0)
}
