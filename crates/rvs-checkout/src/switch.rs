//! Branch switching with the dirty-working-tree safety gate.

use std::fs;

use rvs_hash::ObjectId;
use rvs_index::Index;
use rvs_repository::Repository;

use crate::materialize::{materialize_tree, update_index_to, write_blob_file};
use crate::CheckoutError;

/// Flags accepted by the switch engine.
#[derive(Debug, Clone, Default)]
pub struct SwitchOptions {
    /// Create a new branch at the start point and switch to it.
    pub create: Option<String>,
    /// Create or reset a branch at the start point and switch to it.
    pub create_force: Option<String>,
    /// Detach HEAD at the resolved commit.
    pub detach: bool,
    /// Skip the safety gate, discarding local changes.
    pub force: bool,
    /// Create a new orphan branch (symbolic HEAD, cleared index).
    pub orphan: Option<String>,
    /// Allow switching to a branch checked out in another worktree.
    pub ignore_other_worktrees: bool,
}

/// What a successful switch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    SwitchedToBranch { name: String, target: ObjectId },
    CreatedBranch { name: String, target: ObjectId, reset: bool },
    DetachedAt(ObjectId),
    OrphanBranch { name: String },
}

/// Result of a path-scoped checkout.
#[derive(Debug, Clone, Default)]
pub struct PathCheckout {
    pub updated: Vec<String>,
    pub missing: Vec<String>,
}

/// Detect uncommitted changes against the current HEAD commit.
///
/// Dirty when any of: the index differs from the committed tree; a working
/// file's hash differs from its index entry; a committed path is absent from
/// the working tree.
pub fn is_dirty(repo: &Repository) -> Result<bool, CheckoutError> {
    let committed = repo.head_tree_map()?;
    let index = repo.load_index()?;
    let working = repo.scan_working_tree()?;

    if index.entries() != &committed {
        return Ok(true);
    }

    for (path, staged) in index.iter() {
        match working.get(path) {
            Some(actual) if actual == staged => {}
            _ => return Ok(true),
        }
    }

    for path in committed.keys() {
        if !working.contains_key(path) {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Switch working-tree state to `target` (a branch name or commit-ish).
pub fn switch(
    repo: &Repository,
    target: Option<&str>,
    opts: &SwitchOptions,
) -> Result<SwitchOutcome, CheckoutError> {
    if let Some(ref name) = opts.orphan {
        return create_orphan(repo, name);
    }

    if let Some(ref name) = opts.create {
        return create_and_switch(repo, name, target, false, opts);
    }
    if let Some(ref name) = opts.create_force {
        return create_and_switch(repo, name, target, true, opts);
    }

    let target = target.ok_or_else(|| {
        CheckoutError::Repo(rvs_repository::RepoError::InvalidRevision(
            "missing branch or commit argument".into(),
        ))
    })?;

    if opts.detach {
        let oid = repo.resolve_commit_ish(target)?;
        gate(repo, opts)?;
        enter_commit(repo, &oid)?;
        repo.refs().set_head_detached(&oid)?;
        return Ok(SwitchOutcome::DetachedAt(oid));
    }

    // A branch name wins over a commit-ish of the same spelling.
    if let Some(oid) = repo.refs().resolve_branch(target)? {
        if !opts.ignore_other_worktrees && checked_out_elsewhere(repo, target)? {
            return Err(CheckoutError::BranchCheckedOutElsewhere(target.to_string()));
        }
        gate(repo, opts)?;
        enter_commit(repo, &oid)?;
        repo.refs().set_head_symbolic(target)?;
        return Ok(SwitchOutcome::SwitchedToBranch {
            name: target.to_string(),
            target: oid,
        });
    }

    // Fall back to a bare commit, detaching.
    let oid = repo.resolve_commit_ish(target)?;
    gate(repo, opts)?;
    enter_commit(repo, &oid)?;
    repo.refs().set_head_detached(&oid)?;
    Ok(SwitchOutcome::DetachedAt(oid))
}

/// Path-scoped checkout: write the listed paths from a tree-ish into the
/// working tree. The index is deliberately not updated.
pub fn checkout_paths(
    repo: &Repository,
    tree_ish: &str,
    paths: &[String],
) -> Result<PathCheckout, CheckoutError> {
    let tree_oid = repo.resolve_tree_ish(tree_ish)?;
    let tree = repo.odb().require_tree(&tree_oid)?;
    let map = tree.to_map();

    let mut result = PathCheckout::default();
    for raw in paths {
        let path = repo.normalize(std::path::Path::new(raw))?;
        match map.get(&path) {
            Some(oid) => {
                write_blob_file(repo, &path, oid)?;
                result.updated.push(path);
            }
            None => result.missing.push(raw.clone()),
        }
    }
    Ok(result)
}

fn create_orphan(repo: &Repository, name: &str) -> Result<SwitchOutcome, CheckoutError> {
    if repo.refs().branch_exists(name) {
        return Err(CheckoutError::BranchExists(name.to_string()));
    }
    repo.refs().set_head_symbolic(name)?;
    Index::clear(&repo.index_path())?;
    Ok(SwitchOutcome::OrphanBranch {
        name: name.to_string(),
    })
}

fn create_and_switch(
    repo: &Repository,
    name: &str,
    start_point: Option<&str>,
    reset: bool,
    opts: &SwitchOptions,
) -> Result<SwitchOutcome, CheckoutError> {
    if !reset && repo.refs().branch_exists(name) {
        return Err(CheckoutError::BranchExists(name.to_string()));
    }

    let start = match start_point {
        Some(spec) => repo.resolve_commit_ish(spec)?,
        None => repo.head_commit()?.ok_or(CheckoutError::UnbornHead)?,
    };

    gate(repo, opts)?;
    repo.refs().set_branch(name, &start)?;
    enter_commit(repo, &start)?;
    repo.refs().set_head_symbolic(name)?;

    Ok(SwitchOutcome::CreatedBranch {
        name: name.to_string(),
        target: start,
        reset,
    })
}

/// Fail with `DirtyWorkingTree` unless `--force` was given.
fn gate(repo: &Repository, opts: &SwitchOptions) -> Result<(), CheckoutError> {
    if !opts.force && is_dirty(repo)? {
        return Err(CheckoutError::DirtyWorkingTree);
    }
    Ok(())
}

/// Materialize a commit's tree and set the index to match.
fn enter_commit(repo: &Repository, oid: &ObjectId) -> Result<(), CheckoutError> {
    let map = repo.tree_map_of(oid)?;
    materialize_tree(repo, &map)?;
    update_index_to(repo, &map)?;
    Ok(())
}

/// Check whether a branch is the HEAD of any other worktree (including the
/// primary one, when called from a linked worktree).
fn checked_out_elsewhere(repo: &Repository, branch: &str) -> Result<bool, CheckoutError> {
    let symbolic = format!("ref: refs/heads/{branch}");

    // The primary worktree's HEAD lives in the common dir.
    if repo.is_worktree() {
        let main_head = repo.common_dir().join("HEAD");
        if head_file_matches(&main_head, &symbolic) {
            return Ok(true);
        }
    }

    let worktrees = repo.worktrees_dir();
    let entries = match fs::read_dir(&worktrees) {
        Ok(e) => e,
        Err(_) => return Ok(false),
    };
    for entry in entries.flatten() {
        let meta = entry.path();
        if !meta.is_dir() || meta == repo.meta_dir() {
            continue;
        }
        if head_file_matches(&meta.join("HEAD"), &symbolic) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn head_file_matches(path: &std::path::Path, symbolic: &str) -> bool {
    fs::read_to_string(path)
        .map(|content| content.trim() == symbolic)
        .unwrap_or(false)
}
