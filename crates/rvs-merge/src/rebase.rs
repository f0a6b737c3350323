//! Linear rebase: replay a range of commits onto a new base.
//!
//! Each replayed commit carries its original complete tree (not a diff), so
//! replaying cannot conflict; only the parent link changes. On any failure
//! the original branch pointer is left intact — the branch only moves after
//! the whole range has been rewritten.

use rvs_checkout::materialize::{materialize_tree, update_index_to};
use rvs_hash::ObjectId;
use rvs_object::{Commit, Object};
use rvs_repository::Repository;
use rvs_revwalk::commits_to_replay;

use crate::merge::advance_head;
use crate::MergeError;

/// Outcome of a rebase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseOutcome {
    /// Nothing to replay; the branch pointer is unchanged.
    UpToDate,
    /// The branch was replayed onto the upstream.
    Rebased {
        new_tip: ObjectId,
        replayed: Vec<ObjectId>,
    },
}

/// Rebase the current branch onto `upstream_spec`.
pub fn rebase(repo: &Repository, upstream_spec: &str) -> Result<RebaseOutcome, MergeError> {
    let head = repo.head()?;
    let tip = head.commit().ok_or(MergeError::NoCommits)?;
    let upstream = repo.resolve_commit_ish(upstream_spec)?;

    let range = commits_to_replay(repo, &tip, &upstream)?;
    if range.is_empty() {
        return Ok(RebaseOutcome::UpToDate);
    }

    let mut base = upstream;
    let mut replayed = Vec::with_capacity(range.len());
    for original_oid in &range {
        let original = repo.odb().require_commit(original_oid)?;
        let rewritten = Commit::new(
            original.tree,
            vec![base],
            original.message.clone(),
            original.author.clone(),
        );
        base = repo.odb().write(&Object::Commit(rewritten))?;
        replayed.push(base);
    }

    // All commits rewritten; only now does the branch move.
    advance_head(repo, &head, &base)?;
    let map = repo.tree_map_of(&base)?;
    materialize_tree(repo, &map)?;
    update_index_to(repo, &map)?;

    Ok(RebaseOutcome::Rebased {
        new_tip: base,
        replayed,
    })
}
