//! Merge-base discovery.
//!
//! Ancestors of the target side are collected by following first parents and
//! merge parents into a set; the current side is then walked by first parents
//! and the first commit already in the set is the base. When the histories
//! share no commit the base is `None`, which callers treat as the empty tree.

use std::collections::{HashSet, VecDeque};

use rvs_hash::ObjectId;
use rvs_repository::Repository;

use crate::RevWalkError;

/// Collect every commit reachable from `tip`, following all parents.
pub fn ancestors_of(
    repo: &Repository,
    tip: &ObjectId,
) -> Result<HashSet<ObjectId>, RevWalkError> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(*tip);

    while let Some(oid) = queue.pop_front() {
        if !seen.insert(oid) {
            continue;
        }
        let commit = repo.odb().require_commit(&oid)?;
        for parent in &commit.parents {
            if !seen.contains(parent) {
                queue.push_back(*parent);
            }
        }
    }

    Ok(seen)
}

/// Find the merge base of `ours` and `theirs`.
///
/// Returns `None` when the two histories are unrelated; three-way merges then
/// use the empty tree as the base rather than either side.
pub fn merge_base(
    repo: &Repository,
    ours: &ObjectId,
    theirs: &ObjectId,
) -> Result<Option<ObjectId>, RevWalkError> {
    if ours == theirs {
        return Ok(Some(*ours));
    }

    let their_ancestors = ancestors_of(repo, theirs)?;

    let mut current = Some(*ours);
    let mut visited = HashSet::new();
    while let Some(oid) = current {
        if !visited.insert(oid) {
            break;
        }
        if their_ancestors.contains(&oid) {
            return Ok(Some(oid));
        }
        current = repo.odb().require_commit(&oid)?.first_parent();
    }

    Ok(None)
}

/// Check whether `ancestor` is reachable from `descendant`.
pub fn is_ancestor(
    repo: &Repository,
    ancestor: &ObjectId,
    descendant: &ObjectId,
) -> Result<bool, RevWalkError> {
    if ancestor == descendant {
        return Ok(true);
    }
    Ok(ancestors_of(repo, descendant)?.contains(ancestor))
}
