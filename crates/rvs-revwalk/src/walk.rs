use std::collections::HashSet;

use rvs_hash::ObjectId;
use rvs_repository::Repository;

use crate::RevWalkError;

/// Iterator over a commit's first-parent chain, newest first.
///
/// Cycles (which a well-formed graph cannot contain, but a corrupt one
/// might) terminate the walk instead of looping.
pub struct FirstParentWalk<'a> {
    repo: &'a Repository,
    next: Option<ObjectId>,
    visited: HashSet<ObjectId>,
}

impl<'a> FirstParentWalk<'a> {
    /// Start a walk at `tip`.
    pub fn new(repo: &'a Repository, tip: ObjectId) -> Self {
        Self {
            repo,
            next: Some(tip),
            visited: HashSet::new(),
        }
    }
}

impl Iterator for FirstParentWalk<'_> {
    type Item = Result<ObjectId, RevWalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if !self.visited.insert(current) {
            return None;
        }

        match self.repo.odb().require_commit(&current) {
            Ok(commit) => {
                self.next = commit.first_parent();
                Some(Ok(current))
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// Compute the ordered list of commits on `tip` that are not reachable from
/// `upstream` by first parents, oldest first — the commits a rebase replays.
///
/// The walk goes back from `tip`, stopping at `upstream` or at an
/// already-visited commit, and the collected list is reversed to
/// chronological order. An empty result means the branch is up to date.
pub fn commits_to_replay(
    repo: &Repository,
    tip: &ObjectId,
    upstream: &ObjectId,
) -> Result<Vec<ObjectId>, RevWalkError> {
    let mut commits = Vec::new();
    for result in FirstParentWalk::new(repo, *tip) {
        let oid = result?;
        if oid == *upstream {
            break;
        }
        commits.push(oid);
    }
    commits.reverse();
    Ok(commits)
}
