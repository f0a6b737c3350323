//! The merge driver: classification, fast-forward, and three-way merge.

use std::collections::BTreeMap;

use rvs_checkout::materialize::{materialize_tree, update_index_to, write_blob_file};
use rvs_hash::ObjectId;
use rvs_object::{Commit, Object, Tree};
use rvs_ref::Head;
use rvs_repository::Repository;
use rvs_revwalk::{is_ancestor, merge_base};

use crate::tree_merge::merge_tree_maps;
use crate::MergeError;

/// Flags accepted by the merge driver.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Create a merge commit even when fast-forward is possible.
    pub no_ff: bool,
    /// Refuse anything but a fast-forward.
    pub ff_only: bool,
    /// Record the result as a single-parent commit.
    pub squash: bool,
    /// Apply the merge to working tree and index but create no commit.
    pub no_commit: bool,
    /// Commit message override.
    pub message: Option<String>,
}

/// Outcome of a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The target is already reachable from HEAD.
    AlreadyUpToDate,
    /// The branch ref advanced to the target; no commit was created.
    FastForward { target: ObjectId },
    /// A merge (or squash) commit was created.
    Merged { commit: ObjectId, squash: bool },
    /// Merge applied to working tree and index; no commit (`--no-commit`).
    AppliedWithoutCommit,
    /// Content conflicts were materialized; no commit was created.
    Conflicts { paths: Vec<String> },
}

/// Merge `target_spec` into the current branch.
pub fn merge(
    repo: &Repository,
    target_spec: &str,
    opts: &MergeOptions,
) -> Result<MergeOutcome, MergeError> {
    let head = repo.head()?;
    let ours = head.commit().ok_or(MergeError::NoCommits)?;
    let theirs = repo.resolve_commit_ish(target_spec)?;

    if ours == theirs {
        return Ok(MergeOutcome::AlreadyUpToDate);
    }

    // Already-up-to-date also covers a target strictly behind us.
    if is_ancestor(repo, &theirs, &ours)? {
        return Ok(MergeOutcome::AlreadyUpToDate);
    }

    let fast_forward_eligible = is_ancestor(repo, &ours, &theirs)?;
    if opts.ff_only && !fast_forward_eligible {
        return Err(MergeError::NotFastForward);
    }

    if fast_forward_eligible && !opts.no_ff {
        advance_head(repo, &head, &theirs)?;
        let map = repo.tree_map_of(&theirs)?;
        materialize_tree(repo, &map)?;
        update_index_to(repo, &map)?;
        return Ok(MergeOutcome::FastForward { target: theirs });
    }

    three_way(repo, &head, ours, theirs, target_spec, opts)
}

fn three_way(
    repo: &Repository,
    head: &Head,
    ours: ObjectId,
    theirs: ObjectId,
    target_spec: &str,
    opts: &MergeOptions,
) -> Result<MergeOutcome, MergeError> {
    // Unrelated histories merge against the empty tree.
    let base_map = match merge_base(repo, &ours, &theirs)? {
        Some(base) => repo.tree_map_of(&base)?,
        None => BTreeMap::new(),
    };
    let our_map = repo.tree_map_of(&ours)?;
    let their_map = repo.tree_map_of(&theirs)?;

    let result = merge_tree_maps(repo, &base_map, &our_map, &their_map)?;

    if !result.is_clean() {
        // Conflict files are already on disk; record the merged proposal in
        // the index and stop without a commit.
        update_index_to(repo, &result.merged)?;
        return Ok(MergeOutcome::Conflicts {
            paths: result.conflicts,
        });
    }

    // Apply the merged map: write each file, then stage it. Paths deleted by
    // the merge are already absent from the map and get removed on the next
    // materialization; the working tree only gains or changes files here.
    for (path, oid) in &result.merged {
        write_blob_file(repo, path, oid)?;
    }
    update_index_to(repo, &result.merged)?;

    if opts.no_commit {
        return Ok(MergeOutcome::AppliedWithoutCommit);
    }

    let branch_label = head.branch_name().unwrap_or("HEAD");
    let message = opts
        .message
        .clone()
        .unwrap_or_else(|| format!("Merge {target_spec} into {branch_label}"));

    let tree_oid = repo
        .odb()
        .write(&Object::Tree(Tree::from_map(&result.merged)))?;
    let parents = if opts.squash {
        vec![ours]
    } else {
        vec![ours, theirs]
    };
    let commit = Commit::new(tree_oid, parents, message, rvs_object::DEFAULT_AUTHOR);
    let commit_oid = repo.odb().write(&Object::Commit(commit))?;

    advance_head(repo, head, &commit_oid)?;

    Ok(MergeOutcome::Merged {
        commit: commit_oid,
        squash: opts.squash,
    })
}

/// Advance the current branch ref, or the detached HEAD file.
pub(crate) fn advance_head(
    repo: &Repository,
    head: &Head,
    target: &ObjectId,
) -> Result<(), MergeError> {
    match head {
        Head::Branch { name, .. } | Head::Unborn { name } => {
            repo.refs().set_branch(name, target)?;
        }
        Head::Detached(_) => {
            repo.refs().set_head_detached(target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvs_checkout::materialize::materialize_tree as materialize;
    use rvs_object::ObjectKind;
    use rvs_repository::init_repository;
    use std::collections::BTreeMap;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        init_repository(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        (dir, repo)
    }

    fn commit_tree(
        repo: &Repository,
        parents: Vec<ObjectId>,
        files: &[(&str, &str)],
    ) -> ObjectId {
        let mut map = BTreeMap::new();
        for (path, content) in files {
            let oid = repo
                .odb()
                .write_payload(ObjectKind::Blob, content.as_bytes())
                .unwrap();
            map.insert(path.to_string(), oid);
        }
        let tree = repo.odb().write(&Object::Tree(Tree::from_map(&map))).unwrap();
        repo.odb()
            .write(&Object::Commit(Commit::with_timestamp(
                tree, parents, "c", "tester", 0,
            )))
            .unwrap()
    }

    fn settle(repo: &Repository, branch: &str, oid: &ObjectId) {
        repo.refs().set_branch(branch, oid).unwrap();
        repo.refs().set_head_symbolic(branch).unwrap();
        let map = repo.tree_map_of(oid).unwrap();
        materialize(repo, &map).unwrap();
        update_index_to(repo, &map).unwrap();
    }

    #[test]
    fn merging_self_is_up_to_date() {
        let (_dir, repo) = fixture();
        let c1 = commit_tree(&repo, vec![], &[("a", "A\n")]);
        settle(&repo, "main", &c1);

        let outcome = merge(&repo, &c1.to_hex(), &MergeOptions::default()).unwrap();
        assert_eq!(outcome, MergeOutcome::AlreadyUpToDate);
    }

    #[test]
    fn target_behind_head_is_up_to_date() {
        let (_dir, repo) = fixture();
        let c1 = commit_tree(&repo, vec![], &[("a", "A\n")]);
        let c2 = commit_tree(&repo, vec![c1], &[("a", "B\n")]);
        settle(&repo, "main", &c2);

        let outcome = merge(&repo, &c1.to_hex(), &MergeOptions::default()).unwrap();
        assert_eq!(outcome, MergeOutcome::AlreadyUpToDate);
    }

    #[test]
    fn fast_forward_advances_ref_without_new_commit() {
        let (dir, repo) = fixture();
        let c1 = commit_tree(&repo, vec![], &[("a", "A\n")]);
        let c2 = commit_tree(&repo, vec![c1], &[("a", "A\n"), ("b", "B\n")]);
        settle(&repo, "main", &c1);
        repo.refs().set_branch("feature", &c2).unwrap();

        let before: Vec<_> = repo.odb().iter().unwrap().map(|r| r.unwrap()).collect();
        let outcome = merge(&repo, "feature", &MergeOptions::default()).unwrap();
        let after: Vec<_> = repo.odb().iter().unwrap().map(|r| r.unwrap()).collect();

        assert_eq!(outcome, MergeOutcome::FastForward { target: c2 });
        assert_eq!(repo.refs().resolve_branch("main").unwrap(), Some(c2));
        // No new objects were created by the fast-forward.
        assert_eq!(before.len(), after.len());
        assert!(dir.path().join("b").exists());
    }

    #[test]
    fn ff_only_fails_on_diverged_histories() {
        let (_dir, repo) = fixture();
        let base = commit_tree(&repo, vec![], &[("a", "A\n")]);
        let ours = commit_tree(&repo, vec![base], &[("a", "B\n")]);
        let theirs = commit_tree(&repo, vec![base], &[("a", "A\n"), ("c", "C\n")]);
        settle(&repo, "main", &ours);
        repo.refs().set_branch("feature", &theirs).unwrap();

        let opts = MergeOptions {
            ff_only: true,
            ..Default::default()
        };
        assert!(matches!(
            merge(&repo, "feature", &opts).unwrap_err(),
            MergeError::NotFastForward
        ));
    }

    #[test]
    fn no_ff_forces_merge_commit() {
        let (_dir, repo) = fixture();
        let c1 = commit_tree(&repo, vec![], &[("a", "A\n")]);
        let c2 = commit_tree(&repo, vec![c1], &[("a", "A\n"), ("b", "B\n")]);
        settle(&repo, "main", &c1);
        repo.refs().set_branch("feature", &c2).unwrap();

        let opts = MergeOptions {
            no_ff: true,
            ..Default::default()
        };
        let outcome = merge(&repo, "feature", &opts).unwrap();
        let MergeOutcome::Merged { commit, .. } = outcome else {
            panic!("expected merge commit, got {outcome:?}");
        };
        let merge_commit = repo.odb().require_commit(&commit).unwrap();
        assert_eq!(merge_commit.parents, vec![c1, c2]);
    }

    #[test]
    fn their_added_file_merges_cleanly() {
        // Spec scenario: base has a.txt only; theirs adds b.txt; ours
        // unchanged. Merge takes theirs and commits with two parents.
        let (dir, repo) = fixture();
        let base = commit_tree(&repo, vec![], &[("a.txt", "hi\n")]);
        let ours = base;
        let theirs = commit_tree(&repo, vec![base], &[("a.txt", "hi\n"), ("b.txt", "x")]);
        settle(&repo, "main", &ours);
        repo.refs().set_branch("feature", &theirs).unwrap();

        let opts = MergeOptions {
            no_ff: true,
            ..Default::default()
        };
        let outcome = merge(&repo, "feature", &opts).unwrap();
        let MergeOutcome::Merged { commit, .. } = outcome else {
            panic!("expected merge commit");
        };

        let merged = repo.odb().require_commit(&commit).unwrap();
        assert_eq!(merged.parents.len(), 2);
        assert!(dir.path().join("a.txt").exists());
        assert!(dir.path().join("b.txt").exists());
        assert_eq!(
            repo.refs().resolve_branch("main").unwrap(),
            Some(commit)
        );
    }

    #[test]
    fn conflicting_edits_stop_without_commit() {
        let (dir, repo) = fixture();
        let base = commit_tree(&repo, vec![], &[("f", "A\n")]);
        let ours = commit_tree(&repo, vec![base], &[("f", "B\n")]);
        let theirs = commit_tree(&repo, vec![base], &[("f", "C\n")]);
        settle(&repo, "main", &ours);
        repo.refs().set_branch("feature", &theirs).unwrap();

        let outcome = merge(&repo, "feature", &MergeOptions::default()).unwrap();
        assert_eq!(
            outcome,
            MergeOutcome::Conflicts {
                paths: vec!["f".to_string()]
            }
        );

        // Branch unchanged, marker file on disk.
        assert_eq!(repo.refs().resolve_branch("main").unwrap(), Some(ours));
        assert_eq!(
            fs::read(dir.path().join("f")).unwrap(),
            b"<<<<<<< HEAD\nB\n=======\nC\n>>>>>>> target\n".to_vec()
        );
    }

    #[test]
    fn squash_merge_records_single_parent() {
        let (_dir, repo) = fixture();
        let base = commit_tree(&repo, vec![], &[("a", "A\n")]);
        let ours = commit_tree(&repo, vec![base], &[("a", "A\n"), ("o", "O\n")]);
        let theirs = commit_tree(&repo, vec![base], &[("a", "A\n"), ("t", "T\n")]);
        settle(&repo, "main", &ours);
        repo.refs().set_branch("feature", &theirs).unwrap();

        let opts = MergeOptions {
            squash: true,
            ..Default::default()
        };
        let outcome = merge(&repo, "feature", &opts).unwrap();
        let MergeOutcome::Merged { commit, squash } = outcome else {
            panic!("expected squash commit");
        };
        assert!(squash);
        assert_eq!(
            repo.odb().require_commit(&commit).unwrap().parents,
            vec![ours]
        );
    }

    #[test]
    fn no_commit_applies_but_leaves_branch() {
        let (dir, repo) = fixture();
        let base = commit_tree(&repo, vec![], &[("a", "A\n")]);
        let ours = commit_tree(&repo, vec![base], &[("a", "A\n"), ("o", "O\n")]);
        let theirs = commit_tree(&repo, vec![base], &[("a", "A\n"), ("t", "T\n")]);
        settle(&repo, "main", &ours);
        repo.refs().set_branch("feature", &theirs).unwrap();

        let opts = MergeOptions {
            no_commit: true,
            ..Default::default()
        };
        let outcome = merge(&repo, "feature", &opts).unwrap();
        assert_eq!(outcome, MergeOutcome::AppliedWithoutCommit);
        assert_eq!(repo.refs().resolve_branch("main").unwrap(), Some(ours));
        assert!(dir.path().join("t").exists());
        assert!(repo.load_index().unwrap().contains("t"));
    }

    #[test]
    fn unrelated_histories_merge_against_empty_tree() {
        let (dir, repo) = fixture();
        let ours = commit_tree(&repo, vec![], &[("mine", "M\n")]);
        let theirs = commit_tree(&repo, vec![], &[("yours", "Y\n")]);
        settle(&repo, "main", &ours);
        repo.refs().set_branch("other", &theirs).unwrap();

        let outcome = merge(&repo, "other", &MergeOptions::default()).unwrap();
        assert!(matches!(outcome, MergeOutcome::Merged { .. }));
        assert!(dir.path().join("mine").exists());
        assert!(dir.path().join("yours").exists());
    }

    #[test]
    fn merge_on_unborn_branch_fails() {
        let (_dir, repo) = fixture();
        let c1 = commit_tree(&repo, vec![], &[("a", "A\n")]);
        repo.refs().set_branch("other", &c1).unwrap();
        repo.refs().set_head_symbolic("main").unwrap();

        assert!(matches!(
            merge(&repo, "other", &MergeOptions::default()).unwrap_err(),
            MergeError::NoCommits
        ));
    }
}
