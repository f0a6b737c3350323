//! Commit creation: compose the next tree from the parent tree and the
//! index, write the objects, advance the ref, and settle the index.

use std::collections::BTreeMap;

use rvs_hash::ObjectId;
use rvs_index::Index;
use rvs_object::{Commit, Object, Tree, DEFAULT_AUTHOR};
use rvs_ref::Head;
use rvs_repository::hooks::{HookKind, HookRunner};
use rvs_repository::Repository;

use crate::SnapshotError;

/// Per-commit change statistics for the caller to report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub new_files: Vec<String>,
    pub modified_files: Vec<String>,
    pub deleted_files: Vec<String>,
    /// Line counts of added files.
    pub insertions: usize,
    /// Line counts of deleted files.
    pub deletions: usize,
}

impl CommitStats {
    pub fn files_changed(&self) -> usize {
        self.new_files.len() + self.modified_files.len() + self.deleted_files.len()
    }
}

/// Outcome of a commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The composed tree equals the parent tree.
    NothingToCommit,
    Created {
        commit: ObjectId,
        /// Branch the commit landed on; `None` for a detached HEAD.
        branch: Option<String>,
        /// Whether this is a root commit (no parent).
        root: bool,
        stats: CommitStats,
    },
}

/// Create a commit from the current index.
pub fn commit(repo: &Repository, message: &str) -> Result<CommitOutcome, SnapshotError> {
    let head = repo.head()?;
    let parent = head.commit();

    let parent_map = match parent {
        Some(oid) => repo.tree_map_of(&oid)?,
        None => BTreeMap::new(),
    };
    let index = repo.load_index()?;

    let tree_map = compose_tree(repo, &parent_map, &index);
    if tree_map == parent_map {
        return Ok(CommitOutcome::NothingToCommit);
    }

    let hooks = HookRunner::new(repo);
    if !hooks.run(HookKind::PreCommit)?.success() {
        return Err(SnapshotError::HookRejected);
    }

    let stats = compute_stats(repo, &parent_map, &tree_map)?;

    let tree_oid = repo.odb().write(&Object::Tree(Tree::from_map(&tree_map)))?;
    let commit_obj = Commit::new(
        tree_oid,
        parent.into_iter().collect(),
        message,
        DEFAULT_AUTHOR,
    );
    let commit_oid = repo.odb().write(&Object::Commit(commit_obj))?;

    let branch = match &head {
        Head::Branch { name, .. } | Head::Unborn { name } => {
            repo.refs().set_branch(name, &commit_oid)?;
            Some(name.clone())
        }
        Head::Detached(_) => {
            repo.refs().set_head_detached(&commit_oid)?;
            None
        }
    };

    // Post-condition: index equals the committed tree.
    repo.save_index(&Index::from_map(tree_map))?;

    // Advisory; a failing post-commit hook does not undo the commit.
    let _ = hooks.run(HookKind::PostCommit)?;

    Ok(CommitOutcome::Created {
        commit: commit_oid,
        branch,
        root: parent.is_none(),
        stats,
    })
}

/// Compose the next tree: the index overrides the parent tree, and a parent
/// path missing from the index is dropped only when the working file is also
/// gone (a staged deletion).
fn compose_tree(
    repo: &Repository,
    parent_map: &BTreeMap<String, ObjectId>,
    index: &Index,
) -> BTreeMap<String, ObjectId> {
    let mut tree = BTreeMap::new();

    for (path, oid) in parent_map {
        if index.contains(path) {
            continue; // index entry below wins
        }
        if repo.work_dir().join(path).exists() {
            tree.insert(path.clone(), *oid);
        }
    }

    for (path, oid) in index.iter() {
        tree.insert(path.clone(), *oid);
    }

    tree
}

fn compute_stats(
    repo: &Repository,
    parent_map: &BTreeMap<String, ObjectId>,
    tree_map: &BTreeMap<String, ObjectId>,
) -> Result<CommitStats, SnapshotError> {
    let mut stats = CommitStats::default();

    for (path, oid) in tree_map {
        match parent_map.get(path) {
            None => {
                stats.insertions += repo.odb().require_blob(oid)?.line_count();
                stats.new_files.push(path.clone());
            }
            Some(parent_oid) if parent_oid != oid => {
                stats.modified_files.push(path.clone());
            }
            Some(_) => {}
        }
    }

    for (path, oid) in parent_map {
        if !tree_map.contains_key(path) {
            stats.deletions += repo.odb().require_blob(oid)?.line_count();
            stats.deleted_files.push(path.clone());
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::add;
    use rvs_repository::init_repository;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        init_repository(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn first_commit_creates_branch_ref() {
        let (dir, repo) = fixture();
        fs::write(dir.path().join("a.txt"), "hi\n").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();

        let outcome = commit(&repo, "c1").unwrap();
        let CommitOutcome::Created {
            commit: oid,
            branch,
            root,
            stats,
        } = outcome
        else {
            panic!("expected a commit");
        };

        assert!(root);
        assert_eq!(branch.as_deref(), Some("main"));
        assert_eq!(repo.refs().resolve_branch("main").unwrap(), Some(oid));
        assert_eq!(stats.new_files, vec!["a.txt".to_string()]);
        assert_eq!(stats.insertions, 1);

        // The commit's tree contains exactly one record for a.txt.
        let commit_obj = repo.odb().require_commit(&oid).unwrap();
        let tree = repo.odb().require_tree(&commit_obj.tree).unwrap();
        let index = repo.load_index().unwrap();
        let payload = String::from_utf8(tree.serialize_payload()).unwrap();
        assert_eq!(
            payload,
            format!("blob {} a.txt", index.get("a.txt").unwrap().to_hex())
        );
        assert!(commit_obj.first_parent().is_none());
    }

    #[test]
    fn index_equals_committed_tree_afterwards() {
        let (dir, repo) = fixture();
        fs::write(dir.path().join("a.txt"), "hi\n").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        commit(&repo, "c1").unwrap();

        let head = repo.head_commit().unwrap().unwrap();
        assert_eq!(
            repo.load_index().unwrap().entries(),
            &repo.tree_map_of(&head).unwrap()
        );
    }

    #[test]
    fn unchanged_tree_is_nothing_to_commit() {
        let (dir, repo) = fixture();
        fs::write(dir.path().join("a.txt"), "hi\n").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        commit(&repo, "c1").unwrap();

        assert_eq!(commit(&repo, "again").unwrap(), CommitOutcome::NothingToCommit);
    }

    #[test]
    fn second_commit_links_parent() {
        let (dir, repo) = fixture();
        fs::write(dir.path().join("a.txt"), "hi\n").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        let CommitOutcome::Created { commit: c1, .. } = commit(&repo, "c1").unwrap() else {
            panic!()
        };

        fs::write(dir.path().join("a.txt"), "hi\nthere\n").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        let CommitOutcome::Created {
            commit: c2, stats, ..
        } = commit(&repo, "c2").unwrap()
        else {
            panic!()
        };

        let commit_obj = repo.odb().require_commit(&c2).unwrap();
        assert_eq!(commit_obj.first_parent(), Some(c1));
        assert_eq!(stats.modified_files, vec!["a.txt".to_string()]);
    }

    #[test]
    fn staged_deletion_drops_path_from_tree() {
        let (dir, repo) = fixture();
        fs::write(dir.path().join("a.txt"), "one\ntwo\n").unwrap();
        fs::write(dir.path().join("b.txt"), "b\n").unwrap();
        add(&repo, &[".".to_string()]).unwrap();
        commit(&repo, "c1").unwrap();

        fs::remove_file(dir.path().join("a.txt")).unwrap();
        add(&repo, &[".".to_string()]).unwrap();
        let CommitOutcome::Created {
            commit: c2, stats, ..
        } = commit(&repo, "c2").unwrap()
        else {
            panic!()
        };

        let map = repo.tree_map_of(&c2).unwrap();
        assert!(!map.contains_key("a.txt"));
        assert!(map.contains_key("b.txt"));
        assert_eq!(stats.deleted_files, vec!["a.txt".to_string()]);
        assert_eq!(stats.deletions, 2);
    }

    #[test]
    fn unstaged_deletion_keeps_parent_entry_if_file_exists() {
        let (dir, repo) = fixture();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        fs::write(dir.path().join("b.txt"), "b\n").unwrap();
        add(&repo, &[".".to_string()]).unwrap();
        commit(&repo, "c1").unwrap();

        // Stage only b.txt's change; a.txt still on disk keeps its entry.
        let mut index = Index::new();
        let b_oid = {
            fs::write(dir.path().join("b.txt"), "B2\n").unwrap();
            repo.hash_file(&dir.path().join("b.txt")).unwrap()
        };
        index.insert("b.txt", b_oid);
        repo.save_index(&index).unwrap();

        let CommitOutcome::Created { commit: c2, .. } = commit(&repo, "c2").unwrap() else {
            panic!()
        };
        let map = repo.tree_map_of(&c2).unwrap();
        assert!(map.contains_key("a.txt"));
        assert_eq!(map.get("b.txt"), Some(&b_oid));
    }

    #[test]
    fn detached_head_commit_moves_head_only() {
        let (dir, repo) = fixture();
        fs::write(dir.path().join("a.txt"), "hi\n").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        let CommitOutcome::Created { commit: c1, .. } = commit(&repo, "c1").unwrap() else {
            panic!()
        };
        repo.refs().set_head_detached(&c1).unwrap();

        fs::write(dir.path().join("a.txt"), "changed\n").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        let CommitOutcome::Created {
            commit: c2, branch, ..
        } = commit(&repo, "c2").unwrap()
        else {
            panic!()
        };

        assert!(branch.is_none());
        assert_eq!(repo.head_commit().unwrap(), Some(c2));
        // The branch stayed put.
        assert_eq!(repo.refs().resolve_branch("main").unwrap(), Some(c1));
    }

    #[cfg(unix)]
    #[test]
    fn rejecting_pre_commit_hook_aborts() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, repo) = fixture();
        let hook = repo.common_dir().join("hooks").join("pre-commit");
        fs::write(&hook, "#!/bin/sh\nexit 1\n").unwrap();
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();

        fs::write(dir.path().join("a.txt"), "hi\n").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();

        assert!(matches!(
            commit(&repo, "c1").unwrap_err(),
            SnapshotError::HookRejected
        ));
        // No ref was created.
        assert_eq!(repo.refs().resolve_branch("main").unwrap(), None);
    }

    #[test]
    fn orphan_head_commit_creates_the_branch_file() {
        let (dir, repo) = fixture();
        repo.refs().set_head_symbolic("orphan").unwrap();

        fs::write(dir.path().join("a.txt"), "hi\n").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        let CommitOutcome::Created { branch, .. } = commit(&repo, "c1").unwrap() else {
            panic!()
        };

        assert_eq!(branch.as_deref(), Some("orphan"));
        assert!(repo.refs().resolve_branch("orphan").unwrap().is_some());
        let _ = dir;
    }
}
