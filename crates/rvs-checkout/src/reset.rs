//! Reset engine: move HEAD (and optionally the index and working tree) to a
//! target commit, or take per-path entries from a target tree into the index.

use rvs_hash::ObjectId;
use rvs_ref::Head;
use rvs_repository::Repository;

use crate::materialize::{materialize_tree, update_index_to};
use crate::CheckoutError;

/// How much state a reset touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Advance HEAD/branch only.
    Soft,
    /// Advance HEAD/branch and overwrite the index (default).
    Mixed,
    /// Mixed plus materialize the working tree.
    Hard,
    /// Advance HEAD/branch; leave index and working tree untouched.
    Keep,
}

/// What happened to one path in a path-scoped reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathResetAction {
    /// The index entry was taken from the target tree.
    Staged,
    /// The path was absent from the target tree and removed from the index.
    Removed,
    /// The path was in neither the target tree nor the index.
    Missing,
}

#[derive(Debug, Clone)]
pub struct PathReset {
    pub path: String,
    pub action: PathResetAction,
}

/// Reset HEAD to `target`. Returns the resolved commit.
pub fn reset(repo: &Repository, target: &str, mode: ResetMode) -> Result<ObjectId, CheckoutError> {
    let oid = repo.resolve_commit_ish(target)?;

    match repo.head()? {
        Head::Branch { name, .. } | Head::Unborn { name } => {
            repo.refs().set_branch(&name, &oid)?;
        }
        Head::Detached(_) => {
            repo.refs().set_head_detached(&oid)?;
        }
    }

    if matches!(mode, ResetMode::Mixed | ResetMode::Hard) {
        let map = repo.tree_map_of(&oid)?;
        update_index_to(repo, &map)?;
        if mode == ResetMode::Hard {
            materialize_tree(repo, &map)?;
        }
    }

    Ok(oid)
}

/// Path-scoped reset: take per-path entries from the target tree into the
/// index (or drop them when absent). The working tree is untouched.
pub fn reset_paths(
    repo: &Repository,
    target: &str,
    paths: &[String],
) -> Result<Vec<PathReset>, CheckoutError> {
    let oid = repo.resolve_commit_ish(target)?;
    let tree = repo.tree_map_of(&oid)?;
    let mut index = repo.load_index()?;

    let mut out = Vec::with_capacity(paths.len());
    for raw in paths {
        let path = repo.normalize(std::path::Path::new(raw))?;
        let action = if let Some(blob) = tree.get(&path) {
            index.insert(path.clone(), *blob);
            PathResetAction::Staged
        } else if index.remove(&path).is_some() {
            PathResetAction::Removed
        } else {
            PathResetAction::Missing
        };
        out.push(PathReset { path, action });
    }

    repo.save_index(&index)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::materialize_tree as materialize;
    use rvs_object::{Commit, Object, ObjectKind, Tree};
    use rvs_repository::init_repository;
    use std::collections::BTreeMap;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        init_repository(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        (dir, repo)
    }

    fn commit_files(repo: &Repository, branch: &str, files: &[(&str, &str)]) -> ObjectId {
        let mut map = BTreeMap::new();
        for (path, content) in files {
            let oid = repo
                .odb()
                .write_payload(ObjectKind::Blob, content.as_bytes())
                .unwrap();
            map.insert(path.to_string(), oid);
        }
        let tree = repo.odb().write(&Object::Tree(Tree::from_map(&map))).unwrap();
        let parent = repo.refs().resolve_branch(branch).unwrap();
        let commit = Commit::with_timestamp(
            tree,
            parent.into_iter().collect(),
            "c",
            "tester",
            0,
        );
        let oid = repo.odb().write(&Object::Commit(commit)).unwrap();
        repo.refs().set_branch(branch, &oid).unwrap();
        oid
    }

    fn settle(repo: &Repository, oid: &ObjectId) {
        let map = repo.tree_map_of(oid).unwrap();
        materialize(repo, &map).unwrap();
        update_index_to(repo, &map).unwrap();
        repo.refs().set_head_symbolic("main").unwrap();
    }

    #[test]
    fn soft_reset_moves_branch_only() {
        let (dir, repo) = fixture();
        let c1 = commit_files(&repo, "main", &[("a.txt", "one\n")]);
        let c2 = commit_files(&repo, "main", &[("a.txt", "two\n")]);
        settle(&repo, &c2);
        let index_before = repo.load_index().unwrap();

        reset(&repo, &c1.to_hex(), ResetMode::Soft).unwrap();

        assert_eq!(repo.refs().resolve_branch("main").unwrap(), Some(c1));
        assert_eq!(repo.load_index().unwrap(), index_before);
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "two\n");
    }

    #[test]
    fn mixed_reset_rewrites_index() {
        let (dir, repo) = fixture();
        let c1 = commit_files(&repo, "main", &[("a.txt", "one\n")]);
        let c2 = commit_files(&repo, "main", &[("a.txt", "two\n")]);
        settle(&repo, &c2);

        reset(&repo, &c1.to_hex(), ResetMode::Mixed).unwrap();

        let index = repo.load_index().unwrap();
        assert_eq!(index.entries(), &repo.tree_map_of(&c1).unwrap());
        // Working tree untouched by mixed.
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "two\n");
    }

    #[test]
    fn hard_reset_materializes() {
        let (dir, repo) = fixture();
        let c1 = commit_files(&repo, "main", &[("a.txt", "one\n")]);
        let c2 = commit_files(&repo, "main", &[("a.txt", "two\n"), ("b.txt", "b\n")]);
        settle(&repo, &c2);

        reset(&repo, &c1.to_hex(), ResetMode::Hard).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "one\n");
        assert!(!dir.path().join("b.txt").exists());
        assert_eq!(
            repo.load_index().unwrap().entries(),
            &repo.tree_map_of(&c1).unwrap()
        );
    }

    #[test]
    fn keep_reset_leaves_everything_but_head() {
        let (dir, repo) = fixture();
        let c1 = commit_files(&repo, "main", &[("a.txt", "one\n")]);
        let c2 = commit_files(&repo, "main", &[("a.txt", "two\n")]);
        settle(&repo, &c2);
        let index_before = repo.load_index().unwrap();

        reset(&repo, &c1.to_hex(), ResetMode::Keep).unwrap();

        assert_eq!(repo.refs().resolve_branch("main").unwrap(), Some(c1));
        assert_eq!(repo.load_index().unwrap(), index_before);
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "two\n");
    }

    #[test]
    fn head_tilde_walks_back() {
        let (_dir, repo) = fixture();
        let c1 = commit_files(&repo, "main", &[("a.txt", "one\n")]);
        let c2 = commit_files(&repo, "main", &[("a.txt", "two\n")]);
        settle(&repo, &c2);

        let resolved = reset(&repo, "HEAD~1", ResetMode::Soft).unwrap();
        assert_eq!(resolved, c1);
    }

    #[test]
    fn detached_reset_moves_head_file() {
        let (_dir, repo) = fixture();
        let c1 = commit_files(&repo, "main", &[("a.txt", "one\n")]);
        let c2 = commit_files(&repo, "main", &[("a.txt", "two\n")]);
        repo.refs().set_head_detached(&c2).unwrap();

        reset(&repo, &c1.to_hex(), ResetMode::Soft).unwrap();
        assert_eq!(repo.head_commit().unwrap(), Some(c1));
        // Branch pointer untouched.
        assert_eq!(repo.refs().resolve_branch("main").unwrap(), Some(c2));
    }

    #[test]
    fn path_reset_stages_and_removes() {
        let (dir, repo) = fixture();
        let c1 = commit_files(&repo, "main", &[("a.txt", "one\n")]);
        settle(&repo, &c1);

        // Stage an edit plus a brand-new file.
        fs::write(dir.path().join("a.txt"), "edited\n").unwrap();
        let edited = repo.hash_file(&dir.path().join("a.txt")).unwrap();
        let mut index = repo.load_index().unwrap();
        index.insert("a.txt", edited);
        index.insert("new.txt", edited);
        repo.save_index(&index).unwrap();

        let results = reset_paths(
            &repo,
            "HEAD",
            &["a.txt".to_string(), "new.txt".to_string(), "ghost".to_string()],
        )
        .unwrap();

        assert_eq!(results[0].action, PathResetAction::Staged);
        assert_eq!(results[1].action, PathResetAction::Removed);
        assert_eq!(results[2].action, PathResetAction::Missing);

        let index = repo.load_index().unwrap();
        assert_eq!(index.get("a.txt"), repo.tree_map_of(&c1).unwrap().get("a.txt").copied());
        assert!(!index.contains("new.txt"));
        // Working tree untouched.
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "edited\n");
    }
}
