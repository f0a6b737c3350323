//! Staging: hash paths into the index.
//!
//! Adding `.` recurses the whole repository root and additionally stages
//! deletions (tracked-and-committed paths missing from the working tree are
//! dropped from the index). Adding a directory below the root recurses but
//! never stages deletions; adding a file stages just that file.

use std::path::Path;

use rvs_repository::Repository;

use crate::SnapshotError;

/// What an `add` invocation staged.
#[derive(Debug, Clone, Default)]
pub struct AddReport {
    /// Paths whose blobs were (re)staged.
    pub staged: Vec<String>,
    /// Paths removed from the index as staged deletions.
    pub deleted: Vec<String>,
}

/// Stage the given paths. `.` means the repository root.
pub fn add(repo: &Repository, paths: &[String]) -> Result<AddReport, SnapshotError> {
    let mut index = repo.load_index()?;
    let mut report = AddReport::default();

    for raw in paths {
        if raw == "." {
            add_root(repo, &mut index, &mut report)?;
            continue;
        }

        let full = repo.work_dir().join(raw);
        if full.is_file() {
            let normalized = repo.normalize(Path::new(raw))?;
            let oid = repo.hash_file(&full)?;
            index.insert(normalized.clone(), oid);
            report.staged.push(normalized);
        } else if full.is_dir() {
            add_directory(repo, &full, &mut index, &mut report)?;
        } else {
            return Err(SnapshotError::PathNotFound(raw.clone()));
        }
    }

    repo.save_index(&index)?;
    Ok(report)
}

/// Stage everything under the repository root, including deletions.
fn add_root(
    repo: &Repository,
    index: &mut rvs_index::Index,
    report: &mut AddReport,
) -> Result<(), SnapshotError> {
    let working = repo.scan_working_tree()?;
    for (path, oid) in &working {
        index.insert(path.clone(), *oid);
        report.staged.push(path.clone());
    }

    // A tracked, committed path absent from the working tree is a staged
    // deletion. Paths only staged (never committed) are left alone.
    let committed = repo.head_tree_map()?;
    let stale: Vec<String> = index
        .iter()
        .map(|(p, _)| p.clone())
        .filter(|p| !working.contains_key(p) && committed.contains_key(p))
        .collect();
    for path in stale {
        index.remove(&path);
        report.deleted.push(path);
    }

    Ok(())
}

/// Stage all files under a subdirectory (no deletion staging).
fn add_directory(
    repo: &Repository,
    dir: &Path,
    index: &mut rvs_index::Index,
    report: &mut AddReport,
) -> Result<(), SnapshotError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            add_directory(repo, &path, index, report)?;
        } else {
            let normalized = repo.normalize(&path)?;
            let oid = repo.hash_file(&path)?;
            index.insert(normalized.clone(), oid);
            report.staged.push(normalized);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvs_hash::ObjectId;
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

    fn commit_map(repo: &Repository, files: &[(&str, &str)]) -> ObjectId {
        let mut map = BTreeMap::new();
        for (path, content) in files {
            let oid = repo
                .odb()
                .write_payload(ObjectKind::Blob, content.as_bytes())
                .unwrap();
            map.insert(path.to_string(), oid);
        }
        let tree = repo.odb().write(&Object::Tree(Tree::from_map(&map))).unwrap();
        let oid = repo
            .odb()
            .write(&Object::Commit(Commit::with_timestamp(
                tree,
                vec![],
                "c",
                "tester",
                0,
            )))
            .unwrap();
        repo.refs().set_branch("main", &oid).unwrap();
        repo.refs().set_head_symbolic("main").unwrap();
        oid
    }

    #[test]
    fn add_single_file() {
        let (dir, repo) = fixture();
        fs::write(dir.path().join("a.txt"), "hi\n").unwrap();

        let report = add(&repo, &["a.txt".to_string()]).unwrap();
        assert_eq!(report.staged, vec!["a.txt".to_string()]);

        let index = repo.load_index().unwrap();
        let oid = index.get("a.txt").unwrap();
        assert_eq!(repo.odb().require_blob(&oid).unwrap().data, b"hi\n");
    }

    #[test]
    fn add_missing_path_fails() {
        let (_dir, repo) = fixture();
        assert!(matches!(
            add(&repo, &["ghost".to_string()]).unwrap_err(),
            SnapshotError::PathNotFound(_)
        ));
    }

    #[test]
    fn add_directory_recurses_without_deletions() {
        let (dir, repo) = fixture();
        fs::create_dir_all(dir.path().join("src/deep")).unwrap();
        fs::write(dir.path().join("src/a.rs"), "a").unwrap();
        fs::write(dir.path().join("src/deep/b.rs"), "b").unwrap();

        // Pre-stage a path that no longer exists; a directory add must not
        // drop it.
        let mut index = repo.load_index().unwrap();
        index.insert("gone.txt", ObjectId::NULL);
        repo.save_index(&index).unwrap();

        add(&repo, &["src".to_string()]).unwrap();

        let index = repo.load_index().unwrap();
        assert!(index.contains("src/a.rs"));
        assert!(index.contains("src/deep/b.rs"));
        assert!(index.contains("gone.txt"));
    }

    #[test]
    fn add_dot_stages_everything_and_deletions() {
        let (dir, repo) = fixture();
        commit_map(&repo, &[("old.txt", "old\n")]);

        // old.txt is committed and staged but deleted from the worktree.
        let mut index = repo.load_index().unwrap();
        index.insert(
            "old.txt",
            repo.odb()
                .write_payload(ObjectKind::Blob, b"old\n")
                .unwrap(),
        );
        repo.save_index(&index).unwrap();

        fs::write(dir.path().join("new.txt"), "new\n").unwrap();

        let report = add(&repo, &[".".to_string()]).unwrap();
        assert_eq!(report.staged, vec!["new.txt".to_string()]);
        assert_eq!(report.deleted, vec!["old.txt".to_string()]);

        let index = repo.load_index().unwrap();
        assert!(index.contains("new.txt"));
        assert!(!index.contains("old.txt"));
    }

    #[test]
    fn add_dot_keeps_uncommitted_staged_entries() {
        let (dir, repo) = fixture();
        // Staged but never committed, and missing from the working tree:
        // not a staged deletion.
        let mut index = repo.load_index().unwrap();
        index.insert("staged-only.txt", ObjectId::NULL);
        repo.save_index(&index).unwrap();

        fs::write(dir.path().join("f.txt"), "f").unwrap();
        add(&repo, &[".".to_string()]).unwrap();

        assert!(repo.load_index().unwrap().contains("staged-only.txt"));
    }
}
