//! Workspace scanner: enumerate the working tree and hash files on demand.
//!
//! Enumeration skips the repository metadata root (`.rvs` directory or
//! worktree marker file). File contents are hashed by writing them to the
//! object store, so every hash the scanner reports names a stored blob.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rvs_hash::ObjectId;
use rvs_object::ObjectKind;
use rvs_utils::normalize_path;

use crate::{RepoError, Repository, META_DIR};

impl Repository {
    /// Hash a working-tree file into the object store, returning its blob OID.
    pub fn hash_file(&self, path: &Path) -> Result<ObjectId, RepoError> {
        let content = fs::read(path)
            .map_err(|_| RepoError::PathNotFound(path.display().to_string()))?;
        Ok(self.odb().write_payload(ObjectKind::Blob, &content)?)
    }

    /// Normalize a caller-supplied path against the working tree root.
    pub fn normalize(&self, path: &Path) -> Result<String, RepoError> {
        Ok(normalize_path(self.work_dir(), path)?)
    }

    /// Enumerate every regular file under the working tree, hashed.
    ///
    /// Returns a map from normalized path to blob OID.
    pub fn scan_working_tree(&self) -> Result<BTreeMap<String, ObjectId>, RepoError> {
        let mut out = BTreeMap::new();
        let mut paths = Vec::new();
        collect_files(self.work_dir(), self.work_dir(), &mut paths)?;
        for path in paths {
            let normalized = self.normalize(&path)?;
            let oid = self.hash_file(&path)?;
            out.insert(normalized, oid);
        }
        Ok(out)
    }

    /// Enumerate working-tree paths without hashing.
    pub fn list_working_files(&self) -> Result<Vec<String>, RepoError> {
        let mut paths = Vec::new();
        collect_files(self.work_dir(), self.work_dir(), &mut paths)?;
        let mut out = Vec::with_capacity(paths.len());
        for path in paths {
            out.push(self.normalize(&path)?);
        }
        out.sort();
        Ok(out)
    }
}

/// Recursively collect regular files, skipping the metadata root.
fn collect_files(
    root: &Path,
    dir: &Path,
    out: &mut Vec<std::path::PathBuf>,
) -> Result<(), RepoError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();

        if dir == root && name == META_DIR {
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else {
            // Symlinks are read through to their target contents.
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_repository;

    fn fixture() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        init_repository(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn scan_skips_metadata() {
        let (dir, repo) = fixture();
        fs::write(dir.path().join("a.txt"), "hi\n").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), "pub fn x() {}\n").unwrap();

        let scanned = repo.scan_working_tree().unwrap();
        let paths: Vec<&str> = scanned.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["a.txt", "src/lib.rs"]);
    }

    #[test]
    fn scan_hashes_into_object_store() {
        let (dir, repo) = fixture();
        fs::write(dir.path().join("a.txt"), "hi\n").unwrap();

        let scanned = repo.scan_working_tree().unwrap();
        let oid = scanned["a.txt"];
        let blob = repo.odb().require_blob(&oid).unwrap();
        assert_eq!(blob.data, b"hi\n");
    }

    #[test]
    fn hash_file_missing_path() {
        let (dir, repo) = fixture();
        let err = repo.hash_file(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, RepoError::PathNotFound(_)));
    }

    #[test]
    fn normalize_rejects_escapes() {
        let (_dir, repo) = fixture();
        let err = repo.normalize(Path::new("../outside")).unwrap_err();
        assert!(matches!(err, RepoError::PathOutsideRepo(_)));
    }

    #[test]
    fn empty_tree_scans_empty() {
        let (_dir, repo) = fixture();
        assert!(repo.scan_working_tree().unwrap().is_empty());
    }
}
