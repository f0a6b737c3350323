//! Tree materialization: make the working tree and index match a tree map.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rvs_hash::ObjectId;
use rvs_index::Index;
use rvs_repository::Repository;

use crate::CheckoutError;

/// Write a single blob to a working-tree file, creating parent directories.
pub fn write_blob_file(
    repo: &Repository,
    path: &str,
    oid: &ObjectId,
) -> Result<(), CheckoutError> {
    let blob = repo.odb().require_blob(oid)?;
    write_file_under(repo.work_dir(), path, &blob.data)
}

/// Write raw bytes to `<root>/<path>`, creating parent directories.
pub fn write_file_under(root: &Path, path: &str, data: &[u8]) -> Result<(), CheckoutError> {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&full, data)?;
    Ok(())
}

/// Materialize a tree map into the working tree.
///
/// Deletes every working-tree file (excluding metadata) whose path is not in
/// the target map, then recreates every file in the map from its blob.
/// Emptied directories are pruned.
pub fn materialize_tree(
    repo: &Repository,
    target: &BTreeMap<String, ObjectId>,
) -> Result<(), CheckoutError> {
    let current = repo.list_working_files()?;
    for path in &current {
        if !target.contains_key(path) {
            let full = repo.work_dir().join(path);
            if full.exists() {
                fs::remove_file(&full)?;
                prune_empty_dirs(repo.work_dir(), path);
            }
        }
    }

    for (path, oid) in target {
        write_blob_file(repo, path, oid)?;
    }

    Ok(())
}

/// Overwrite the index with a tree map.
pub fn update_index_to(
    repo: &Repository,
    target: &BTreeMap<String, ObjectId>,
) -> Result<(), CheckoutError> {
    let index = Index::from_map(target.clone());
    repo.save_index(&index)?;
    Ok(())
}

/// Remove now-empty parent directories of a deleted path, stopping at the
/// working tree root.
fn prune_empty_dirs(root: &Path, deleted: &str) {
    let mut dir = Path::new(deleted).parent();
    while let Some(rel) = dir {
        if rel.as_os_str().is_empty() {
            break;
        }
        let full = root.join(rel);
        match fs::read_dir(&full) {
            Ok(mut entries) => {
                if entries.next().is_none() {
                    let _ = fs::remove_dir(&full);
                } else {
                    break;
                }
            }
            _ => break,
        }
        dir = rel.parent();
    }
}
