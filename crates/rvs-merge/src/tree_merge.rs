//! Three-way merge over flat tree maps.
//!
//! For each path in the union of base/ours/theirs, the classic rules apply:
//! equal sides win, a side that matches the base yields to the other side,
//! and anything else is a content conflict. Conflicted files are synthesized
//! with markers and written to the working tree; the in-memory merged map
//! keeps our blob for them, so the written file is uncommitted by
//! construction.

use std::collections::{BTreeMap, BTreeSet};

use rvs_checkout::materialize::write_file_under;
use rvs_hash::ObjectId;
use rvs_repository::Repository;

use crate::MergeError;

/// Result of a three-way tree merge.
#[derive(Debug, Clone)]
pub struct TreeMerge {
    /// Merged path → blob map (ours kept for conflicted paths).
    pub merged: BTreeMap<String, ObjectId>,
    /// Paths with content conflicts, in path order.
    pub conflicts: Vec<String>,
}

impl TreeMerge {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Merge `ours` and `theirs` against `base`, writing conflict-marker files
/// into the working tree for every conflicted path.
pub fn merge_tree_maps(
    repo: &Repository,
    base: &BTreeMap<String, ObjectId>,
    ours: &BTreeMap<String, ObjectId>,
    theirs: &BTreeMap<String, ObjectId>,
) -> Result<TreeMerge, MergeError> {
    let mut merged = BTreeMap::new();
    let mut conflicts = Vec::new();

    let all_paths: BTreeSet<&String> = base
        .keys()
        .chain(ours.keys())
        .chain(theirs.keys())
        .collect();

    for path in all_paths {
        let b = base.get(path);
        let o = ours.get(path);
        let t = theirs.get(path);

        if o == t {
            if let Some(oid) = o {
                merged.insert(path.clone(), *oid);
            }
        } else if o == b {
            if let Some(oid) = t {
                merged.insert(path.clone(), *oid);
            }
        } else if t == b {
            if let Some(oid) = o {
                merged.insert(path.clone(), *oid);
            }
        } else {
            let content = synthesize_conflict(repo, o, t)?;
            write_file_under(repo.work_dir(), path, &content)?;
            if let Some(oid) = o {
                merged.insert(path.clone(), *oid);
            }
            conflicts.push(path.clone());
        }
    }

    Ok(TreeMerge { merged, conflicts })
}

/// Build the conflict-marker file contents for one path.
///
/// An absent side contributes empty bytes; a side without a trailing newline
/// gets one so the markers stay on their own lines.
pub fn synthesize_conflict(
    repo: &Repository,
    ours: Option<&ObjectId>,
    theirs: Option<&ObjectId>,
) -> Result<Vec<u8>, MergeError> {
    let our_bytes = read_side(repo, ours)?;
    let their_bytes = read_side(repo, theirs)?;

    let mut out = Vec::with_capacity(our_bytes.len() + their_bytes.len() + 64);
    out.extend_from_slice(b"<<<<<<< HEAD\n");
    out.extend_from_slice(&our_bytes);
    if !our_bytes.is_empty() && !our_bytes.ends_with(b"\n") {
        out.push(b'\n');
    }
    out.extend_from_slice(b"=======\n");
    out.extend_from_slice(&their_bytes);
    if !their_bytes.is_empty() && !their_bytes.ends_with(b"\n") {
        out.push(b'\n');
    }
    out.extend_from_slice(b">>>>>>> target\n");
    Ok(out)
}

fn read_side(repo: &Repository, side: Option<&ObjectId>) -> Result<Vec<u8>, MergeError> {
    match side {
        Some(oid) => Ok(repo.odb().require_blob(oid)?.data),
        None => Ok(Vec::new()),
    }
}
