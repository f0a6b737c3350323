//! Stash stack: a LIFO of saved (index, working-tree, base-commit) tuples.
//!
//! Persisted as a JSON array at `stash` in the main metadata directory,
//! index 0 on top. Stash records reference blobs in the shared object store
//! but are never part of the object graph themselves.

use std::collections::BTreeMap;
use std::fs;

use chrono::{Local, TimeZone};
use rvs_checkout::materialize::{materialize_tree, write_blob_file};
use rvs_hash::ObjectId;
use rvs_index::Index;
use rvs_repository::Repository;
use serde::{Deserialize, Serialize};

/// Errors from stash operations.
#[derive(Debug, thiserror::Error)]
pub enum StashError {
    #[error("no stash entry at index {0}")]
    NoSuchEntry(usize),

    #[error("malformed stash file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Repo(#[from] rvs_repository::RepoError),

    #[error(transparent)]
    Odb(#[from] rvs_odb::OdbError),

    #[error(transparent)]
    Index(#[from] rvs_index::IndexError),

    #[error(transparent)]
    Checkout(#[from] rvs_checkout::CheckoutError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One saved stash entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StashRecord {
    pub message: String,
    pub timestamp: i64,
    pub date: String,
    pub branch: String,
    pub commit: Option<String>,
    /// Staged path → blob hex at save time.
    pub index: BTreeMap<String, String>,
    /// Working-tree path → blob hex at save time.
    pub working_files: BTreeMap<String, String>,
    /// The committed tree the stash was taken against.
    pub committed_files: BTreeMap<String, String>,
    pub include_untracked: bool,
}

impl StashRecord {
    /// Working paths whose contents differ from the committed tree.
    pub fn modified_paths(&self) -> Vec<String> {
        self.working_files
            .iter()
            .filter(|(path, hex)| self.committed_files.get(*path) != Some(*hex))
            .map(|(path, _)| path.clone())
            .collect()
    }
}

/// Result of a stash save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing differed from the committed state.
    NoChanges,
    Saved { message: String },
}

/// Load the stash stack, top first. A missing file is an empty stack.
pub fn load_stack(repo: &Repository) -> Result<Vec<StashRecord>, StashError> {
    let data = match fs::read(repo.stash_path()) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StashError::Io(e)),
    };
    Ok(serde_json::from_slice(&data)?)
}

fn save_stack(repo: &Repository, stack: &[StashRecord]) -> Result<(), StashError> {
    let json = serde_json::to_vec_pretty(stack)?;
    fs::write(repo.stash_path(), json)?;
    Ok(())
}

/// Save the current index and working tree, then restore the committed state
/// and clear the index.
pub fn save(
    repo: &Repository,
    message: Option<String>,
    include_untracked: bool,
) -> Result<SaveOutcome, StashError> {
    let head = repo.head()?;
    let commit = head.commit();
    let branch = head.branch_name().unwrap_or("HEAD").to_string();

    let committed = match commit {
        Some(oid) => repo.tree_map_of(&oid)?,
        None => BTreeMap::new(),
    };
    let index = repo.load_index()?;
    let working = repo.scan_working_tree()?;

    if !has_changes(&committed, &index, &working, include_untracked) {
        return Ok(SaveOutcome::NoChanges);
    }

    let message = message.unwrap_or_else(|| default_message(repo, &branch, commit));
    let timestamp = Local::now().timestamp();

    let record = StashRecord {
        message: message.clone(),
        timestamp,
        date: format_date(timestamp),
        branch,
        commit: commit.map(|oid| oid.to_hex()),
        index: to_hex_map(index.entries()),
        working_files: to_hex_map(&working),
        committed_files: to_hex_map(&committed),
        include_untracked,
    };

    let mut stack = load_stack(repo)?;
    stack.insert(0, record);
    save_stack(repo, &stack)?;

    // Restore the committed state and clear the staging area.
    materialize_tree(repo, &committed)?;
    Index::clear(&repo.index_path())?;

    Ok(SaveOutcome::Saved { message })
}

/// Restore working-file contents and the index from a record.
///
/// Files are written back; nothing is deleted, so untracked files created
/// since the save survive.
pub fn apply(repo: &Repository, entry: usize) -> Result<StashRecord, StashError> {
    let stack = load_stack(repo)?;
    let record = stack.get(entry).ok_or(StashError::NoSuchEntry(entry))?;

    for (path, hex) in &record.working_files {
        let oid = parse_hex(hex)?;
        write_blob_file(repo, path, &oid)?;
    }

    let index = Index::from_map(from_hex_map(&record.index)?);
    repo.save_index(&index)?;

    Ok(record.clone())
}

/// Remove one record from the stack.
pub fn drop_entry(repo: &Repository, entry: usize) -> Result<StashRecord, StashError> {
    let mut stack = load_stack(repo)?;
    if entry >= stack.len() {
        return Err(StashError::NoSuchEntry(entry));
    }
    let removed = stack.remove(entry);
    save_stack(repo, &stack)?;
    Ok(removed)
}

/// Apply then drop. The drop only happens when apply succeeded.
pub fn pop(repo: &Repository, entry: usize) -> Result<StashRecord, StashError> {
    apply(repo, entry)?;
    drop_entry(repo, entry)
}

fn has_changes(
    committed: &BTreeMap<String, ObjectId>,
    index: &Index,
    working: &BTreeMap<String, ObjectId>,
    include_untracked: bool,
) -> bool {
    for (path, oid) in working {
        match committed.get(path) {
            Some(committed_oid) if committed_oid != oid => return true,
            Some(_) => {}
            None => {
                if !index.contains(path) && include_untracked {
                    return true;
                }
            }
        }
    }

    for (path, oid) in index.iter() {
        if committed.get(path) != Some(oid) {
            return true;
        }
    }

    false
}

fn default_message(repo: &Repository, branch: &str, commit: Option<ObjectId>) -> String {
    let commit_info = match commit {
        Some(oid) => match repo.odb().require_commit(&oid) {
            Ok(c) => {
                let first_line = c.message.lines().next().unwrap_or_default().to_string();
                format!("{} {}", oid.short_hex(), first_line)
            }
            Err(_) => oid.short_hex(),
        },
        None => "initial".to_string(),
    };
    format!("WIP on {branch}: {commit_info}")
}

fn to_hex_map(map: &BTreeMap<String, ObjectId>) -> BTreeMap<String, String> {
    map.iter().map(|(p, oid)| (p.clone(), oid.to_hex())).collect()
}

fn from_hex_map(map: &BTreeMap<String, String>) -> Result<BTreeMap<String, ObjectId>, StashError> {
    let mut out = BTreeMap::new();
    for (path, hex) in map {
        out.insert(path.clone(), parse_hex(hex)?);
    }
    Ok(out)
}

fn parse_hex(hex: &str) -> Result<ObjectId, StashError> {
    ObjectId::from_hex(hex).map_err(|_| {
        StashError::Parse(serde::de::Error::custom(format!("bad blob hex: {hex}")))
    })
}

fn format_date(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvs_object::{Commit, Object, ObjectKind, Tree};
    use rvs_repository::init_repository;

    fn fixture() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        init_repository(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        (dir, repo)
    }

    /// Commit the given files on `main` and settle the worktree on them.
    fn settle_commit(repo: &Repository, files: &[(&str, &str)]) -> ObjectId {
        let mut map = BTreeMap::new();
        for (path, content) in files {
            let oid = repo
                .odb()
                .write_payload(ObjectKind::Blob, content.as_bytes())
                .unwrap();
            map.insert(path.to_string(), oid);
        }
        let tree = repo.odb().write(&Object::Tree(Tree::from_map(&map))).unwrap();
        let commit = Commit::with_timestamp(tree, vec![], "c1", "tester", 0);
        let oid = repo.odb().write(&Object::Commit(commit)).unwrap();
        repo.refs().set_branch("main", &oid).unwrap();
        repo.refs().set_head_symbolic("main").unwrap();
        materialize_tree(repo, &map).unwrap();
        repo.save_index(&Index::from_map(map)).unwrap();
        oid
    }

    #[test]
    fn clean_tree_saves_nothing() {
        let (_dir, repo) = fixture();
        settle_commit(&repo, &[("a.txt", "hi\n")]);

        assert_eq!(save(&repo, None, false).unwrap(), SaveOutcome::NoChanges);
        assert!(load_stack(&repo).unwrap().is_empty());
    }

    #[test]
    fn save_restores_committed_state_and_clears_index() {
        let (dir, repo) = fixture();
        settle_commit(&repo, &[("a.txt", "hi\n")]);

        fs::write(dir.path().join("a.txt"), "edited\n").unwrap();

        let outcome = save(&repo, Some("wip".into()), false).unwrap();
        assert!(matches!(outcome, SaveOutcome::Saved { .. }));

        assert_eq!(
            fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "hi\n"
        );
        assert!(repo.load_index().unwrap().is_empty());
        assert_eq!(load_stack(&repo).unwrap().len(), 1);
    }

    #[test]
    fn apply_restores_working_files_and_index() {
        let (dir, repo) = fixture();
        settle_commit(&repo, &[("a.txt", "hi\n")]);

        fs::write(dir.path().join("a.txt"), "edited\n").unwrap();
        save(&repo, None, false).unwrap();

        apply(&repo, 0).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "edited\n"
        );
        // Stack still holds the record after a plain apply.
        assert_eq!(load_stack(&repo).unwrap().len(), 1);
    }

    #[test]
    fn pop_equals_apply_plus_drop() {
        let (dir, repo) = fixture();
        settle_commit(&repo, &[("a.txt", "hi\n")]);

        fs::write(dir.path().join("a.txt"), "edited\n").unwrap();
        save(&repo, None, false).unwrap();

        let record = pop(&repo, 0).unwrap();
        assert!(record.message.starts_with("WIP on main"));
        assert_eq!(
            fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "edited\n"
        );
        assert!(load_stack(&repo).unwrap().is_empty());
    }

    #[test]
    fn newest_save_sits_on_top() {
        let (dir, repo) = fixture();
        settle_commit(&repo, &[("a.txt", "hi\n")]);

        fs::write(dir.path().join("a.txt"), "first\n").unwrap();
        save(&repo, Some("first".into()), false).unwrap();
        fs::write(dir.path().join("a.txt"), "second\n").unwrap();
        save(&repo, Some("second".into()), false).unwrap();

        let stack = load_stack(&repo).unwrap();
        assert_eq!(stack[0].message, "second");
        assert_eq!(stack[1].message, "first");
    }

    #[test]
    fn drop_removes_one_record() {
        let (dir, repo) = fixture();
        settle_commit(&repo, &[("a.txt", "hi\n")]);

        fs::write(dir.path().join("a.txt"), "x\n").unwrap();
        save(&repo, Some("keep".into()), false).unwrap();
        fs::write(dir.path().join("a.txt"), "y\n").unwrap();
        save(&repo, Some("drop-me".into()), false).unwrap();

        drop_entry(&repo, 0).unwrap();
        let stack = load_stack(&repo).unwrap();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack[0].message, "keep");
    }

    #[test]
    fn out_of_range_entry_errors() {
        let (_dir, repo) = fixture();
        settle_commit(&repo, &[("a.txt", "hi\n")]);
        assert!(matches!(
            apply(&repo, 0).unwrap_err(),
            StashError::NoSuchEntry(0)
        ));
    }

    #[test]
    fn untracked_files_need_the_flag() {
        let (dir, repo) = fixture();
        settle_commit(&repo, &[("a.txt", "hi\n")]);

        fs::write(dir.path().join("new.txt"), "untracked\n").unwrap();

        assert_eq!(save(&repo, None, false).unwrap(), SaveOutcome::NoChanges);
        assert!(matches!(
            save(&repo, None, true).unwrap(),
            SaveOutcome::Saved { .. }
        ));
        // The untracked file was swept away with the save.
        assert!(!dir.path().join("new.txt").exists());
    }

    #[test]
    fn modified_paths_reported_by_show() {
        let (dir, repo) = fixture();
        settle_commit(&repo, &[("a.txt", "hi\n"), ("b.txt", "b\n")]);

        fs::write(dir.path().join("a.txt"), "edited\n").unwrap();
        save(&repo, None, false).unwrap();

        let stack = load_stack(&repo).unwrap();
        assert_eq!(stack[0].modified_paths(), vec!["a.txt".to_string()]);
    }
}
