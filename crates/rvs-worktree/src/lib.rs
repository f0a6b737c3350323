//! Worktree manager: additional checkouts with per-worktree HEAD and index,
//! sharing the main repository's objects and refs.
//!
//! Each worktree gets a metadata directory `worktrees/<name>/` under the main
//! metadata root holding `HEAD`, `index`, `gitdir` (absolute path back to the
//! main metadata directory), `path` (absolute path of the worktree root), and
//! an optional `locked` marker. The worktree root carries a `.rvs` marker
//! *file* pointing at the metadata directory.

use std::fs;
use std::path::{Path, PathBuf};

use rvs_hash::ObjectId;
use rvs_index::Index;
use rvs_repository::{Repository, META_DIR};

/// Errors from worktree management.
#[derive(Debug, thiserror::Error)]
pub enum WorktreeError {
    #[error("'{0}' already exists and is not empty")]
    PathExists(PathBuf),

    #[error("'{0}' is not a working tree")]
    NotAWorktree(PathBuf),

    #[error("'{0}' is locked")]
    Locked(PathBuf),

    #[error(transparent)]
    Repo(#[from] rvs_repository::RepoError),

    #[error(transparent)]
    Odb(#[from] rvs_odb::OdbError),

    #[error(transparent)]
    Ref(#[from] rvs_ref::RefError),

    #[error(transparent)]
    Index(#[from] rvs_index::IndexError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Flags accepted by `worktree add`.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Create a new branch for the worktree.
    pub new_branch: Option<String>,
    /// Create or reset a branch for the worktree.
    pub force_new_branch: Option<String>,
    /// Detach HEAD in the new worktree.
    pub detach: bool,
    /// Allow reusing a non-empty target directory.
    pub force: bool,
}

/// A registered worktree, as reported by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeInfo {
    pub path: PathBuf,
    /// `None` for a detached HEAD.
    pub branch: Option<String>,
    pub commit: Option<ObjectId>,
    pub locked: bool,
    pub is_primary: bool,
}

/// What `add` checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    pub path: PathBuf,
    pub branch: Option<String>,
    pub commit: ObjectId,
}

/// Create a new worktree at `path`, checked out at `target`.
pub fn add(
    repo: &Repository,
    path: &Path,
    target: Option<&str>,
    opts: &AddOptions,
) -> Result<Added, WorktreeError> {
    if path.exists() && !opts.force && fs::read_dir(path)?.next().is_some() {
        return Err(WorktreeError::PathExists(path.to_path_buf()));
    }
    fs::create_dir_all(path)?;
    let wt_root = fs::canonicalize(path)?;

    // Decide which branch (if any) the new worktree sits on.
    let (branch, commit) = resolve_target(repo, target, opts)?;

    if let Some(ref name) = branch {
        if opts.force_new_branch.is_some() || !repo.refs().branch_exists(name) {
            repo.refs().set_branch(name, &commit)?;
        }
    }

    // Per-worktree metadata under the main repository.
    let name = worktree_name(&wt_root);
    let meta = repo.worktrees_dir().join(&name);
    fs::create_dir_all(&meta)?;

    fs::write(
        wt_root.join(META_DIR),
        format!("rvsdir: {}", meta.display()),
    )?;
    fs::write(meta.join("gitdir"), repo.common_dir().display().to_string())?;
    fs::write(meta.join("path"), wt_root.display().to_string())?;
    match branch {
        Some(ref name) if !opts.detach => {
            fs::write(meta.join("HEAD"), format!("ref: refs/heads/{name}"))?;
        }
        _ => fs::write(meta.join("HEAD"), commit.to_hex())?,
    }

    // Materialize the target tree into the new worktree and give it a
    // matching index.
    let tree = repo.tree_map_of(&commit)?;
    for (rel, oid) in &tree {
        let blob = repo.odb().require_blob(oid)?;
        let full = wt_root.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, &blob.data)?;
    }
    Index::from_map(tree).save(&meta.join("index"))?;

    Ok(Added {
        path: wt_root,
        branch: if opts.detach { None } else { branch },
        commit,
    })
}

/// Enumerate the primary worktree plus every registered worktree whose
/// `gitdir` points back at this repository.
pub fn list(repo: &Repository) -> Result<Vec<WorktreeInfo>, WorktreeError> {
    let mut out = Vec::new();

    // The primary worktree root is the parent of the main metadata dir.
    let primary_root = repo
        .common_dir()
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let primary_refs =
        rvs_ref::RefStore::open(repo.common_dir(), repo.common_dir().join("HEAD"));
    let primary_head = primary_refs.current_head()?;
    out.push(WorktreeInfo {
        path: primary_root,
        branch: primary_head.branch_name().map(str::to_string),
        commit: primary_head.commit(),
        locked: false,
        is_primary: true,
    });

    let worktrees = repo.worktrees_dir();
    let entries = match fs::read_dir(&worktrees) {
        Ok(e) => e,
        Err(_) => return Ok(out),
    };
    for entry in entries.flatten() {
        let meta = entry.path();
        if !meta.is_dir() {
            continue;
        }
        let gitdir = match fs::read_to_string(meta.join("gitdir")) {
            Ok(s) => PathBuf::from(s.trim()),
            Err(_) => continue,
        };
        if gitdir != repo.common_dir() {
            continue;
        }
        let path = match fs::read_to_string(meta.join("path")) {
            Ok(s) => PathBuf::from(s.trim()),
            Err(_) => continue,
        };

        let refs = rvs_ref::RefStore::open(repo.common_dir(), meta.join("HEAD"));
        let head = refs.current_head()?;

        out.push(WorktreeInfo {
            path,
            branch: head.branch_name().map(str::to_string),
            commit: head.commit(),
            locked: meta.join("locked").exists(),
            is_primary: false,
        });
    }

    Ok(out)
}

/// Remove a worktree directory and its metadata. Locked worktrees are only
/// removed with `force`.
pub fn remove(_repo: &Repository, path: &Path, force: bool) -> Result<(), WorktreeError> {
    let wt_root = fs::canonicalize(path)
        .map_err(|_| WorktreeError::NotAWorktree(path.to_path_buf()))?;
    let meta = metadata_dir_of(&wt_root)?;

    if meta.join("locked").exists() && !force {
        return Err(WorktreeError::Locked(wt_root));
    }

    fs::remove_dir_all(&wt_root)?;
    if meta.exists() {
        fs::remove_dir_all(&meta)?;
    }
    Ok(())
}

/// Remove metadata entries whose worktree root no longer exists. Locked
/// entries are kept. Returns the pruned worktree paths.
pub fn prune(repo: &Repository, dry_run: bool) -> Result<Vec<PathBuf>, WorktreeError> {
    let mut pruned = Vec::new();
    let worktrees = repo.worktrees_dir();
    let entries = match fs::read_dir(&worktrees) {
        Ok(e) => e,
        Err(_) => return Ok(pruned),
    };

    for entry in entries.flatten() {
        let meta = entry.path();
        if !meta.is_dir() || meta.join("locked").exists() {
            continue;
        }
        let path = match fs::read_to_string(meta.join("path")) {
            Ok(s) => PathBuf::from(s.trim()),
            Err(_) => continue,
        };
        if !path.exists() {
            pruned.push(path);
            if !dry_run {
                fs::remove_dir_all(&meta)?;
            }
        }
    }

    Ok(pruned)
}

/// Mark a worktree locked, with an optional reason stored in the marker.
pub fn lock(
    _repo: &Repository,
    path: &Path,
    reason: Option<&str>,
) -> Result<(), WorktreeError> {
    let meta = metadata_dir_of(path)?;
    fs::write(meta.join("locked"), reason.unwrap_or_default())?;
    Ok(())
}

/// Remove a worktree's lock marker. Returns whether it was locked.
pub fn unlock(_repo: &Repository, path: &Path) -> Result<bool, WorktreeError> {
    let meta = metadata_dir_of(path)?;
    let marker = meta.join("locked");
    if marker.exists() {
        fs::remove_file(marker)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Relocate a worktree directory, rewriting its marker and metadata linkage.
pub fn move_worktree(
    _repo: &Repository,
    from: &Path,
    to: &Path,
) -> Result<PathBuf, WorktreeError> {
    let wt_root = fs::canonicalize(from)
        .map_err(|_| WorktreeError::NotAWorktree(from.to_path_buf()))?;
    let meta = metadata_dir_of(&wt_root)?;

    if meta.join("locked").exists() {
        return Err(WorktreeError::Locked(wt_root));
    }
    if to.exists() {
        return Err(WorktreeError::PathExists(to.to_path_buf()));
    }

    fs::rename(&wt_root, to)?;
    let new_root = fs::canonicalize(to)?;
    fs::write(
        new_root.join(META_DIR),
        format!("rvsdir: {}", meta.display()),
    )?;
    fs::write(meta.join("path"), new_root.display().to_string())?;
    Ok(new_root)
}

/// Resolve what the new worktree should check out.
fn resolve_target(
    repo: &Repository,
    target: Option<&str>,
    opts: &AddOptions,
) -> Result<(Option<String>, ObjectId), WorktreeError> {
    if let Some(name) = opts.force_new_branch.clone().or_else(|| opts.new_branch.clone()) {
        let commit = repo.resolve_commit_ish(target.unwrap_or("HEAD"))?;
        return Ok((Some(name), commit));
    }

    match target {
        Some(spec) => {
            if opts.detach {
                return Ok((None, repo.resolve_commit_ish(spec)?));
            }
            // A branch name checks out that branch; anything else detaches.
            if let Some(commit) = repo.refs().resolve_branch(spec)? {
                Ok((Some(spec.to_string()), commit))
            } else {
                Ok((None, repo.resolve_commit_ish(spec)?))
            }
        }
        None => {
            let head = repo.head()?;
            let commit = repo.resolve_commit_ish("HEAD")?;
            Ok((head.branch_name().map(str::to_string), commit))
        }
    }
}

/// Follow a worktree root's `.rvs` marker file to its metadata directory.
fn metadata_dir_of(wt_root: &Path) -> Result<PathBuf, WorktreeError> {
    let marker = wt_root.join(META_DIR);
    let content = fs::read_to_string(&marker)
        .map_err(|_| WorktreeError::NotAWorktree(wt_root.to_path_buf()))?;
    match content.trim().strip_prefix("rvsdir: ") {
        Some(path) => Ok(PathBuf::from(path)),
        None => Err(WorktreeError::NotAWorktree(wt_root.to_path_buf())),
    }
}

/// Metadata entry name for a worktree root.
fn worktree_name(wt_root: &Path) -> String {
    wt_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "worktree".to_string())
}
