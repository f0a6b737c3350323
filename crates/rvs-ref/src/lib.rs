//! Reference store: named branch pointers under `refs/heads/` and the HEAD
//! file, which is either symbolic (`ref: refs/heads/<name>`) or holds a bare
//! commit hex (detached).
//!
//! Branches are shared across worktrees; HEAD is per-worktree, so the store
//! is built from two paths. Writes are last-writer-wins with no locking —
//! concurrent updaters must serialize externally.

use std::fs;
use std::path::{Path, PathBuf};

use rvs_hash::ObjectId;

const SYMBOLIC_PREFIX: &str = "ref: refs/heads/";

/// Errors from reference operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("malformed ref file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The resolved state of HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// Symbolic HEAD naming a branch with at least one commit.
    Branch { name: String, target: ObjectId },
    /// Symbolic HEAD naming a branch whose ref file does not exist yet
    /// (orphan branch; the first commit creates the file).
    Unborn { name: String },
    /// HEAD holds a bare commit hex.
    Detached(ObjectId),
}

impl Head {
    /// The commit HEAD points at, if any.
    pub fn commit(&self) -> Option<ObjectId> {
        match self {
            Head::Branch { target, .. } => Some(*target),
            Head::Unborn { .. } => None,
            Head::Detached(oid) => Some(*oid),
        }
    }

    /// The branch name HEAD is attached to, if any.
    pub fn branch_name(&self) -> Option<&str> {
        match self {
            Head::Branch { name, .. } | Head::Unborn { name } => Some(name),
            Head::Detached(_) => None,
        }
    }

    /// Whether HEAD is detached.
    pub fn is_detached(&self) -> bool {
        matches!(self, Head::Detached(_))
    }
}

/// Reference store over a shared refs directory and a per-worktree HEAD file.
pub struct RefStore {
    /// `refs/heads/` under the main metadata directory (shared).
    heads_dir: PathBuf,
    /// This worktree's HEAD file.
    head_path: PathBuf,
}

impl RefStore {
    /// Open a ref store. `common_dir` is the main metadata directory holding
    /// `refs/`; `head_path` is this worktree's HEAD file.
    pub fn open(common_dir: &Path, head_path: PathBuf) -> Self {
        Self {
            heads_dir: common_dir.join("refs").join("heads"),
            head_path,
        }
    }

    /// Path to the shared `refs/heads/` directory.
    pub fn heads_dir(&self) -> &Path {
        &self.heads_dir
    }

    /// Path to this worktree's HEAD file.
    pub fn head_path(&self) -> &Path {
        &self.head_path
    }

    /// Read and resolve HEAD.
    ///
    /// A missing HEAD file reads as an unborn `main`, matching a freshly
    /// created metadata directory.
    pub fn current_head(&self) -> Result<Head, RefError> {
        let content = match fs::read_to_string(&self.head_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Head::Unborn {
                    name: "main".to_string(),
                })
            }
            Err(e) => {
                return Err(RefError::Io {
                    path: self.head_path.clone(),
                    source: e,
                })
            }
        };
        let content = content.trim();

        if let Some(branch) = content.strip_prefix(SYMBOLIC_PREFIX) {
            let name = branch.to_string();
            return match self.resolve_branch(&name)? {
                Some(target) => Ok(Head::Branch { name, target }),
                None => Ok(Head::Unborn { name }),
            };
        }

        let oid = ObjectId::from_hex(content).map_err(|e| RefError::Parse {
            path: self.head_path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Head::Detached(oid))
    }

    /// The commit HEAD currently points at, if any.
    pub fn head_commit(&self) -> Result<Option<ObjectId>, RefError> {
        Ok(self.current_head()?.commit())
    }

    /// Resolve a branch name to its commit, or `None` if the branch does not
    /// exist.
    pub fn resolve_branch(&self, name: &str) -> Result<Option<ObjectId>, RefError> {
        let path = self.branch_path(name);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RefError::Io { path, source: e }),
        };
        let oid = ObjectId::from_hex(content.trim()).map_err(|e| RefError::Parse {
            path,
            reason: e.to_string(),
        })?;
        Ok(Some(oid))
    }

    /// Whether a branch exists.
    pub fn branch_exists(&self, name: &str) -> bool {
        self.branch_path(name).is_file()
    }

    /// Point a branch at a commit, creating the ref file if needed.
    pub fn set_branch(&self, name: &str, oid: &ObjectId) -> Result<(), RefError> {
        fs::create_dir_all(&self.heads_dir).map_err(|e| RefError::Io {
            path: self.heads_dir.clone(),
            source: e,
        })?;
        let path = self.branch_path(name);
        fs::write(&path, oid.to_hex()).map_err(|e| RefError::Io { path, source: e })
    }

    /// Delete a branch ref file.
    pub fn delete_branch(&self, name: &str) -> Result<(), RefError> {
        let path = self.branch_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RefError::Io { path, source: e }),
        }
    }

    /// Attach HEAD to a branch (symbolic form).
    pub fn set_head_symbolic(&self, name: &str) -> Result<(), RefError> {
        fs::write(&self.head_path, format!("{SYMBOLIC_PREFIX}{name}")).map_err(|e| {
            RefError::Io {
                path: self.head_path.clone(),
                source: e,
            }
        })
    }

    /// Detach HEAD at a commit.
    pub fn set_head_detached(&self, oid: &ObjectId) -> Result<(), RefError> {
        fs::write(&self.head_path, oid.to_hex()).map_err(|e| RefError::Io {
            path: self.head_path.clone(),
            source: e,
        })
    }

    /// Enumerate branches, sorted by name.
    pub fn iter_branches(&self) -> Result<Vec<(String, ObjectId)>, RefError> {
        let mut out = Vec::new();
        let entries = match fs::read_dir(&self.heads_dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
            Err(e) => {
                return Err(RefError::Io {
                    path: self.heads_dir.clone(),
                    source: e,
                })
            }
        };
        for entry in entries {
            let entry = entry.map_err(|e| RefError::Io {
                path: self.heads_dir.clone(),
                source: e,
            })?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(oid) = self.resolve_branch(&name)? {
                out.push((name, oid));
            }
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    fn branch_path(&self, name: &str) -> PathBuf {
        self.heads_dir.join(name)
    }
}
