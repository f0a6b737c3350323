//! Repository discovery, initialization, and central access for all rvs
//! subsystems.
//!
//! Opening a path yields one of two variants: a main repository whose `.rvs`
//! marker is a directory, or a linked worktree whose `.rvs` marker is a file
//! pointing at a per-worktree metadata directory. Objects and refs always
//! live in the main metadata directory; HEAD and the index are per-worktree.

mod error;
pub mod hooks;
mod init;
pub mod revision;
pub mod scan;

pub use error::RepoError;
pub use init::init_repository;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rvs_hash::ObjectId;
use rvs_index::Index;
use rvs_odb::ObjectStore;
use rvs_ref::{Head, RefStore};

/// Name of the repository metadata marker at the working tree root.
pub const META_DIR: &str = ".rvs";

/// Prefix of the `.rvs` marker file in a linked worktree.
const WORKTREE_MARKER_PREFIX: &str = "rvsdir: ";

/// Kind of repository this handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    /// The primary worktree; `.rvs` is a directory.
    Main,
    /// A linked worktree; `.rvs` is a file pointing at per-worktree metadata.
    Worktree,
}

/// The central repository handle tying all subsystems together.
///
/// Owns the paths to the object store, ref store, index, and worktree
/// metadata; engines take `&Repository` instead of consulting globals.
pub struct Repository {
    /// Root of this working tree.
    work_dir: PathBuf,
    /// Metadata directory holding this worktree's HEAD and index.
    meta_dir: PathBuf,
    /// Main metadata directory holding objects and refs (same as `meta_dir`
    /// for a main repository).
    common_dir: PathBuf,
    kind: RepositoryKind,
    odb: ObjectStore,
    refs: RefStore,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("work_dir", &self.work_dir)
            .field("meta_dir", &self.meta_dir)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Open the repository whose working tree root is `path`.
    ///
    /// Follows the worktree marker file when `.rvs` is a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let work_dir = canonical(path.as_ref())?;
        let marker = work_dir.join(META_DIR);

        if marker.is_dir() {
            return Ok(Self::assemble(
                work_dir,
                marker.clone(),
                marker,
                RepositoryKind::Main,
            ));
        }

        if marker.is_file() {
            let meta_dir = read_worktree_marker(&marker)?;
            let gitdir_file = meta_dir.join("gitdir");
            let common_dir = match fs::read_to_string(&gitdir_file) {
                Ok(content) => PathBuf::from(content.trim()),
                Err(_) => {
                    return Err(RepoError::InvalidWorktree {
                        path: marker,
                        reason: "missing gitdir file in worktree metadata".into(),
                    })
                }
            };
            if !common_dir.is_dir() {
                return Err(RepoError::InvalidWorktree {
                    path: marker,
                    reason: format!(
                        "main repository not found at {}",
                        common_dir.display()
                    ),
                });
            }
            return Ok(Self::assemble(
                work_dir,
                meta_dir,
                common_dir,
                RepositoryKind::Worktree,
            ));
        }

        Err(RepoError::NotARepository(work_dir))
    }

    fn assemble(
        work_dir: PathBuf,
        meta_dir: PathBuf,
        common_dir: PathBuf,
        kind: RepositoryKind,
    ) -> Self {
        let odb = ObjectStore::open(common_dir.join("objects"));
        let refs = RefStore::open(&common_dir, meta_dir.join("HEAD"));
        Self {
            work_dir,
            meta_dir,
            common_dir,
            kind,
            odb,
            refs,
        }
    }

    // --- Path accessors ---

    /// Root of this working tree.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// This worktree's metadata directory (HEAD, index).
    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    /// Main metadata directory (objects, refs, worktrees, stash).
    pub fn common_dir(&self) -> &Path {
        &self.common_dir
    }

    /// Repository kind.
    pub fn kind(&self) -> RepositoryKind {
        self.kind
    }

    /// Whether this handle is a linked worktree.
    pub fn is_worktree(&self) -> bool {
        self.kind == RepositoryKind::Worktree
    }

    /// Path to this worktree's index file.
    pub fn index_path(&self) -> PathBuf {
        self.meta_dir.join("index")
    }

    /// Path to the shared stash file.
    pub fn stash_path(&self) -> PathBuf {
        self.common_dir.join("stash")
    }

    /// Path to the shared `worktrees/` metadata directory.
    pub fn worktrees_dir(&self) -> PathBuf {
        self.common_dir.join("worktrees")
    }

    // --- Subsystem accessors ---

    /// Access the object store.
    pub fn odb(&self) -> &ObjectStore {
        &self.odb
    }

    /// Access the reference store.
    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    /// Load this worktree's index from disk.
    pub fn load_index(&self) -> Result<Index, RepoError> {
        Ok(Index::load(&self.index_path())?)
    }

    /// Persist this worktree's index.
    pub fn save_index(&self, index: &Index) -> Result<(), RepoError> {
        Ok(index.save(&self.index_path())?)
    }

    // --- Convenience ---

    /// Resolve HEAD.
    pub fn head(&self) -> Result<Head, RepoError> {
        Ok(self.refs.current_head()?)
    }

    /// The commit HEAD points at, if any.
    pub fn head_commit(&self) -> Result<Option<ObjectId>, RepoError> {
        Ok(self.refs.head_commit()?)
    }

    /// Read a commit's tree as a path → blob map.
    pub fn tree_map_of(&self, commit: &ObjectId) -> Result<BTreeMap<String, ObjectId>, RepoError> {
        let commit = self.odb.require_commit(commit)?;
        let tree = self.odb.require_tree(&commit.tree)?;
        Ok(tree.to_map())
    }

    /// Read HEAD's committed tree map; empty when there are no commits yet.
    pub fn head_tree_map(&self) -> Result<BTreeMap<String, ObjectId>, RepoError> {
        match self.head_commit()? {
            Some(oid) => self.tree_map_of(&oid),
            None => Ok(BTreeMap::new()),
        }
    }
}

/// Parse the worktree `.rvs` marker file: `rvsdir: <path>`.
fn read_worktree_marker(marker: &Path) -> Result<PathBuf, RepoError> {
    let content = fs::read_to_string(marker)?;
    let content = content.trim();
    match content.strip_prefix(WORKTREE_MARKER_PREFIX) {
        Some(path) => Ok(PathBuf::from(path)),
        None => Err(RepoError::InvalidWorktree {
            path: marker.to_path_buf(),
            reason: format!("unrecognized marker content: {content}"),
        }),
    }
}

fn canonical(path: &Path) -> Result<PathBuf, RepoError> {
    fs::canonicalize(path).map_err(|_| RepoError::NotARepository(path.to_path_buf()))
}
