//! Snapshot engine: stage working-tree paths and turn the index plus parent
//! tree into a new commit.

mod add;
mod commit;

pub use add::{add, AddReport};
pub use commit::{commit, CommitOutcome, CommitStats};

/// Errors from staging and committing.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("pathspec '{0}' did not match any files")]
    PathNotFound(String),

    #[error("commit aborted by pre-commit hook")]
    HookRejected,

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
