//! Merge engine: merge-base discovery, fast-forward classification,
//! three-way tree merge with conflict-marker synthesis, and linear rebase.

mod merge;
mod rebase;
mod tree_merge;

pub use merge::{merge, MergeOptions, MergeOutcome};
pub use rebase::{rebase, RebaseOutcome};
pub use tree_merge::{merge_tree_maps, synthesize_conflict, TreeMerge};

/// Errors from merge and rebase operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("cannot merge: no commits on current branch")]
    NoCommits,

    #[error("not possible to fast-forward, aborting")]
    NotFastForward,

    #[error(transparent)]
    Repo(#[from] rvs_repository::RepoError),

    #[error(transparent)]
    Odb(#[from] rvs_odb::OdbError),

    #[error(transparent)]
    Ref(#[from] rvs_ref::RefError),

    #[error(transparent)]
    Index(#[from] rvs_index::IndexError),

    #[error(transparent)]
    RevWalk(#[from] rvs_revwalk::RevWalkError),

    #[error(transparent)]
    Checkout(#[from] rvs_checkout::CheckoutError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
