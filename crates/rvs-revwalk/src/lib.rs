//! Revision walking: first-parent traversal, ancestor sets, merge-base
//! discovery, and rebase ranges.

mod merge_base;
mod walk;

pub use merge_base::{ancestors_of, is_ancestor, merge_base};
pub use walk::{commits_to_replay, FirstParentWalk};

/// Errors from revision walking.
#[derive(Debug, thiserror::Error)]
pub enum RevWalkError {
    #[error(transparent)]
    Odb(#[from] rvs_odb::OdbError),

    #[error(transparent)]
    Repo(#[from] rvs_repository::RepoError),
}
