//! Checkout engine: switch working-tree state between commits with safety
//! checks, materialize trees, and reset HEAD/index/working tree.

pub mod materialize;
mod reset;
mod switch;

pub use materialize::{materialize_tree, update_index_to, write_blob_file};
pub use reset::{reset, reset_paths, PathReset, PathResetAction, ResetMode};
pub use switch::{checkout_paths, is_dirty, switch, PathCheckout, SwitchOptions, SwitchOutcome};

/// Errors from checkout operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(
        "your local changes would be overwritten by checkout; \
         commit or stash them before you switch branches"
    )]
    DirtyWorkingTree,

    #[error("a branch named '{0}' already exists")]
    BranchExists(String),

    #[error("'{0}' is already checked out at another worktree")]
    BranchCheckedOutElsewhere(String),

    #[error("you are on a branch yet to be born")]
    UnbornHead,

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
