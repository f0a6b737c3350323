//! Foundation utilities for the rvs version control engine.
//!
//! Provides repo-relative path normalization shared by every subsystem that
//! touches the working tree.

pub mod path;
pub mod pattern;

pub use path::{normalize_path, RepoPath};
pub use pattern::{matches_any, matches_pattern};

/// Errors produced by utility operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    #[error("path '{0}' is outside the repository")]
    PathOutsideRepo(String),

    #[error("path '{0}' is not valid UTF-8")]
    NonUtf8Path(std::path::PathBuf),
}
