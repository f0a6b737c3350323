use std::path::PathBuf;

/// Errors surfaced by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not an rvs repository (or any parent): {0}")]
    NotARepository(PathBuf),

    #[error("pathspec '{0}' did not match any files")]
    PathNotFound(String),

    #[error("path '{0}' is outside the repository")]
    PathOutsideRepo(String),

    #[error("invalid revision: '{0}'")]
    InvalidRevision(String),

    #[error("invalid worktree at {path}: {reason}")]
    InvalidWorktree { path: PathBuf, reason: String },

    #[error(transparent)]
    Odb(#[from] rvs_odb::OdbError),

    #[error(transparent)]
    Ref(#[from] rvs_ref::RefError),

    #[error(transparent)]
    Index(#[from] rvs_index::IndexError),

    #[error(transparent)]
    Object(#[from] rvs_object::ObjectError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<rvs_utils::UtilError> for RepoError {
    fn from(e: rvs_utils::UtilError) -> Self {
        match e {
            rvs_utils::UtilError::PathOutsideRepo(p) => RepoError::PathOutsideRepo(p),
            rvs_utils::UtilError::NonUtf8Path(p) => {
                RepoError::PathOutsideRepo(p.display().to_string())
            }
        }
    }
}
