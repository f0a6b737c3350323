use std::path::{Component, Path, PathBuf};

use crate::UtilError;

/// A repo-normalized path: forward slashes, relative to the repository root,
/// no `.` or `..` components.
///
/// The engine stores these as plain `String`s in trees and the index; this
/// type is the single place that produces them.
pub type RepoPath = String;

/// Normalize a caller-supplied path against the repository root.
///
/// The path may be absolute or relative to `repo_root`. `.` and `..`
/// components are resolved lexically. Paths that escape the repository
/// root are rejected.
pub fn normalize_path(repo_root: &Path, path: &Path) -> Result<RepoPath, UtilError> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    };

    let resolved = resolve_dots(&joined);
    let rel = resolved
        .strip_prefix(repo_root)
        .map_err(|_| UtilError::PathOutsideRepo(path.display().to_string()))?;

    to_slash_string(rel)
}

/// Convert a relative path to a forward-slash `String`.
pub fn to_slash_string(rel: &Path) -> Result<RepoPath, UtilError> {
    let mut out = String::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| UtilError::NonUtf8Path(rel.to_path_buf()))?;
                if !out.is_empty() {
                    out.push('/');
                }
                out.push_str(part);
            }
            Component::CurDir => {}
            _ => return Err(UtilError::PathOutsideRepo(rel.display().to_string())),
        }
    }
    Ok(out)
}

/// Lexically resolve `.` and `..` components without touching the filesystem.
fn resolve_dots(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
