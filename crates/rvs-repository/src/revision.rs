//! Commit-ish and tree-ish resolution.
//!
//! A user-supplied string resolves in this order: literal `HEAD`, branch
//! name, exact 40-hex commit, then unique hex prefix (≥ 4 digits) restricted
//! to commit objects. `HEAD~N` walks N first parents.

use rvs_hash::hex::is_hex_digits;
use rvs_hash::ObjectId;
use rvs_object::ObjectKind;

use crate::{RepoError, Repository};

impl Repository {
    /// Resolve a commit-ish string to a commit OID.
    pub fn resolve_commit_ish(&self, spec: &str) -> Result<ObjectId, RepoError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(RepoError::InvalidRevision(spec.to_string()));
        }

        // HEAD and HEAD~N ancestry.
        if spec == "HEAD" {
            return self
                .head_commit()?
                .ok_or_else(|| RepoError::InvalidRevision(spec.to_string()));
        }
        if let Some(rest) = spec.strip_prefix("HEAD~") {
            let steps: usize = rest
                .parse()
                .map_err(|_| RepoError::InvalidRevision(spec.to_string()))?;
            return self.nth_ancestor(steps, spec);
        }

        // Branch name.
        if let Some(oid) = self.refs().resolve_branch(spec)? {
            return Ok(oid);
        }

        // Exact 40-hex commit.
        if spec.len() == 40 && is_hex_digits(spec) {
            let oid = ObjectId::from_hex(spec)
                .map_err(|_| RepoError::InvalidRevision(spec.to_string()))?;
            if self.odb().kind_of(&oid)? == Some(ObjectKind::Commit) {
                return Ok(oid);
            }
            return Err(RepoError::InvalidRevision(spec.to_string()));
        }

        // Unique prefix, commits only.
        if spec.len() >= 4 && is_hex_digits(spec) {
            return match self
                .odb()
                .resolve_prefix_of_kind(spec, Some(ObjectKind::Commit))
            {
                Ok(oid) => Ok(oid),
                Err(rvs_odb::OdbError::PrefixNotFound(_)) => {
                    Err(RepoError::InvalidRevision(spec.to_string()))
                }
                Err(e) => Err(e.into()),
            };
        }

        Err(RepoError::InvalidRevision(spec.to_string()))
    }

    /// Resolve a tree-ish string to a tree OID.
    ///
    /// Accepts everything `resolve_commit_ish` does (unwrapping commits to
    /// their trees) plus direct tree hexes and prefixes.
    pub fn resolve_tree_ish(&self, spec: &str) -> Result<ObjectId, RepoError> {
        if let Ok(commit_oid) = self.resolve_commit_ish(spec) {
            let commit = self.odb().require_commit(&commit_oid)?;
            return Ok(commit.tree);
        }

        let spec = spec.trim();
        if spec.len() >= 4 && is_hex_digits(spec) {
            if let Ok(oid) = self
                .odb()
                .resolve_prefix_of_kind(spec, Some(ObjectKind::Tree))
            {
                return Ok(oid);
            }
        }

        Err(RepoError::InvalidRevision(spec.to_string()))
    }

    fn nth_ancestor(&self, steps: usize, spec: &str) -> Result<ObjectId, RepoError> {
        let mut current = self
            .head_commit()?
            .ok_or_else(|| RepoError::InvalidRevision(spec.to_string()))?;
        for _ in 0..steps {
            let commit = self.odb().require_commit(&current)?;
            current = commit
                .first_parent()
                .ok_or_else(|| RepoError::InvalidRevision(spec.to_string()))?;
        }
        Ok(current)
    }
}
