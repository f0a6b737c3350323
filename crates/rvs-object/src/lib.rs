//! rvs object model: blob, tree, and commit parsing and serialization.
//!
//! Provides Rust types for the three object kinds, their parsing from raw
//! payload bytes, and serialization to the canonical on-disk format.

mod blob;
mod commit;
pub mod header;
mod tree;

pub use blob::Blob;
pub use commit::{Commit, DEFAULT_AUTHOR};
pub use tree::{Tree, TreeEntry};

use rvs_hash::{Hasher, ObjectId};

/// Errors produced by object operations.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("invalid object kind: {0}")]
    InvalidKind(String),

    #[error("invalid object header: {0}")]
    InvalidHeader(String),

    #[error("object size mismatch: header says {expected} bytes, payload has {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid tree record at line {line}: {reason}")]
    InvalidTreeRecord { line: usize, reason: String },

    #[error("invalid commit payload: {0}")]
    InvalidCommit(String),

    #[error(transparent)]
    Hash(#[from] rvs_hash::HashError),
}

/// The three kinds of rvs objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    /// Parse from the kind string in object headers.
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        match s {
            b"blob" => Ok(Self::Blob),
            b"tree" => Ok(Self::Tree),
            b"commit" => Ok(Self::Commit),
            _ => Err(ObjectError::InvalidKind(
                String::from_utf8_lossy(s).into_owned(),
            )),
        }
    }

    /// The canonical name used in headers and tree records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = ObjectError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

/// A parsed rvs object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    /// Parse from framed bytes (header + payload).
    pub fn parse(data: &[u8]) -> Result<Self, ObjectError> {
        let (kind, payload_size, header_len) = header::parse_header(data)?;
        let payload = &data[header_len..];
        if payload.len() != payload_size {
            return Err(ObjectError::SizeMismatch {
                expected: payload_size,
                actual: payload.len(),
            });
        }
        Self::parse_payload(kind, payload)
    }

    /// Parse from payload bytes with known kind (no header).
    pub fn parse_payload(kind: ObjectKind, payload: &[u8]) -> Result<Self, ObjectError> {
        match kind {
            ObjectKind::Blob => Ok(Self::Blob(Blob::new(payload.to_vec()))),
            ObjectKind::Tree => Ok(Self::Tree(Tree::parse(payload)?)),
            ObjectKind::Commit => Ok(Self::Commit(Commit::parse(payload)?)),
        }
    }

    /// Serialize to framed form (header + payload).
    pub fn serialize(&self) -> Vec<u8> {
        let payload = self.serialize_payload();
        let hdr = header::write_header(self.kind(), payload.len());
        let mut out = Vec::with_capacity(hdr.len() + payload.len());
        out.extend_from_slice(&hdr);
        out.extend_from_slice(&payload);
        out
    }

    /// Serialize just the payload (no header).
    pub fn serialize_payload(&self) -> Vec<u8> {
        match self {
            Self::Blob(b) => b.data.clone(),
            Self::Tree(t) => t.serialize_payload(),
            Self::Commit(c) => c.serialize_payload(),
        }
    }

    /// Get the object kind.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    /// Compute the OID by hashing the framed form.
    pub fn compute_oid(&self) -> ObjectId {
        Hasher::hash_object(self.kind().as_str(), &self.serialize_payload())
    }
}
