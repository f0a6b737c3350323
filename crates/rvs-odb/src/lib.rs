//! Content-addressed object storage: read, write, and enumerate
//! zlib-compressed objects.
//!
//! Each object lives at `objects/XX/YYYY...` where `XX` is the first byte of
//! the OID in hex and `YYYY...` is the rest. The file content is
//! zlib-compressed `"<kind> <size>\0<payload>"`. Objects are immutable once
//! written; duplicate writes are idempotent.

mod enumerate;
mod prefix;
mod read;
mod write;

pub use enumerate::ObjectIter;

use std::path::{Path, PathBuf};

use rvs_hash::ObjectId;
use rvs_object::ObjectKind;

/// Interface to an objects directory.
pub struct ObjectStore {
    /// Path to the objects directory.
    objects_dir: PathBuf,
    /// Zlib compression level.
    compression_level: flate2::Compression,
}

impl ObjectStore {
    /// Open the object store at the given objects directory.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            compression_level: flate2::Compression::default(),
        }
    }

    /// Set the zlib compression level (0–9).
    pub fn set_compression_level(&mut self, level: u32) {
        self.compression_level = flate2::Compression::new(level);
    }

    /// Path to the objects directory.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Get the file path for a given OID.
    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.objects_dir.join(oid.fanout_path())
    }
}

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum OdbError {
    #[error("object {0} not found")]
    NotFound(ObjectId),

    #[error("no object matches prefix '{0}'")]
    PrefixNotFound(String),

    #[error("ambiguous object prefix '{prefix}': matches {count} objects")]
    AmbiguousPrefix { prefix: String, count: usize },

    #[error("corrupt object {oid}: {reason}")]
    Corrupt { oid: String, reason: String },

    #[error("decompression error for {oid}: {source}")]
    Decompress {
        oid: String,
        #[source]
        source: std::io::Error,
    },

    #[error("expected {expected} object at {oid}, found {actual}")]
    KindMismatch {
        oid: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("object parse error: {0}")]
    Object(#[from] rvs_object::ObjectError),

    #[error("hash error: {0}")]
    Hash(#[from] rvs_hash::HashError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_fans_out() {
        let store = ObjectStore::open("/tmp/objects");
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        assert_eq!(
            store.object_path(&oid),
            PathBuf::from("/tmp/objects/da/39a3ee5e6b4b0d3255bfef95601890afd80709")
        );
    }
}
