use std::fs;
use std::io::Read;

use flate2::read::ZlibDecoder;
use rvs_hash::ObjectId;
use rvs_object::{Blob, Commit, Object, ObjectKind, Tree};

use crate::{ObjectStore, OdbError};

impl ObjectStore {
    /// Check if an object exists.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    /// Read an object by OID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` if the object exists but is corrupt.
    pub fn read(&self, oid: &ObjectId) -> Result<Option<Object>, OdbError> {
        let path = self.object_path(oid);
        let compressed = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(OdbError::Io(e)),
        };

        let decompressed = decompress_all(&compressed, oid)?;
        let obj = Object::parse(&decompressed)?;
        Ok(Some(obj))
    }

    /// Read an object that must exist.
    pub fn require(&self, oid: &ObjectId) -> Result<Object, OdbError> {
        self.read(oid)?.ok_or(OdbError::NotFound(*oid))
    }

    /// Read an object's kind without keeping the payload around.
    pub fn kind_of(&self, oid: &ObjectId) -> Result<Option<ObjectKind>, OdbError> {
        Ok(self.read(oid)?.map(|obj| obj.kind()))
    }

    /// Read an OID that must name a blob.
    pub fn require_blob(&self, oid: &ObjectId) -> Result<Blob, OdbError> {
        match self.require(oid)? {
            Object::Blob(b) => Ok(b),
            other => Err(OdbError::KindMismatch {
                oid: *oid,
                expected: ObjectKind::Blob,
                actual: other.kind(),
            }),
        }
    }

    /// Read an OID that must name a tree.
    pub fn require_tree(&self, oid: &ObjectId) -> Result<Tree, OdbError> {
        match self.require(oid)? {
            Object::Tree(t) => Ok(t),
            other => Err(OdbError::KindMismatch {
                oid: *oid,
                expected: ObjectKind::Tree,
                actual: other.kind(),
            }),
        }
    }

    /// Read an OID that must name a commit.
    pub fn require_commit(&self, oid: &ObjectId) -> Result<Commit, OdbError> {
        match self.require(oid)? {
            Object::Commit(c) => Ok(c),
            other => Err(OdbError::KindMismatch {
                oid: *oid,
                expected: ObjectKind::Commit,
                actual: other.kind(),
            }),
        }
    }
}

/// Zlib-decompress the full contents of an object file.
fn decompress_all(compressed: &[u8], oid: &ObjectId) -> Result<Vec<u8>, OdbError> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| OdbError::Decompress {
            oid: oid.to_hex(),
            source: e,
        })?;
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::open(dir.path());

        let oid = store.write_payload(ObjectKind::Blob, b"hello\n").unwrap();
        let obj = store.read(&oid).unwrap().unwrap();
        assert_eq!(obj, Object::Blob(Blob::new(b"hello\n".to_vec())));
    }

    #[test]
    fn missing_object_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::open(dir.path());

        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        assert!(store.read(&oid).unwrap().is_none());
        assert!(matches!(
            store.require(&oid).unwrap_err(),
            OdbError::NotFound(_)
        ));
    }

    #[test]
    fn corrupt_object_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::open(dir.path());

        let oid = store.write_payload(ObjectKind::Blob, b"data").unwrap();
        std::fs::write(store.object_path(&oid), b"not zlib at all").unwrap();
        assert!(store.read(&oid).is_err());
    }

    #[test]
    fn require_blob_rejects_other_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::open(dir.path());

        let oid = store.write_payload(ObjectKind::Tree, b"").unwrap();
        assert!(matches!(
            store.require_blob(&oid).unwrap_err(),
            OdbError::KindMismatch { .. }
        ));
    }

    #[test]
    fn framed_roundtrip_preserves_payload_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::open(dir.path());

        let payload: Vec<u8> = (0u8..=255).collect();
        let oid = store.write_payload(ObjectKind::Blob, &payload).unwrap();
        match store.require(&oid).unwrap() {
            Object::Blob(b) => assert_eq!(b.data, payload),
            other => panic!("unexpected object: {other:?}"),
        }
    }
}
