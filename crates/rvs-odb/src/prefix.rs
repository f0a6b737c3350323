//! OID prefix resolution (short hex → full OID with ambiguity detection).
//!
//! A single routine shared by every command that accepts abbreviated object
//! names; callers optionally restrict matches to one object kind.

use rvs_hash::hex::is_hex_digits;
use rvs_hash::ObjectId;
use rvs_object::ObjectKind;

use crate::{ObjectStore, OdbError};

/// Minimum accepted prefix length.
pub const MINIMUM_ABBREV: usize = 4;

impl ObjectStore {
    /// Resolve a hex prefix to a full OID.
    ///
    /// Returns an error if the prefix is shorter than [`MINIMUM_ABBREV`],
    /// ambiguous (matches multiple distinct objects), or matches nothing.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<ObjectId, OdbError> {
        self.resolve_prefix_of_kind(prefix, None)
    }

    /// Resolve a hex prefix, restricted to objects of the given kind.
    pub fn resolve_prefix_of_kind(
        &self,
        prefix: &str,
        kind: Option<ObjectKind>,
    ) -> Result<ObjectId, OdbError> {
        if prefix.len() < MINIMUM_ABBREV || !is_hex_digits(prefix) {
            return Err(OdbError::PrefixNotFound(prefix.to_string()));
        }

        // A full-length hex is an existence check, not a scan.
        if prefix.len() == 40 {
            let oid = ObjectId::from_hex(prefix)?;
            if self.contains(&oid) && self.matches_kind(&oid, kind)? {
                return Ok(oid);
            }
            return Err(OdbError::PrefixNotFound(prefix.to_string()));
        }

        let mut matches: Vec<ObjectId> = Vec::new();
        for result in self.iter()? {
            let oid = result?;
            if oid.starts_with_hex(prefix) && self.matches_kind(&oid, kind)? {
                matches.push(oid);
            }
        }

        matches.sort();
        matches.dedup();

        match matches.len() {
            0 => Err(OdbError::PrefixNotFound(prefix.to_string())),
            1 => Ok(matches[0]),
            n => Err(OdbError::AmbiguousPrefix {
                prefix: prefix.to_string(),
                count: n,
            }),
        }
    }

    fn matches_kind(&self, oid: &ObjectId, kind: Option<ObjectKind>) -> Result<bool, OdbError> {
        match kind {
            None => Ok(true),
            Some(expected) => Ok(self.kind_of(oid)? == Some(expected)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_prefix_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::open(dir.path());

        let oid = store.write_payload(ObjectKind::Blob, b"content").unwrap();
        let prefix = &oid.to_hex()[..6];
        assert_eq!(store.resolve_prefix(prefix).unwrap(), oid);
    }

    #[test]
    fn short_prefix_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::open(dir.path());
        assert!(matches!(
            store.resolve_prefix("abc").unwrap_err(),
            OdbError::PrefixNotFound(_)
        ));
    }

    #[test]
    fn no_match_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::open(dir.path());
        store.write_payload(ObjectKind::Blob, b"a").unwrap();
        assert!(matches!(
            store.resolve_prefix("0123456789").unwrap_err(),
            OdbError::PrefixNotFound(_)
        ));
    }

    #[test]
    fn kind_filter_excludes_other_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::open(dir.path());

        let blob = store.write_payload(ObjectKind::Blob, b"payload").unwrap();
        let prefix = blob.to_hex()[..8].to_string();

        assert_eq!(
            store
                .resolve_prefix_of_kind(&prefix, Some(ObjectKind::Blob))
                .unwrap(),
            blob
        );
        assert!(store
            .resolve_prefix_of_kind(&prefix, Some(ObjectKind::Commit))
            .is_err());
    }

    #[test]
    fn full_hex_checks_existence_directly() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::open(dir.path());

        let oid = store.write_payload(ObjectKind::Blob, b"full").unwrap();
        assert_eq!(store.resolve_prefix(&oid.to_hex()).unwrap(), oid);

        let absent = "0000000000000000000000000000000000000001";
        assert!(store.resolve_prefix(absent).is_err());
    }
}
