//! Staging index: the proposal for the next commit's tree.
//!
//! Persisted as a JSON map `path -> { "obj_hash": <hex> }` with one entry per
//! file. Writes are atomic: a sibling temp file in the index directory is
//! renamed over the canonical name. The index never reads the object store —
//! callers supply hashes.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use rvs_hash::ObjectId;
use serde::{Deserialize, Serialize};

/// Errors from index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("failed to read index: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write index: {0}")]
    Write(#[source] std::io::Error),

    #[error("malformed index: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("bad object hash for '{path}': {source}")]
    BadHash {
        path: String,
        #[source]
        source: rvs_hash::HashError,
    },
}

/// On-disk shape of a single entry.
#[derive(Serialize, Deserialize)]
struct IndexEntryWire {
    obj_hash: String,
}

/// The staged path → blob mapping.
///
/// After a successful commit, the index equals the committed tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: BTreeMap<String, ObjectId>,
}

impl Index {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an existing map.
    pub fn from_map(entries: BTreeMap<String, ObjectId>) -> Self {
        Self { entries }
    }

    /// Load the index from disk. A missing file is an empty index.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(IndexError::Read(e)),
        };

        let wire: BTreeMap<String, IndexEntryWire> = serde_json::from_slice(&data)?;
        let mut entries = BTreeMap::new();
        for (path, entry) in wire {
            let oid = ObjectId::from_hex(&entry.obj_hash).map_err(|source| {
                IndexError::BadHash {
                    path: path.clone(),
                    source,
                }
            })?;
            entries.insert(path, oid);
        }
        Ok(Self { entries })
    }

    /// Persist the index atomically: temp file in the same directory, then
    /// rename over the canonical name.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let wire: BTreeMap<&String, IndexEntryWire> = self
            .entries
            .iter()
            .map(|(p, oid)| {
                (
                    p,
                    IndexEntryWire {
                        obj_hash: oid.to_hex(),
                    },
                )
            })
            .collect();
        let json = serde_json::to_vec_pretty(&wire)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(IndexError::Write)?;
        tmp.write_all(&json).map_err(IndexError::Write)?;
        tmp.persist(path)
            .map_err(|e| IndexError::Write(e.error))?;
        Ok(())
    }

    /// Remove all entries from the on-disk index.
    pub fn clear(path: &Path) -> Result<(), IndexError> {
        Self::new().save(path)
    }

    // --- Map access ---

    /// Look up the staged blob for a path.
    pub fn get(&self, path: &str) -> Option<ObjectId> {
        self.entries.get(path).copied()
    }

    /// Stage or restage a path.
    pub fn insert(&mut self, path: impl Into<String>, oid: ObjectId) {
        self.entries.insert(path.into(), oid);
    }

    /// Unstage a path. Returns the previous hash, if any.
    pub fn remove(&mut self, path: &str) -> Option<ObjectId> {
        self.entries.remove(path)
    }

    /// Whether a path is staged.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of staged entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ObjectId)> {
        self.entries.iter()
    }

    /// Borrow the underlying map.
    pub fn entries(&self) -> &BTreeMap<String, ObjectId> {
        &self.entries
    }

    /// Consume into the underlying map.
    pub fn into_map(self) -> BTreeMap<String, ObjectId> {
        self.entries
    }
}
