use std::collections::BTreeMap;

use rvs_hash::ObjectId;

use crate::ObjectError;

/// A single tree record: a full slash-joined path and the blob it names.
///
/// Trees are flat — the directory hierarchy is reconstructed from path
/// prefixes when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub oid: ObjectId,
}

/// A directory snapshot: an ordered sequence of `{path, oid}` records.
///
/// The canonical payload is newline-separated ASCII records
/// `"blob <40hex> <path>"`, sorted ascending by path, no trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree from a path → blob map. Entries come out path-sorted.
    pub fn from_map(map: &BTreeMap<String, ObjectId>) -> Self {
        let entries = map
            .iter()
            .map(|(path, oid)| TreeEntry {
                path: path.clone(),
                oid: *oid,
            })
            .collect();
        Self { entries }
    }

    /// View the tree as a path → blob map.
    pub fn to_map(&self) -> BTreeMap<String, ObjectId> {
        self.entries
            .iter()
            .map(|e| (e.path.clone(), e.oid))
            .collect()
    }

    /// The ordered records of this tree.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the blob for a path.
    pub fn get(&self, path: &str) -> Option<ObjectId> {
        self.entries
            .binary_search_by(|e| e.path.as_str().cmp(path))
            .ok()
            .map(|i| self.entries[i].oid)
    }

    /// Parse the canonical payload. Malformed records are rejected, not dropped.
    pub fn parse(payload: &[u8]) -> Result<Self, ObjectError> {
        let text = std::str::from_utf8(payload).map_err(|_| ObjectError::InvalidTreeRecord {
            line: 0,
            reason: "tree payload is not valid UTF-8".into(),
        })?;

        let mut entries = Vec::new();
        if text.is_empty() {
            return Ok(Self { entries });
        }

        for (lineno, line) in text.split('\n').enumerate() {
            let line_num = lineno + 1;
            if line.is_empty() {
                return Err(ObjectError::InvalidTreeRecord {
                    line: line_num,
                    reason: "empty record".into(),
                });
            }
            let mut parts = line.splitn(3, ' ');
            let kind = parts.next().unwrap_or_default();
            let hex = parts.next().ok_or_else(|| ObjectError::InvalidTreeRecord {
                line: line_num,
                reason: "missing object hex".into(),
            })?;
            let path = parts.next().ok_or_else(|| ObjectError::InvalidTreeRecord {
                line: line_num,
                reason: "missing path".into(),
            })?;

            if kind != "blob" {
                return Err(ObjectError::InvalidTreeRecord {
                    line: line_num,
                    reason: format!("unexpected record kind '{kind}'"),
                });
            }
            let oid = ObjectId::from_hex(hex).map_err(|e| ObjectError::InvalidTreeRecord {
                line: line_num,
                reason: e.to_string(),
            })?;

            entries.push(TreeEntry {
                path: path.to_string(),
                oid,
            });
        }

        // Canonical payloads are path-sorted; tolerate unsorted input but
        // restore the invariant so lookups and re-serialization stay stable.
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(Self { entries })
    }

    /// Serialize to the canonical payload. Entries are kept path-sorted by
    /// construction, which is the record order the format requires.
    pub fn serialize_payload(&self) -> Vec<u8> {
        let records: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("blob {} {}", e.oid.to_hex(), e.path))
            .collect();
        records.join("\n").into_bytes()
    }
}
