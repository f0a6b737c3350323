use chrono::{Local, TimeZone};
use rvs_hash::ObjectId;
use serde::{Deserialize, Serialize};

use crate::ObjectError;

/// Default author recorded when none is configured.
pub const DEFAULT_AUTHOR: &str = "RVS User";

/// An immutable record of (tree, parents, message, author, time).
///
/// Parenthood is canonically a list: empty for a root commit, one entry for
/// an ordinary commit, two for a merge (first entry is "ours"). Payloads
/// written by older tools with `parent` / `merge_parent` fields are still
/// accepted on parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
    pub message: String,
    pub author: String,
    /// Seconds since the epoch, UTC.
    pub timestamp: i64,
    /// Human-readable mirror of `timestamp`.
    pub date: String,
}

/// On-disk JSON shape. Kept separate so the in-memory type can use
/// `ObjectId` while the wire format stays plain hex strings.
#[derive(Serialize)]
struct CommitWireOut<'a> {
    tree: String,
    parents: Vec<String>,
    message: &'a str,
    timestamp: i64,
    date: &'a str,
    author: &'a str,
}

#[derive(Deserialize)]
struct CommitWireIn {
    tree: String,
    #[serde(default)]
    parents: Option<Vec<String>>,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    merge_parent: Option<String>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    date: String,
    #[serde(default)]
    author: Option<String>,
}

impl Commit {
    /// Create a commit stamped with the current time.
    pub fn new(
        tree: ObjectId,
        parents: Vec<ObjectId>,
        message: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        let timestamp = Local::now().timestamp();
        Self::with_timestamp(tree, parents, message, author, timestamp)
    }

    /// Create a commit with an explicit timestamp.
    pub fn with_timestamp(
        tree: ObjectId,
        parents: Vec<ObjectId>,
        message: impl Into<String>,
        author: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            tree,
            parents,
            message: message.into(),
            author: author.into(),
            timestamp,
            date: format_date(timestamp),
        }
    }

    /// The first parent, if any.
    pub fn first_parent(&self) -> Option<ObjectId> {
        self.parents.first().copied()
    }

    /// Whether this commit has two parents.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Parse from JSON payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self, ObjectError> {
        let wire: CommitWireIn = serde_json::from_slice(payload)
            .map_err(|e| ObjectError::InvalidCommit(e.to_string()))?;

        let tree = parse_hex("tree", &wire.tree)?;

        let parents = match wire.parents {
            Some(hexes) => hexes
                .iter()
                .map(|h| parse_hex("parents", h))
                .collect::<Result<Vec<_>, _>>()?,
            None => {
                let mut out = Vec::new();
                if let Some(ref parent) = wire.parent {
                    out.push(parse_hex("parent", parent)?);
                }
                if let Some(ref merge_parent) = wire.merge_parent {
                    out.push(parse_hex("merge_parent", merge_parent)?);
                }
                out
            }
        };

        Ok(Self {
            tree,
            parents,
            message: wire.message,
            author: wire.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            timestamp: wire.timestamp,
            date: wire.date,
        })
    }

    /// Serialize to the canonical pretty-printed JSON payload.
    pub fn serialize_payload(&self) -> Vec<u8> {
        let wire = CommitWireOut {
            tree: self.tree.to_hex(),
            parents: self.parents.iter().map(ObjectId::to_hex).collect(),
            message: &self.message,
            timestamp: self.timestamp,
            date: &self.date,
            author: &self.author,
        };
        // Pretty printing cannot fail for this shape.
        serde_json::to_vec_pretty(&wire).unwrap_or_default()
    }
}

fn parse_hex(field: &str, hex: &str) -> Result<ObjectId, ObjectError> {
    ObjectId::from_hex(hex)
        .map_err(|e| ObjectError::InvalidCommit(format!("bad '{field}' field: {e}")))
}

/// Render a timestamp in the local zone, `YYYY-MM-DD HH:MM:SS`.
fn format_date(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => String::new(),
    }
}
