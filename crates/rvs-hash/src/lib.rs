//! Hash computation and object identity for the rvs version control engine.
//!
//! Provides the core `ObjectId` type (a SHA-1 digest), hex encoding/decoding,
//! and the streaming `Hasher` used to compute object identities.

pub mod hex;
mod hasher;
mod oid;

pub use hasher::Hasher;
pub use oid::ObjectId;

/// Errors produced by hash operations.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("invalid hex length: expected {expected}, got {actual}")]
    InvalidHexLength { expected: usize, actual: usize },

    #[error("invalid hex character '{character}' at position {position}")]
    InvalidHex { position: usize, character: char },
}
