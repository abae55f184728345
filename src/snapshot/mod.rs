//! Snapshot Module
//!
//! Serializes the whole store to one JSON document and persists it.
//!
//! ## Responsibilities
//! - Map store state to and from the snapshot document (`codec`)
//! - Reject malformed or non-contiguous documents
//! - Replace the backing file atomically (`file`)
//!
//! ## Crash Safety
//! ```text
//!   snapshot bytes ──► data.json.tmp ──fsync──► rename ──► data.json
//! ```
//! A crash before the rename leaves the previous document in place.

pub mod codec;
pub mod file;

pub use codec::{decode, encode, SnapshotDocument, SnapshotRef, EMPTY_DOCUMENT};

/// CRC32 of a snapshot buffer
pub fn checksum(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}
