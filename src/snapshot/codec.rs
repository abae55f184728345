//! Snapshot codec
//!
//! Encoding and decoding of the snapshot document.
//!
//! ## Document Format
//!
//! ```text
//! {
//!   "chirps": [ { "id": 1, "body": "...", "author_id": 1 }, ... ],
//!   "users":  [ { "id": 1, "email": "...", "password": "...",
//!                 "refresh_token_secret": null, "is_chirpy_red": false }, ... ]
//! }
//! ```
//!
//! Counters are not stored; they are derived from the ids on load.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::model::{Post, Record, User};

/// Owned snapshot document, produced by [`decode`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SnapshotDocument {
    #[serde(rename = "chirps", default)]
    pub posts: Vec<Post>,

    #[serde(default)]
    pub users: Vec<User>,
}

/// Borrowed view of the store used by [`encode`], so the lock holder can
/// serialize without cloning every record
#[derive(Debug, Serialize)]
pub struct SnapshotRef<'a> {
    #[serde(rename = "chirps")]
    pub posts: &'a [Post],

    pub users: &'a [User],
}

/// The document written for a store with no records
pub const EMPTY_DOCUMENT: &[u8] = b"{}";

/// Encode a store view to JSON bytes
pub fn encode(snapshot: &SnapshotRef<'_>) -> Result<Vec<u8>> {
    serde_json::to_vec(snapshot).map_err(|e| StoreError::Encode(e.to_string()))
}

/// Decode JSON bytes into a document
///
/// Rejects syntactically malformed documents, wrongly typed fields, and
/// arrays whose element `i` does not carry id `i + 1`.
pub fn decode(bytes: &[u8]) -> Result<SnapshotDocument> {
    let document: SnapshotDocument =
        serde_json::from_slice(bytes).map_err(|e| StoreError::Decode(e.to_string()))?;

    check_contiguous(&document.posts)?;
    check_contiguous(&document.users)?;

    Ok(document)
}

fn check_contiguous<T: Record>(records: &[T]) -> Result<()> {
    for (position, record) in records.iter().enumerate() {
        let expected = position as u64 + 1;
        if record.id() != expected {
            return Err(StoreError::Decode(format!(
                "{}[{}] has id {}, expected {}",
                T::KIND.document_field(),
                position,
                record.id(),
                expected
            )));
        }
    }
    Ok(())
}
