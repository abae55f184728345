//! Post record

use serde::{Deserialize, Serialize};

use super::{CollectionKind, Record};

/// A short post ("chirp") written by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Store-assigned id, `0` until inserted
    pub id: u64,

    /// Post text, already length-checked and filtered by the caller
    pub body: String,

    /// Id of the authoring user (not enforced by the store)
    pub author_id: u64,
}

impl Post {
    /// Create a new, not yet stored post
    pub fn new(body: impl Into<String>, author_id: u64) -> Self {
        Self {
            id: 0,
            body: body.into(),
            author_id,
        }
    }
}

impl Record for Post {
    const KIND: CollectionKind = CollectionKind::Posts;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}
