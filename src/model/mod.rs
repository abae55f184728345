//! Model Module
//!
//! Record types held by the store.
//!
//! ## Responsibilities
//! - Define the two entity kinds (posts and users) and their JSON field names
//! - Expose the id accessors the store needs through [`Record`]
//!
//! ## Identity
//! An `id` of `0` marks a record that has not been stored yet. The store
//! assigns every other id, so callers never pick one for a new record.

mod post;
mod user;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use post::Post;
pub use user::User;

/// Which collection a record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    Posts,
    Users,
}

impl CollectionKind {
    /// Name of the collection's array in the snapshot document
    pub fn document_field(&self) -> &'static str {
        match self {
            CollectionKind::Posts => "chirps",
            CollectionKind::Users => "users",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Posts => write!(f, "post"),
            CollectionKind::Users => write!(f, "user"),
        }
    }
}

/// A record with a store-assigned sequential id
pub trait Record: Clone {
    /// Collection this record type is stored in
    const KIND: CollectionKind;

    /// The record's id (`0` if not yet stored)
    fn id(&self) -> u64;

    /// Overwrite the record's id
    fn set_id(&mut self, id: u64);

    /// True if the store has not assigned an id yet
    fn is_new(&self) -> bool {
        self.id() == 0
    }
}
