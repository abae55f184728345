//! Store Module
//!
//! In-memory record store for posts and users.
//!
//! ## Responsibilities
//! - Assign sequential ids on insert
//! - Replace records in place on upsert
//! - Compact and renumber on delete
//! - Serialize the whole state for the sync scheduler
//!
//! ## Contiguity
//! ```text
//!   position:  0   1   2   3
//!   id:        1   2   3   4
//!
//!   delete(2)  →  position:  0   1   2
//!                 id:        1   2   3     (old 3 → 2, old 4 → 3)
//! ```
//! Because position `i` always holds id `i + 1`, upsert is an index
//! operation; delete pays for it with an O(n) renumbering.

mod record_store;
mod table;

pub use record_store::RecordStore;
pub use table::Table;

/// Snapshot of both id counters
///
/// The next insert into a collection receives `counter + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub posts: u64,
    pub users: u64,
}
