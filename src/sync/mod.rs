//! Sync Module
//!
//! Periodic persistence of the record store.
//!
//! ## Responsibilities
//! - Snapshot the store on a fixed interval, independent of traffic
//! - Write each snapshot atomically to the backing file
//! - Retry failed writes with bounded backoff; never crash the process
//! - Surface health (successes, failure streak, last error)
//!
//! ## Tick
//! ```text
//!   lock ─► encode ─► unlock ─► write .tmp ─► fsync ─► rename
//!                                   │
//!                             error ▼
//!                     backoff, retry (max_attempts)
//!                                   │
//!                         exhausted ▼
//!                 record failure, wait for next tick
//! ```

mod health;
mod scheduler;

pub use health::{SyncHealth, SyncStatus};
pub use scheduler::{SyncHandle, Syncer};

/// Result of a successful sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The snapshot was written to the backing file
    Written { bytes: usize, checksum: u32 },

    /// The snapshot matched the last one written; nothing was written
    Unchanged { checksum: u32 },
}
