//! Bootstrap Module
//!
//! Loads the record store from its snapshot file on process start.
//!
//! On startup:
//! 1. Write an empty document (`{}`) if the snapshot file is missing
//! 2. Read and decode the file
//! 3. Build the store, reconstructing each counter from its last id
//!
//! Every failure is returned to the caller. There is no valid
//! empty-but-running state to fall back to, so the server treats an error
//! here as fatal.

use std::path::Path;

use crate::error::Result;
use crate::snapshot::{self, file};
use crate::store::RecordStore;

/// Outcome of a bootstrap, for logging and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    /// The snapshot file did not exist and was created empty
    pub created: bool,

    /// Posts loaded
    pub posts: usize,

    /// Users loaded
    pub users: usize,

    /// Size of the snapshot file in bytes
    pub bytes: usize,
}

/// Ensure the snapshot file exists and load it into a new store
pub fn open(path: &Path) -> Result<(RecordStore, BootstrapReport)> {
    let created = file::ensure_exists(path)?;

    let bytes = file::read(path)?;
    let document = snapshot::decode(&bytes)?;

    let report = BootstrapReport {
        created,
        posts: document.posts.len(),
        users: document.users.len(),
        bytes: bytes.len(),
    };
    let store = RecordStore::from_document(document);

    let counters = store.counters();
    tracing::info!(
        "Loaded snapshot {}: {} posts, {} users ({} bytes), next ids post={} user={}",
        path.display(),
        report.posts,
        report.users,
        report.bytes,
        counters.posts + 1,
        counters.users + 1
    );

    Ok((store, report))
}

/// Load the store, discarding the report
pub fn load(path: &Path) -> Result<RecordStore> {
    open(path).map(|(store, _)| store)
}
