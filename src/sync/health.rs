//! Sync health tracking
//!
//! Counters the scheduler updates after every tick, readable from any thread.

use std::time::SystemTime;

use parking_lot::RwLock;

use super::SyncOutcome;

/// Point-in-time view of the scheduler's health
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    /// Ticks that ended with the snapshot on disk (or already on disk)
    pub successful_syncs: u64,

    /// Ticks abandoned after exhausting every retry
    pub failed_ticks: u64,

    /// Failed ticks since the last success
    pub consecutive_failures: u32,

    /// Message of the most recent failure, cleared on success
    pub last_error: Option<String>,

    /// Wall-clock time of the most recent success
    pub last_success: Option<SystemTime>,

    /// CRC32 of the last snapshot written
    pub last_checksum: Option<u32>,

    /// Size of the last snapshot written
    pub last_bytes: usize,
}

impl SyncStatus {
    /// True while the most recent tick succeeded
    pub fn is_healthy(&self) -> bool {
        self.consecutive_failures == 0
    }
}

/// Shared health record for one scheduler
#[derive(Debug, Default)]
pub struct SyncHealth {
    status: RwLock<SyncStatus>,
}

impl SyncHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current status
    pub fn status(&self) -> SyncStatus {
        self.status.read().clone()
    }

    pub fn is_healthy(&self) -> bool {
        self.status.read().is_healthy()
    }

    /// Checksum of the last snapshot that reached the file
    pub fn last_checksum(&self) -> Option<u32> {
        self.status.read().last_checksum
    }

    pub(crate) fn record_success(&self, outcome: &SyncOutcome) {
        let mut status = self.status.write();
        status.successful_syncs += 1;
        status.consecutive_failures = 0;
        status.last_error = None;
        status.last_success = Some(SystemTime::now());
        if let SyncOutcome::Written { bytes, checksum } = *outcome {
            status.last_checksum = Some(checksum);
            status.last_bytes = bytes;
        }
    }

    pub(crate) fn record_failure(&self, error: &str) {
        let mut status = self.status.write();
        status.failed_ticks += 1;
        status.consecutive_failures = status.consecutive_failures.saturating_add(1);
        status.last_error = Some(error.to_string());
    }
}
