//! Sync Scheduler
//!
//! Background thread that snapshots the store on a fixed interval.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::config::{Config, RetryPolicy};
use crate::error::{Result, StoreError};
use crate::snapshot::{self, file};
use crate::store::RecordStore;

use super::{SyncHealth, SyncOutcome, SyncStatus};

/// Writes store snapshots to the backing file
///
/// One `Syncer` is shared between the scheduler thread and callers that
/// want to force a sync.
pub struct Syncer {
    /// Store to snapshot
    store: Arc<RecordStore>,

    /// Backing file
    path: PathBuf,

    /// Retry policy for a failed write
    retry: RetryPolicy,

    /// Skip writes identical to the last one
    skip_unchanged: bool,

    /// Health record updated after every tick
    health: Arc<SyncHealth>,

    /// Held from snapshot to rename; the temp file path is shared
    write_lock: Mutex<()>,
}

impl Syncer {
    /// Create a syncer from config
    pub fn new(store: Arc<RecordStore>, config: &Config) -> Self {
        Self {
            store,
            path: config.snapshot_path.clone(),
            retry: config.sync_retry,
            skip_unchanged: config.skip_unchanged,
            health: Arc::new(SyncHealth::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Snapshot the store and write it, once, without retrying
    ///
    /// The store lock is released before the file is touched. Concurrent
    /// calls are serialized, so files land in snapshot order.
    pub fn sync_once(&self) -> Result<SyncOutcome> {
        let _guard = self.write_lock.lock();
        let bytes = self.store.snapshot_now()?;
        let checksum = snapshot::checksum(&bytes);

        if self.skip_unchanged && self.health.last_checksum() == Some(checksum) {
            return Ok(SyncOutcome::Unchanged { checksum });
        }

        file::write_atomic(&self.path, &bytes)?;
        Ok(SyncOutcome::Written {
            bytes: bytes.len(),
            checksum,
        })
    }

    /// Sync once and record the result in the health record
    pub fn sync_now(&self) -> Result<SyncOutcome> {
        match self.sync_once() {
            Ok(outcome) => {
                self.health.record_success(&outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.health.record_failure(&e.to_string());
                Err(e)
            }
        }
    }

    /// One scheduler tick: sync with bounded retry
    ///
    /// Backoff sleeps wake early when `shutdown` fires. Returns `false` if
    /// the scheduler should stop.
    fn tick(&self, shutdown: &Receiver<()>) -> bool {
        let mut attempt = 1;
        loop {
            match self.sync_once() {
                Ok(outcome) => {
                    tracing::debug!("Sync tick complete: {:?}", outcome);
                    self.health.record_success(&outcome);
                    return true;
                }
                Err(e) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(
                        "Sync attempt {}/{} failed: {}; retrying in {:?}",
                        attempt,
                        self.retry.max_attempts,
                        e,
                        delay
                    );
                    match shutdown.recv_timeout(delay) {
                        Err(RecvTimeoutError::Timeout) => attempt += 1,
                        _ => return false,
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "Sync tick abandoned after {} attempts: {}",
                        attempt,
                        e
                    );
                    self.health.record_failure(&e.to_string());
                    return true;
                }
            }
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn health(&self) -> &Arc<SyncHealth> {
        &self.health
    }
}

/// Handle to a running sync scheduler
///
/// Dropping the handle stops the thread without a final sync; call
/// [`shutdown`](Self::shutdown) to persist the last state.
pub struct SyncHandle {
    syncer: Arc<Syncer>,
    shutdown_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Start the scheduler thread
    ///
    /// The first tick fires one `interval` after start.
    pub fn spawn(syncer: Syncer, interval: Duration) -> Result<Self> {
        let syncer = Arc::new(syncer);
        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);

        let worker = Arc::clone(&syncer);
        let thread = thread::Builder::new()
            .name("chirpstore-sync".to_string())
            .spawn(move || run(worker, interval, shutdown_rx))
            .map_err(|e| StoreError::Sync(format!("failed to spawn sync thread: {}", e)))?;

        tracing::info!(
            "Sync scheduler started: {} every {:?}",
            syncer.path().display(),
            interval
        );

        Ok(Self {
            syncer,
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// Force a sync outside the schedule
    pub fn sync_now(&self) -> Result<SyncOutcome> {
        self.syncer.sync_now()
    }

    /// Current health of the scheduler
    pub fn status(&self) -> SyncStatus {
        self.syncer.health().status()
    }

    /// Stop the thread, then write one final snapshot
    pub fn shutdown(mut self) -> Result<SyncOutcome> {
        self.stop()?;
        let outcome = self.syncer.sync_now()?;
        tracing::info!("Final sync complete: {:?}", outcome);
        Ok(outcome)
    }

    fn stop(&mut self) -> Result<()> {
        // Dropping the sender disconnects the channel, which wakes the thread.
        drop(self.shutdown_tx.take());

        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| StoreError::Sync("sync thread panicked".to_string()))?;
            tracing::info!("Sync scheduler stopped");
        }
        Ok(())
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::error!("Failed to stop sync scheduler: {}", e);
        }
    }
}

fn run(syncer: Arc<Syncer>, interval: Duration, shutdown: Receiver<()>) {
    let ticker = channel::tick(interval);

    loop {
        channel::select! {
            recv(ticker) -> _ => {
                if !syncer.tick(&shutdown) {
                    break;
                }
            }
            recv(shutdown) -> _ => break,
        }
    }
}
