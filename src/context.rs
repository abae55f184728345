//! Service Context
//!
//! The explicit object a service passes to its handlers: configuration,
//! the shared store and the running sync scheduler. Nothing lives in
//! process globals, so tests can build as many independent contexts as
//! they like.

use std::sync::Arc;

use crate::bootstrap::{self, BootstrapReport};
use crate::config::{Config, Secrets};
use crate::error::Result;
use crate::store::RecordStore;
use crate::sync::{SyncHandle, SyncOutcome, SyncStatus, Syncer};

/// Running service state
pub struct AppContext {
    config: Config,
    store: Arc<RecordStore>,
    sync: SyncHandle,
    report: BootstrapReport,
}

impl AppContext {
    /// Bootstrap the store from the snapshot file and start the scheduler
    ///
    /// Any error here is a startup failure; there is no partially started
    /// context.
    pub fn start(config: Config) -> Result<Self> {
        config.validate()?;

        let (store, report) = bootstrap::open(&config.snapshot_path)?;
        let store = Arc::new(store);

        let syncer = Syncer::new(Arc::clone(&store), &config);
        let sync = SyncHandle::spawn(syncer, config.sync_interval)?;

        Ok(Self {
            config,
            store,
            sync,
            report,
        })
    }

    /// The shared record store
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Secrets for the auth and webhook collaborators
    pub fn secrets(&self) -> &Secrets {
        &self.config.secrets
    }

    /// What bootstrap found on disk
    pub fn bootstrap_report(&self) -> BootstrapReport {
        self.report
    }

    /// Health of the sync scheduler
    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status()
    }

    /// Persist the store immediately
    pub fn sync_now(&self) -> Result<SyncOutcome> {
        self.sync.sync_now()
    }

    /// Stop the scheduler and write a final snapshot
    pub fn shutdown(self) -> Result<SyncOutcome> {
        self.sync.shutdown()
    }
}
