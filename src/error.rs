//! Error types for chirpstore
//!
//! Provides a unified error type for all store, snapshot and sync operations.

use thiserror::Error;

use crate::model::CollectionKind;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for chirpstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("{collection} record {id} not found")]
    NotFound { collection: CollectionKind, id: u64 },

    #[error("{collection} id {id} out of range (collection holds {len} records)")]
    OutOfRange {
        collection: CollectionKind,
        id: u64,
        len: usize,
    },

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot decode error: {0}")]
    Decode(String),

    #[error("Snapshot encode error: {0}")]
    Encode(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Scheduler Errors
    // -------------------------------------------------------------------------
    #[error("Sync scheduler error: {0}")]
    Sync(String),
}

impl StoreError {
    /// True for the negative lookup result callers are expected to handle
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
