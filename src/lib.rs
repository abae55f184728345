//! # chirpstore
//!
//! The record store behind a small social-post service:
//! - Posts and users with store-assigned sequential ids
//! - Delete with compaction (ids stay contiguous)
//! - Periodic whole-state JSON snapshots, written atomically
//! - Crash recovery from the last snapshot on startup
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │               Request handlers (external)                    │
//! │        insert / upsert / get / list / delete                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   RecordStore                                │
//! │        posts table + users table, one Mutex                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ snapshot_now (under lock)
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Sync thread │────────► │  Snapshot   │
//!   │  (ticker)   │  bytes   │ codec+file  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  data.json  │ ◄── bootstrap on start
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod store;
pub mod snapshot;
pub mod bootstrap;
pub mod sync;
pub mod context;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::Config;
pub use model::{CollectionKind, Post, Record, User};
pub use store::RecordStore;
pub use context::AppContext;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of chirpstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
