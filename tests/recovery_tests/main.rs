//! Persistence and Recovery Tests
//!
//! Tests verify:
//! - Bootstrap of a missing, empty, populated or corrupt snapshot file
//! - Counter reconstruction after restart
//! - Scheduled syncs, retry isolation and health reporting
//! - Final sync on shutdown through the service context

mod sync_tests;
