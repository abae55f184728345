//! Tests for the Sync Scheduler

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chirpstore::config::{Config, RetryPolicy};
use chirpstore::snapshot;
use chirpstore::sync::{SyncHandle, SyncOutcome, Syncer};
use chirpstore::{bootstrap, Post, RecordStore};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.json");
    (temp_dir, path)
}

fn test_config(path: &Path) -> Config {
    Config::builder()
        .snapshot_path(path)
        .sync_interval(Duration::from_millis(25))
        .sync_retry(RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(20),
        })
        .build()
}

/// Poll `condition` until it holds or the timeout expires
fn wait_until<F: FnMut() -> bool>(timeout: Duration, mut condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

fn posts_on_disk(path: &Path) -> usize {
    fs::read(path)
        .ok()
        .and_then(|bytes| snapshot::decode(&bytes).ok())
        .map(|doc| doc.posts.len())
        .unwrap_or(0)
}

// =============================================================================
// Syncer Tests
// =============================================================================

#[test]
fn test_sync_once_writes_snapshot() {
    let (_temp, path) = setup_temp_path();
    let store = Arc::new(RecordStore::new());
    store.insert_post(Post::new("hello", 1)).unwrap();
    let syncer = Syncer::new(Arc::clone(&store), &test_config(&path));

    let outcome = syncer.sync_once().unwrap();

    let on_disk = fs::read(&path).unwrap();
    assert_eq!(
        outcome,
        SyncOutcome::Written {
            bytes: on_disk.len(),
            checksum: snapshot::checksum(&on_disk),
        }
    );
    assert_eq!(posts_on_disk(&path), 1);
    assert!(!snapshot::file::temp_path(&path).exists());
}

#[test]
fn test_skip_unchanged_snapshots() {
    let (_temp, path) = setup_temp_path();
    let store = Arc::new(RecordStore::new());
    let config = Config {
        skip_unchanged: true,
        ..test_config(&path)
    };
    let syncer = Syncer::new(Arc::clone(&store), &config);

    assert!(matches!(syncer.sync_now().unwrap(), SyncOutcome::Written { .. }));
    assert!(matches!(syncer.sync_now().unwrap(), SyncOutcome::Unchanged { .. }));

    store.insert_post(Post::new("new", 1)).unwrap();
    assert!(matches!(syncer.sync_now().unwrap(), SyncOutcome::Written { .. }));
    assert_eq!(syncer.health().status().successful_syncs, 3);
}

#[test]
fn test_sync_now_records_failure() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("data.json");
    let syncer = Syncer::new(Arc::new(RecordStore::new()), &test_config(&path));

    assert!(syncer.sync_now().is_err());

    let status = syncer.health().status();
    assert!(!status.is_healthy());
    assert!(status.last_error.is_some());
}

#[test]
fn test_concurrent_syncs_never_tear_the_file() {
    let (_temp, path) = setup_temp_path();
    let store = Arc::new(RecordStore::new());
    for i in 0..500 {
        store.insert_post(Post::new(format!("post {}", i), 1)).unwrap();
    }
    let syncer = Arc::new(Syncer::new(Arc::clone(&store), &test_config(&path)));
    syncer.sync_now().unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let path = path.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut torn: usize = 0;
            while !done.load(Ordering::SeqCst) {
                match fs::read(&path) {
                    Ok(bytes) => {
                        if snapshot::decode(&bytes).is_err() {
                            torn += 1;
                        }
                    }
                    Err(e) => assert_eq!(e.kind(), ErrorKind::NotFound),
                }
            }
            torn
        })
    };

    let mut handles = vec![];
    for t in 0..4 {
        let store = Arc::clone(&store);
        let syncer = Arc::clone(&syncer);
        handles.push(thread::spawn(move || {
            let mut failures: usize = 0;
            for i in 0..50 {
                if t == 0 && i % 2 == 0 {
                    store.delete_post(1);
                }
                if syncer.sync_now().is_err() {
                    failures += 1;
                }
            }
            failures
        }));
    }

    let failures: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    done.store(true, Ordering::SeqCst);
    let torn: usize = reader.join().unwrap();

    assert_eq!(failures, 0);
    assert_eq!(torn, 0);
    assert_eq!(syncer.health().status().consecutive_failures, 0);
    assert_eq!(posts_on_disk(&path), 475);
    assert!(!snapshot::file::temp_path(&path).exists());
}

// =============================================================================
// Scheduler Tests
// =============================================================================

#[test]
fn test_scheduler_persists_on_tick() {
    let (_temp, path) = setup_temp_path();
    let store = Arc::new(bootstrap::load(&path).unwrap());
    let config = test_config(&path);
    let handle = SyncHandle::spawn(Syncer::new(Arc::clone(&store), &config), config.sync_interval)
        .unwrap();

    store.insert_post(Post::new("one", 1)).unwrap();
    store.insert_post(Post::new("two", 1)).unwrap();

    assert!(wait_until(Duration::from_secs(5), || posts_on_disk(&path) == 2));
    assert!(handle.status().successful_syncs >= 1);
    assert!(handle.status().is_healthy());

    handle.shutdown().unwrap();
}

#[test]
fn test_failed_tick_does_not_stop_scheduler() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("later");
    let path = dir.join("data.json");
    let store = Arc::new(RecordStore::new());
    store.insert_post(Post::new("pending", 1)).unwrap();
    let config = test_config(&path);
    let handle = SyncHandle::spawn(Syncer::new(Arc::clone(&store), &config), config.sync_interval)
        .unwrap();

    assert!(wait_until(Duration::from_secs(5), || handle.status().failed_ticks >= 2));
    assert!(!handle.status().is_healthy());

    fs::create_dir_all(&dir).unwrap();

    assert!(wait_until(Duration::from_secs(5), || handle.status().is_healthy()));
    assert_eq!(posts_on_disk(&path), 1);
    assert_eq!(handle.status().last_error, None);

    handle.shutdown().unwrap();
}

#[test]
fn test_shutdown_performs_final_sync() {
    let (_temp, path) = setup_temp_path();
    let store = Arc::new(bootstrap::load(&path).unwrap());
    let config = test_config(&path);
    let handle =
        SyncHandle::spawn(Syncer::new(Arc::clone(&store), &config), Duration::from_secs(3600))
            .unwrap();

    store.insert_post(Post::new("last words", 1)).unwrap();
    let outcome = handle.shutdown().unwrap();

    assert!(matches!(outcome, SyncOutcome::Written { .. }));
    assert_eq!(posts_on_disk(&path), 1);
}

#[test]
fn test_shutdown_interrupts_backoff() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("data.json");
    let config = Config::builder()
        .snapshot_path(&path)
        .sync_retry(RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(30),
            max_backoff: Duration::from_secs(30),
        })
        .build();
    let handle = SyncHandle::spawn(
        Syncer::new(Arc::new(RecordStore::new()), &config),
        Duration::from_millis(10),
    )
    .unwrap();
    thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    let result = handle.shutdown();

    assert!(started.elapsed() < Duration::from_secs(10));
    // The final sync still cannot reach the missing directory.
    assert!(result.is_err());
}

#[test]
fn test_drop_stops_scheduler() {
    let (_temp, path) = setup_temp_path();
    let config = test_config(&path);
    let handle = SyncHandle::spawn(
        Syncer::new(Arc::new(RecordStore::new()), &config),
        Duration::from_secs(3600),
    )
    .unwrap();

    let started = Instant::now();
    drop(handle);

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!path.exists());
}
