// crates/app-relay-proxy/tests/lease_lock.rs
// ============================================================================
// Module: Lease Lock Tests
// Description: TTL acquisition, release, and cross-thread exclusion tests.
// Purpose: Pin the run-once and mutual-exclusion contracts of the lease.
// ============================================================================

//! ## Overview
//! Covers the lease lock over the in-memory flag store: a held lease
//! refuses a second acquisition, expiry makes it reclaimable, `with_lock`
//! releases on completion, and `run_once` runs its closure exactly once
//! across competing threads.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use app_relay_core::KvFlagStore;
use app_relay_proxy::LeaseLock;
use app_relay_proxy::MemoryFlagStore;

// ============================================================================
// SECTION: Acquisition
// ============================================================================

#[test]
fn second_acquisition_within_ttl_is_refused() {
    let store: Arc<dyn KvFlagStore> = Arc::new(MemoryFlagStore::new());
    let lock = LeaseLock::new(Arc::clone(&store), "migrate", Duration::from_secs(60));

    assert_eq!(lock.run_once(|| "ran").unwrap(), Some("ran"));
    assert_eq!(lock.run_once(|| "ran again").unwrap(), None);
}

#[test]
fn expired_lease_is_reclaimable() {
    let store: Arc<dyn KvFlagStore> = Arc::new(MemoryFlagStore::new());
    let lock = LeaseLock::new(Arc::clone(&store), "migrate", Duration::from_millis(20));

    assert_eq!(lock.run_once(|| 1).unwrap(), Some(1));
    thread::sleep(Duration::from_millis(40));
    assert_eq!(lock.run_once(|| 2).unwrap(), Some(2));
}

#[test]
fn with_lock_releases_after_running() {
    let store: Arc<dyn KvFlagStore> = Arc::new(MemoryFlagStore::new());
    let lock = LeaseLock::new(Arc::clone(&store), "serialize", Duration::from_secs(60));

    assert_eq!(lock.with_lock(|| 1).unwrap(), Some(1));
    assert_eq!(lock.with_lock(|| 2).unwrap(), Some(2), "release makes the lease reusable");
}

#[test]
fn independent_names_do_not_contend() {
    let store: Arc<dyn KvFlagStore> = Arc::new(MemoryFlagStore::new());
    let first = LeaseLock::new(Arc::clone(&store), "job-a", Duration::from_secs(60));
    let second = LeaseLock::new(Arc::clone(&store), "job-b", Duration::from_secs(60));

    assert!(first.run_once(|| ()).unwrap().is_some());
    assert!(second.run_once(|| ()).unwrap().is_some());
}

// ============================================================================
// SECTION: Cross-Thread Exclusion
// ============================================================================

#[test]
fn run_once_runs_exactly_once_across_competing_threads() {
    let store: Arc<dyn KvFlagStore> = Arc::new(MemoryFlagStore::new());
    let runs = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let lock = LeaseLock::new(Arc::clone(&store), "startup", Duration::from_secs(60));
            let runs = Arc::clone(&runs);
            thread::spawn(move || {
                lock.run_once(|| {
                    runs.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(runs.load(Ordering::SeqCst), 1);
}
