// crates/app-relay-proxy/src/lock.rs
// ============================================================================
// Module: Lease Lock
// Description: TTL-lease mutual exclusion over a shared flag store.
// Purpose: Serialize one-time startup work across running instances.
// Dependencies: app-relay-core
// ============================================================================

//! ## Overview
//! Startup migration work must run on exactly one instance of the host at
//! a time. [`LeaseLock`] provides that as a single abstraction over the
//! [`KvFlagStore`] seam: acquire a named lease with a TTL, execute,
//! release. The TTL bounds how long a crashed holder can block peers.
//! `run_once` additionally leaves the lease in place after a successful
//! run, so peers racing within the TTL skip the work entirely.
//!
//! The store's `set_if_absent` must be atomic across instances; exactness
//! of the exclusion is the store's contract, not a sleep-and-check
//! approximation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use app_relay_core::KvFlagStore;
use app_relay_core::RelayError;
use app_relay_core::StoreError;

// ============================================================================
// SECTION: Lease Lock
// ============================================================================

/// Named TTL lease over a shared flag store.
///
/// # Invariants
/// - At most one holder per name within a TTL window.
#[derive(Clone)]
pub struct LeaseLock {
    /// Shared flag store providing atomic set-if-absent.
    store: Arc<dyn KvFlagStore>,
    /// Lease name.
    name: String,
    /// Lease lifetime.
    ttl: Duration,
}

impl LeaseLock {
    /// Creates a lease lock with the given name and TTL.
    #[must_use]
    pub fn new(store: Arc<dyn KvFlagStore>, name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            name: name.into(),
            ttl,
        }
    }

    /// Runs `f` under the lease, releasing it afterwards.
    ///
    /// Returns `None` without running `f` when another holder owns the
    /// lease.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when the flag store fails.
    pub fn with_lock<T>(&self, f: impl FnOnce() -> T) -> Result<Option<T>, RelayError> {
        if !self.acquire()? {
            return Ok(None);
        }
        let result = f();
        self.store
            .clear(&self.name)
            .map_err(|err| RelayError::Invalid(format!("lease release: {err}")))?;
        Ok(Some(result))
    }

    /// Runs `f` at most once per TTL window across instances.
    ///
    /// The winner runs `f` and leaves the lease in place, so peers that
    /// lose the race skip the work instead of waiting for it. Returns
    /// `None` when this instance lost.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when the flag store fails.
    pub fn run_once<T>(&self, f: impl FnOnce() -> T) -> Result<Option<T>, RelayError> {
        if !self.acquire()? {
            return Ok(None);
        }
        Ok(Some(f()))
    }

    /// Attempts to acquire the lease.
    fn acquire(&self) -> Result<bool, RelayError> {
        self.store
            .set_if_absent(&self.name, self.ttl)
            .map_err(|err| RelayError::Invalid(format!("lease acquire: {err}")))
    }
}

// ============================================================================
// SECTION: In-Memory Flag Store
// ============================================================================

/// Process-local flag store with expiry.
///
/// Backs the lease lock for tests and single-instance deployments; a
/// multi-instance host supplies a shared store behind the same trait.
#[derive(Default)]
pub struct MemoryFlagStore {
    /// Flag deadlines keyed by name.
    flags: std::sync::Mutex<std::collections::BTreeMap<String, Instant>>,
}

impl MemoryFlagStore {
    /// Creates an empty flag store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvFlagStore for MemoryFlagStore {
    fn set_if_absent(&self, name: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut flags =
            self.flags.lock().map_err(|_| StoreError::Failed("lock poisoned".to_string()))?;
        let now = Instant::now();
        if let Some(deadline) = flags.get(name)
            && *deadline > now
        {
            return Ok(false);
        }
        let deadline = now.checked_add(ttl).unwrap_or_else(|| {
            // Saturate far enough out to behave as "no expiry".
            now + Duration::from_secs(60 * 60 * 24 * 365)
        });
        flags.insert(name.to_string(), deadline);
        Ok(true)
    }

    fn clear(&self, name: &str) -> Result<(), StoreError> {
        let mut flags =
            self.flags.lock().map_err(|_| StoreError::Failed("lock poisoned".to_string()))?;
        flags.remove(name);
        Ok(())
    }
}
