// crates/app-relay-proxy/src/store.rs
// ============================================================================
// Module: In-Memory Stores
// Description: Map-backed App and Subscription store implementations.
// Purpose: Back the store seams for tests and single-instance hosts.
// Dependencies: app-relay-core
// ============================================================================

//! ## Overview
//! Persistent storage mechanics are outside the proxy; the store traits
//! are the boundary. These map-backed implementations satisfy them with
//! deterministic iteration order and wholesale record updates, which is
//! all the proxy's read-mostly access pattern needs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::RwLock;

use app_relay_core::App;
use app_relay_core::AppId;
use app_relay_core::AppStore;
use app_relay_core::RelayError;
use app_relay_core::ScopeKey;
use app_relay_core::StoreError;
use app_relay_core::Subscription;
use app_relay_core::SubscriptionStore;

// ============================================================================
// SECTION: App Store
// ============================================================================

/// Map-backed App store.
///
/// # Invariants
/// - `list` iterates in ascending App identifier order.
/// - Records are validated before insertion and replaced wholesale.
#[derive(Default)]
pub struct MemoryAppStore {
    /// Installed Apps keyed by identifier.
    apps: RwLock<BTreeMap<AppId, App>>,
}

impl MemoryAppStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs or replaces an App record.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when the record fails validation.
    pub fn put(&self, app: App) -> Result<(), RelayError> {
        app.validate()?;
        if let Ok(mut apps) = self.apps.write() {
            apps.insert(app.app_id().clone(), app);
        }
        Ok(())
    }

    /// Removes an App record.
    pub fn remove(&self, app_id: &AppId) {
        if let Ok(mut apps) = self.apps.write() {
            apps.remove(app_id);
        }
    }
}

impl AppStore for MemoryAppStore {
    fn get(&self, app_id: &AppId) -> Result<App, StoreError> {
        self.apps
            .read()
            .ok()
            .and_then(|apps| apps.get(app_id).cloned())
            .ok_or_else(|| StoreError::NotFound(app_id.to_string()))
    }

    fn list(&self) -> Vec<App> {
        self.apps.read().map(|apps| apps.values().cloned().collect()).unwrap_or_default()
    }
}

// ============================================================================
// SECTION: Subscription Store
// ============================================================================

/// Map-backed subscription store keyed by subject and scope.
///
/// # Invariants
/// - At most one entry per App per scope key; saving replaces it.
#[derive(Default)]
pub struct MemorySubscriptionStore {
    /// Subscriptions grouped by scope key.
    subscriptions: RwLock<BTreeMap<ScopeKey, Vec<Subscription>>>,
}

impl MemorySubscriptionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubscriptionStore for MemorySubscriptionStore {
    fn save(&self, subscription: Subscription) -> Result<(), StoreError> {
        let key = subscription
            .scope_key()
            .map_err(|err| StoreError::Failed(format!("subscription key: {err}")))?;
        let mut subscriptions =
            self.subscriptions.write().map_err(|_| StoreError::Failed("lock poisoned".to_string()))?;
        let entries = subscriptions.entry(key).or_default();
        entries.retain(|existing| existing.app_id != subscription.app_id);
        entries.push(subscription);
        Ok(())
    }

    fn delete(&self, app_id: &AppId, key: &ScopeKey) -> Result<(), StoreError> {
        let mut subscriptions =
            self.subscriptions.write().map_err(|_| StoreError::Failed("lock poisoned".to_string()))?;
        let Some(entries) = subscriptions.get_mut(key) else {
            return Err(StoreError::NotFound(format!("{} subscription", key.subject)));
        };
        let before = entries.len();
        entries.retain(|existing| &existing.app_id != app_id);
        if entries.len() == before {
            return Err(StoreError::NotFound(format!("{} subscription for {app_id}", key.subject)));
        }
        if entries.is_empty() {
            subscriptions.remove(key);
        }
        Ok(())
    }

    fn list(&self, key: &ScopeKey) -> Vec<Subscription> {
        self.subscriptions
            .read()
            .ok()
            .and_then(|subscriptions| subscriptions.get(key).cloned())
            .unwrap_or_default()
    }
}
