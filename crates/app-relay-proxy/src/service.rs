// crates/app-relay-proxy/src/service.rs
// ============================================================================
// Module: Proxy Service
// Description: Composite wiring of stores, host boundaries, and transports.
// Purpose: Hold the shared state behind every proxy operation.
// Dependencies: app-relay-core, app-relay-upstream
// ============================================================================

//! ## Overview
//! [`ProxyService`] owns the seams every proxy operation needs: the App
//! and Subscription stores, the host data source and token issuer, the
//! upstream resolver, the process-wide site configuration, and the
//! observer for locally recovered failures. The operations themselves
//! live next to their subsystems: dispatch in [`crate::call`], binding
//! aggregation in [`crate::bindings`], and event fan-out in
//! [`crate::notify`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use app_relay_core::App;
use app_relay_core::AppId;
use app_relay_core::AppStore;
use app_relay_core::HostDataSource;
use app_relay_core::RelayError;
use app_relay_core::SubscriptionStore;
use app_relay_core::TokenIssuer;
use app_relay_upstream::UpstreamResolver;

use crate::observer::NoopObserver;
use crate::observer::ProxyObserver;
use crate::store::MemorySubscriptionStore;

// ============================================================================
// SECTION: Site Configuration
// ============================================================================

/// Process-wide host configuration disclosed through expanded Contexts.
///
/// # Invariants
/// - Snapshot is shared across all requests; it is not App or user scoped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteConfig {
    /// Host site URL for REST access.
    pub site_url: String,
    /// Path prefix under which the proxy serves App routes.
    pub app_path_prefix: String,
    /// True when the host runs in developer mode.
    pub developer_mode: bool,
}

impl SiteConfig {
    /// Returns the proxy path for an App, appendable to the site URL.
    #[must_use]
    pub fn app_path(&self, app_id: &AppId) -> String {
        format!("{}/{app_id}", self.app_path_prefix.trim_end_matches('/'))
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for a [`ProxyService`].
///
/// # Invariants
/// - `build` succeeds only when the App store, host data source, token
///   issuer, and upstream resolver are all configured.
#[derive(Default)]
pub struct ProxyServiceBuilder {
    /// Installed App records.
    apps: Option<Arc<dyn AppStore>>,
    /// Durable subscription records.
    subscriptions: Option<Arc<dyn SubscriptionStore>>,
    /// Host entity boundary.
    host: Option<Arc<dyn HostDataSource>>,
    /// Privileged token boundary.
    tokens: Option<Arc<dyn TokenIssuer>>,
    /// Per-App transport selection.
    resolver: Option<Arc<UpstreamResolver>>,
    /// Process-wide site configuration.
    site: SiteConfig,
    /// Observer for locally recovered failures.
    observer: Option<Arc<dyn ProxyObserver>>,
}

impl ProxyServiceBuilder {
    /// Registers the App store.
    #[must_use]
    pub fn apps(mut self, apps: Arc<dyn AppStore>) -> Self {
        self.apps = Some(apps);
        self
    }

    /// Registers the subscription store.
    #[must_use]
    pub fn subscriptions(mut self, subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        self.subscriptions = Some(subscriptions);
        self
    }

    /// Registers the host data source.
    #[must_use]
    pub fn host(mut self, host: Arc<dyn HostDataSource>) -> Self {
        self.host = Some(host);
        self
    }

    /// Registers the token issuer.
    #[must_use]
    pub fn tokens(mut self, tokens: Arc<dyn TokenIssuer>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Registers the upstream resolver.
    #[must_use]
    pub fn resolver(mut self, resolver: UpstreamResolver) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets the site configuration.
    #[must_use]
    pub fn site(mut self, site: SiteConfig) -> Self {
        self.site = site;
        self
    }

    /// Registers the observer.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn ProxyObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builds the proxy service.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when a required seam is missing.
    pub fn build(self) -> Result<ProxyService, RelayError> {
        /// Names a missing required seam.
        fn missing(name: &str) -> RelayError {
            RelayError::Invalid(format!("proxy service requires {name}"))
        }
        Ok(ProxyService {
            apps: self.apps.ok_or_else(|| missing("an app store"))?,
            subscriptions: self
                .subscriptions
                .unwrap_or_else(|| Arc::new(MemorySubscriptionStore::new())),
            host: self.host.ok_or_else(|| missing("a host data source"))?,
            tokens: self.tokens.ok_or_else(|| missing("a token issuer"))?,
            resolver: self.resolver.ok_or_else(|| missing("an upstream resolver"))?,
            site: self.site,
            observer: self.observer.unwrap_or_else(|| Arc::new(NoopObserver)),
        })
    }
}

// ============================================================================
// SECTION: Proxy Service
// ============================================================================

/// Shared state behind every proxy operation.
pub struct ProxyService {
    /// Installed App records.
    pub(crate) apps: Arc<dyn AppStore>,
    /// Durable subscription records.
    pub(crate) subscriptions: Arc<dyn SubscriptionStore>,
    /// Host entity boundary.
    pub(crate) host: Arc<dyn HostDataSource>,
    /// Privileged token boundary.
    pub(crate) tokens: Arc<dyn TokenIssuer>,
    /// Per-App transport selection.
    pub(crate) resolver: Arc<UpstreamResolver>,
    /// Process-wide site configuration.
    pub(crate) site: SiteConfig,
    /// Observer for locally recovered failures.
    pub(crate) observer: Arc<dyn ProxyObserver>,
}

impl ProxyService {
    /// Returns a builder for the proxy service.
    #[must_use]
    pub fn builder() -> ProxyServiceBuilder {
        ProxyServiceBuilder::default()
    }

    /// Fetches an enabled App by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NotFound`] when no App is installed under the
    /// identifier and [`RelayError::Invalid`] when the App is disabled.
    pub(crate) fn enabled_app(&self, app_id: &AppId) -> Result<App, RelayError> {
        let app =
            self.apps.get(app_id).map_err(|err| RelayError::NotFound(format!("app: {err}")))?;
        if !app.is_enabled() {
            return Err(RelayError::Invalid(format!("{app_id} is disabled")));
        }
        Ok(app)
    }
}
