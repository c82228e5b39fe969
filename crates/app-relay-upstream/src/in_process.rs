// crates/app-relay-upstream/src/in_process.rs
// ============================================================================
// Module: In-Process Upstream
// Description: Transport for bundled Apps dispatched by direct call.
// Purpose: Route Call paths to registered handler functions.
// Dependencies: app-relay-core
// ============================================================================

//! ## Overview
//! Bundled, first-party extensions run inside the host process. Their
//! handlers are registered under a handler-set identifier and a Call path;
//! dispatch is a direct function call with no serialization boundary.
//! Tests also use this upstream to exercise the proxy without a network.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::RwLock;

use app_relay_core::App;
use app_relay_core::CallRequest;
use app_relay_core::CallResponse;
use app_relay_core::Notification;
use app_relay_core::Upstream;
use app_relay_core::UpstreamError;

// ============================================================================
// SECTION: Handler Types
// ============================================================================

/// Call handler registered for one path of a handler set.
pub type CallHandler = Arc<dyn Fn(&CallRequest) -> CallResponse + Send + Sync>;

/// Notification handler registered for one handler set.
pub type NotifyHandler = Arc<dyn Fn(&Notification) + Send + Sync>;

// ============================================================================
// SECTION: In-Process Upstream
// ============================================================================

/// Transport for Apps bundled into the host process.
///
/// # Invariants
/// - Call dispatch is by exact path within the App's handler set.
/// - Handlers are registered before any dispatch reaches them.
#[derive(Default)]
pub struct InProcessUpstream {
    /// Call handlers keyed by handler set identifier, then exact path.
    handlers: RwLock<BTreeMap<String, BTreeMap<String, CallHandler>>>,
    /// Notification handlers keyed by handler set identifier.
    notify_handlers: RwLock<BTreeMap<String, NotifyHandler>>,
}

impl InProcessUpstream {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a Call handler under a handler set and path.
    ///
    /// A later registration for the same path replaces the earlier one.
    pub fn register(
        &self,
        handler_id: impl Into<String>,
        path: impl Into<String>,
        handler: CallHandler,
    ) {
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.entry(handler_id.into()).or_default().insert(path.into(), handler);
        }
    }

    /// Registers the Notification handler of a handler set.
    pub fn register_notify(&self, handler_id: impl Into<String>, handler: NotifyHandler) {
        if let Ok(mut handlers) = self.notify_handlers.write() {
            handlers.insert(handler_id.into(), handler);
        }
    }

    /// Resolves the handler set identifier from the App's manifest.
    fn handler_id(app: &App) -> Result<String, UpstreamError> {
        app.manifest.deploy.in_process.as_ref().map(|d| d.handler_id.clone()).ok_or_else(|| {
            UpstreamError::Config(format!("app {} has no in_process deploy section", app.app_id()))
        })
    }
}

impl Upstream for InProcessUpstream {
    fn invoke_call(&self, app: &App, request: &CallRequest) -> Result<CallResponse, UpstreamError> {
        let handler_id = Self::handler_id(app)?;
        let handler = self
            .handlers
            .read()
            .ok()
            .and_then(|handlers| handlers.get(&handler_id)?.get(&request.call.path).cloned())
            .ok_or_else(|| UpstreamError::NotFound(request.call.path.clone()))?;
        Ok(handler(request))
    }

    fn notify(&self, app: &App, notification: &Notification) -> Result<(), UpstreamError> {
        let handler_id = Self::handler_id(app)?;
        let handler = self
            .notify_handlers
            .read()
            .ok()
            .and_then(|handlers| handlers.get(&handler_id).cloned())
            .ok_or_else(|| {
                UpstreamError::NotFound(format!("no notification handler for {handler_id}"))
            })?;
        handler(notification);
        Ok(())
    }
}
