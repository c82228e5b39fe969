// crates/app-relay-core/src/interfaces/mod.rs
// ============================================================================
// Module: App Relay Interfaces
// Description: Backend-agnostic contracts for transports, host data, and stores.
// Purpose: Define the seams the upstream and proxy crates implement.
// Dependencies: serde_json, thiserror, crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how App Relay integrates with external systems
//! without embedding backend specifics: the per-App [`Upstream`] transport,
//! the host platform's entity and token services, and the record stores.
//! Implementations must fail closed on missing or invalid data; the proxy
//! decides per call site whether a failure aborts the operation or is
//! recovered locally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

use crate::core::app::App;
use crate::core::binding::Binding;
use crate::core::call::CallRequest;
use crate::core::call::CallResponse;
use crate::core::call::CallResponseType;
use crate::core::entities::Channel;
use crate::core::entities::Post;
use crate::core::entities::Team;
use crate::core::entities::User;
use crate::core::identifiers::AppId;
use crate::core::identifiers::ChannelId;
use crate::core::identifiers::PostId;
use crate::core::identifiers::TeamId;
use crate::core::identifiers::UserId;
use crate::core::subscription::Notification;
use crate::core::subscription::ScopeKey;
use crate::core::subscription::Subscription;

// ============================================================================
// SECTION: Upstream
// ============================================================================

/// Errors returned by upstream transports.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The Call path resolved to nothing on the App side.
    #[error("upstream path not found: {0}")]
    NotFound(String),
    /// The App's deploy configuration cannot support this upstream.
    #[error("upstream configuration error: {0}")]
    Config(String),
    /// The transport failed before a response was produced.
    #[error("upstream transport failure: {0}")]
    Transport(String),
    /// The response body could not be decoded.
    #[error("upstream decode failure: {0}")]
    Decode(String),
    /// The App reported a failure through the transport's error channel.
    #[error("app error: {0}")]
    App(String),
}

/// Per-App transport capable of Calls, Notifications, and binding fetches.
///
/// Implementations are interchangeable at the call site; selection happens
/// once per App from its manifest's populated deploy section.
pub trait Upstream: Send + Sync {
    /// Invokes a Call and returns the App's response.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the transport fails or the response
    /// cannot be decoded. Callers at the Call boundary convert these into
    /// `error`-type responses.
    fn invoke_call(&self, app: &App, request: &CallRequest) -> Result<CallResponse, UpstreamError>;

    /// Delivers a one-way Notification.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when delivery fails. The fan-out layer
    /// observes and drops these; there is no retry.
    fn notify(&self, app: &App, notification: &Notification) -> Result<(), UpstreamError>;

    /// Fetches the App's binding tree by invoking its bindings Call.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the invocation fails, the App
    /// responds with an error, or `data` does not decode as a binding
    /// tree.
    fn fetch_bindings(
        &self,
        app: &App,
        request: &CallRequest,
    ) -> Result<Vec<Binding>, UpstreamError> {
        let response = self.invoke_call(app, request)?;
        match response.response_type {
            CallResponseType::Ok => {
                let data = response.data.unwrap_or(serde_json::Value::Null);
                serde_json::from_value(data)
                    .map_err(|err| UpstreamError::Decode(format!("bindings: {err}")))
            }
            CallResponseType::Error => Err(UpstreamError::App(response.error_text)),
            other => Err(UpstreamError::Decode(format!(
                "bindings call returned unexpected response type {other}"
            ))),
        }
    }
}

// ============================================================================
// SECTION: Host Data Source
// ============================================================================

/// Errors returned by the host data source.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HostFetchError {
    /// The requested entity does not exist.
    #[error("host entity not found: {0}")]
    NotFound(String),
    /// The host could not serve the request.
    #[error("host fetch failed: {0}")]
    Unavailable(String),
}

/// Read access to host platform entities, at the proxy's boundary.
///
/// The host's own data model and REST surface are out of scope; this trait
/// is the projection the expander consumes.
pub trait HostDataSource: Send + Sync {
    /// Fetches a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HostFetchError`] when the user cannot be fetched.
    fn get_user(&self, id: &UserId) -> Result<User, HostFetchError>;

    /// Fetches a channel by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HostFetchError`] when the channel cannot be fetched.
    fn get_channel(&self, id: &ChannelId) -> Result<Channel, HostFetchError>;

    /// Fetches a team by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HostFetchError`] when the team cannot be fetched.
    fn get_team(&self, id: &TeamId) -> Result<Team, HostFetchError>;

    /// Fetches a post by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HostFetchError`] when the post cannot be fetched.
    fn get_post(&self, id: &PostId) -> Result<Post, HostFetchError>;
}

// ============================================================================
// SECTION: Token Issuer
// ============================================================================

/// Errors returned by the token issuer.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No token could be issued for the principal.
    #[error("token issue failed: {0}")]
    Unavailable(String),
}

/// Issues the privileged tokens disclosed through expanded Contexts.
///
/// Session management is the host's concern; the expander only asks for
/// tokens the App's granted permissions already allow.
pub trait TokenIssuer: Send + Sync {
    /// Issues the App's bot access token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when no bot session can be issued.
    fn bot_token(&self, app: &App) -> Result<String, TokenError>;

    /// Issues an access token acting as the given user.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when no user session can be issued.
    fn acting_user_token(&self, app: &App, user_id: &UserId) -> Result<String, TokenError>;

    /// Issues an administrative access token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when no admin session can be issued.
    fn admin_token(&self, app: &App) -> Result<String, TokenError>;
}

// ============================================================================
// SECTION: Stores
// ============================================================================

/// Errors returned by record stores.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),
    /// The store could not serve the request.
    #[error("store failure: {0}")]
    Failed(String),
}

/// Read access to installed App records.
pub trait AppStore: Send + Sync {
    /// Fetches the App installed under the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no App is installed under the
    /// identifier.
    fn get(&self, app_id: &AppId) -> Result<App, StoreError>;

    /// Lists all installed Apps in ascending App identifier order.
    fn list(&self) -> Vec<App>;
}

/// Durable storage of subscriptions keyed by subject and scope.
pub trait SubscriptionStore: Send + Sync {
    /// Saves a subscription, replacing the App's prior entry for the key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record cannot be written.
    fn save(&self, subscription: Subscription) -> Result<(), StoreError>;

    /// Deletes the App's subscription for the key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such subscription exists.
    fn delete(&self, app_id: &AppId, key: &ScopeKey) -> Result<(), StoreError>;

    /// Lists the subscriptions stored under the key, all Apps included.
    fn list(&self, key: &ScopeKey) -> Vec<Subscription>;
}

/// Shared flag storage with expiry, backing the cross-instance lease lock.
///
/// Implementations must make `set_if_absent` atomic with respect to
/// concurrent callers: exactly one caller wins an absent (or expired)
/// flag.
pub trait KvFlagStore: Send + Sync {
    /// Sets the named flag when absent or expired; returns true on win.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be reached.
    fn set_if_absent(&self, name: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Clears the named flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be reached.
    fn clear(&self, name: &str) -> Result<(), StoreError>;
}
