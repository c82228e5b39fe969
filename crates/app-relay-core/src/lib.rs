// crates/app-relay-core/src/lib.rs
// ============================================================================
// Module: App Relay Core Library
// Description: Canonical data model and interface contracts for App Relay.
// Purpose: Define Apps, Calls, Contexts, Bindings, Subscriptions, and seams.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! App Relay Core defines the canonical wire types exchanged between the
//! host platform and installed Apps, the validation rules that guard them,
//! and the backend-agnostic interface traits implemented by the transport
//! and proxy crates. Inputs arriving from Apps or user agents are untrusted
//! and validated at construction boundaries.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::app::App;
pub use crate::core::binding::Binding;
pub use crate::core::call::Call;
pub use crate::core::call::CallRequest;
pub use crate::core::call::CallResponse;
pub use crate::core::call::CallResponseType;
pub use crate::core::call::CallType;
pub use crate::core::call::DEFAULT_BINDINGS_PATH;
pub use crate::core::call::DEFAULT_PING_PATH;
pub use crate::core::call::default_bindings_call;
pub use crate::core::call::default_ping_call;
pub use crate::core::context::Context;
pub use crate::core::context::ExpandedContext;
pub use crate::core::entities::AppInfo;
pub use crate::core::entities::Channel;
pub use crate::core::entities::Post;
pub use crate::core::entities::Team;
pub use crate::core::entities::User;
pub use crate::core::errors::RelayError;
pub use crate::core::expand::Expand;
pub use crate::core::expand::ExpandLevel;
pub use crate::core::identifiers::AppId;
pub use crate::core::identifiers::AppVersion;
pub use crate::core::identifiers::ChannelId;
pub use crate::core::identifiers::Location;
pub use crate::core::identifiers::PostId;
pub use crate::core::identifiers::TeamId;
pub use crate::core::identifiers::UserId;
pub use crate::core::manifest::Deploy;
pub use crate::core::manifest::DeployType;
pub use crate::core::manifest::FunctionRoute;
pub use crate::core::manifest::HttpDeploy;
pub use crate::core::manifest::InProcessDeploy;
pub use crate::core::manifest::Manifest;
pub use crate::core::manifest::ServerlessDeploy;
pub use crate::core::permissions::Locations;
pub use crate::core::permissions::Permission;
pub use crate::core::permissions::Permissions;
pub use crate::core::subscription::Event;
pub use crate::core::subscription::Notification;
pub use crate::core::subscription::ScopeKey;
pub use crate::core::subscription::Subject;
pub use crate::core::subscription::Subscription;
pub use crate::interfaces::AppStore;
pub use crate::interfaces::HostDataSource;
pub use crate::interfaces::HostFetchError;
pub use crate::interfaces::KvFlagStore;
pub use crate::interfaces::StoreError;
pub use crate::interfaces::SubscriptionStore;
pub use crate::interfaces::TokenError;
pub use crate::interfaces::TokenIssuer;
pub use crate::interfaces::Upstream;
pub use crate::interfaces::UpstreamError;
