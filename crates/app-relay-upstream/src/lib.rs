// crates/app-relay-upstream/src/lib.rs
// ============================================================================
// Module: App Relay Upstream Library
// Description: Per-deploy-type transports and the upstream resolver.
// Purpose: Reach Apps over HTTP, serverless invocation, or in-process calls.
// Dependencies: app-relay-core, reqwest, jsonwebtoken, url
// ============================================================================

//! ## Overview
//! App Relay Upstream provides the three interchangeable implementations of
//! the [`app_relay_core::Upstream`] contract plus the resolver that selects
//! one per App from its manifest's populated deploy section. App responses
//! are untrusted input: every transport bounds response sizes and fails
//! closed on malformed bodies.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;
pub mod in_process;
pub mod resolver;
pub mod serverless;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::HttpUpstream;
pub use http::HttpUpstreamConfig;
pub use http::OUTGOING_AUTH_HEADER;
pub use in_process::InProcessUpstream;
pub use resolver::UpstreamResolver;
pub use resolver::UpstreamResolverBuilder;
pub use serverless::AssetDescriptor;
pub use serverless::FunctionInvoker;
pub use serverless::InvokerError;
pub use serverless::ServerlessUpstream;
pub use serverless::asset_for;
pub use serverless::match_function;
pub use serverless::qualified_function_name;
