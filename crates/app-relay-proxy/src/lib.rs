// crates/app-relay-proxy/src/lib.rs
// ============================================================================
// Module: App Relay Proxy Library
// Description: Context expansion, binding aggregation, dispatch, and fan-out.
// Purpose: Broker Calls and Notifications between the host and its Apps.
// Dependencies: app-relay-core, app-relay-upstream, tokio
// ============================================================================

//! ## Overview
//! The proxy crate wires the core model and the upstream transports into
//! the four proxy operations: permission-scoped Context expansion, UI
//! binding aggregation across all installed Apps, Call dispatch, and
//! subscription-based event fan-out. Partial failures of individual Apps
//! are recovered locally and reported through the observer; validation
//! and expansion failures abort the enclosing operation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bindings;
pub mod call;
pub mod expand;
pub mod lock;
pub mod notify;
pub mod observer;
pub mod service;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bindings::merge_bindings;
pub use expand::Expander;
pub use lock::LeaseLock;
pub use lock::MemoryFlagStore;
pub use observer::AppSkipEvent;
pub use observer::ChannelObserver;
pub use observer::DispatchOutcome;
pub use observer::NoopObserver;
pub use observer::NotifyDispatchEvent;
pub use observer::ProxyEvent;
pub use observer::ProxyObserver;
pub use service::ProxyService;
pub use service::ProxyServiceBuilder;
pub use service::SiteConfig;
pub use store::MemoryAppStore;
pub use store::MemorySubscriptionStore;

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions and debug output.
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
}
