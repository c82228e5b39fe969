// crates/app-relay-core/src/core/errors.rs
// ============================================================================
// Module: App Relay Error Taxonomy
// Description: Stable error categories surfaced by proxy operations.
// Purpose: Classify failures for propagation or local recovery.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every failure in App Relay falls into one of five categories. `NotFound`
//! and `Invalid` abort the operation and surface to the initiating actor.
//! `Transport` failures during a Call are converted into `error`-type
//! responses at the upstream boundary; during a Notification or binding
//! fetch they are recovered locally. `Expansion` failures abort the
//! enclosing Call or Notification before dispatch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::interfaces::UpstreamError;

// ============================================================================
// SECTION: Relay Errors
// ============================================================================

/// Errors surfaced by proxy operations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Display forms are suitable for surfacing to the initiating actor.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A referenced App, Manifest, or Subscription does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Validation failed; the operation was rejected before any state change.
    #[error("invalid input: {0}")]
    Invalid(String),
    /// An upstream transport failed.
    #[error("upstream failure: {0}")]
    Transport(#[from] UpstreamError),
    /// A request or response body could not be decoded.
    #[error("decode failure: {0}")]
    Decode(String),
    /// A requested Context entity could not be fetched or projected.
    #[error("expansion failure: {0}")]
    Expansion(String),
}
