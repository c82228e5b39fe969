// crates/app-relay-core/src/core/mod.rs
// ============================================================================
// Module: App Relay Core Types
// Description: Canonical data model for Apps, Calls, Contexts, and events.
// Purpose: Group the wire-visible types and their validation rules.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `core` module holds every type that crosses the wire between the
//! host, the proxy, and installed Apps, along with their validation rules.
//! Types validate at construction or persistence boundaries and are plain
//! data otherwise.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod app;
pub mod binding;
pub mod call;
pub mod context;
pub mod entities;
pub mod errors;
pub mod expand;
pub mod identifiers;
pub mod manifest;
pub mod permissions;
pub mod subscription;
