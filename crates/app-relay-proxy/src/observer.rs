// crates/app-relay-proxy/src/observer.rs
// ============================================================================
// Module: Proxy Observer
// Description: Structured event reporting for locally recovered failures.
// Purpose: Make per-App skips and notification outcomes observable.
// Dependencies: app-relay-core, tokio
// ============================================================================

//! ## Overview
//! Two proxy paths recover failures locally instead of surfacing them: a
//! misbehaving App during binding aggregation is skipped, and a failing
//! subscriber during event fan-out is dropped. Both report what happened
//! through [`ProxyObserver`] so failures stay observable without coupling
//! back to the triggering operation. [`ChannelObserver`] forwards events
//! into a bounded `tokio::sync::mpsc` channel for whatever telemetry
//! backend the deployment plugs in; [`NoopObserver`] discards them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use app_relay_core::AppId;
use app_relay_core::Subject;
use tokio::sync::mpsc::Sender;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Outcome of one notification dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The upstream accepted the notification.
    Delivered,
    /// The dispatch failed; the subscriber was dropped for this event.
    Failed(String),
}

/// One notification dispatch attempt, reported after completion.
///
/// # Invariants
/// - Emitted exactly once per matching subscriber per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyDispatchEvent {
    /// Subscriber the notification was routed to.
    pub app_id: AppId,
    /// Subject that fired.
    pub subject: Subject,
    /// Dispatch outcome.
    pub outcome: DispatchOutcome,
}

/// One App skipped during binding aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSkipEvent {
    /// App whose subtree was skipped.
    pub app_id: AppId,
    /// Why the App's bindings were dropped for this aggregation.
    pub reason: String,
}

/// Union of observer events, for channel-based consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyEvent {
    /// A notification dispatch completed.
    NotifyDispatched(NotifyDispatchEvent),
    /// An App was skipped during binding aggregation.
    AppSkipped(AppSkipEvent),
}

// ============================================================================
// SECTION: Observer Trait
// ============================================================================

/// Receives structured events for locally recovered failures.
pub trait ProxyObserver: Send + Sync {
    /// Reports a completed notification dispatch.
    fn notify_dispatched(&self, event: NotifyDispatchEvent);

    /// Reports an App skipped during binding aggregation.
    fn app_skipped(&self, event: AppSkipEvent);
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProxyObserver for NoopObserver {
    fn notify_dispatched(&self, _event: NotifyDispatchEvent) {}

    fn app_skipped(&self, _event: AppSkipEvent) {}
}

/// Observer forwarding events into a bounded channel.
///
/// # Invariants
/// - Events are dropped, never blocked on, when the channel is full; the
///   proxy operation must not stall on a slow telemetry consumer.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    /// Sender used to forward events.
    sender: Sender<ProxyEvent>,
}

impl ChannelObserver {
    /// Creates a channel observer over the given sender.
    #[must_use]
    pub const fn new(sender: Sender<ProxyEvent>) -> Self {
        Self {
            sender,
        }
    }
}

impl ProxyObserver for ChannelObserver {
    fn notify_dispatched(&self, event: NotifyDispatchEvent) {
        let _ = self.sender.try_send(ProxyEvent::NotifyDispatched(event));
    }

    fn app_skipped(&self, event: AppSkipEvent) {
        let _ = self.sender.try_send(ProxyEvent::AppSkipped(event));
    }
}
