// crates/app-relay-proxy/src/notify.rs
// ============================================================================
// Module: Subscription Fan-Out
// Description: Subscription registration and lifecycle event delivery.
// Purpose: Notify every matching subscriber independently, at most once.
// Dependencies: app-relay-core, app-relay-upstream
// ============================================================================

//! ## Overview
//! Subscriptions are validated at write time and stored keyed by subject
//! and scope. When a host lifecycle hook reports an event, fan-out looks
//! up the matching subscriptions and, for each one, expands a fresh
//! Context per the subscription's own directive and dispatches a one-way
//! Notification on its own thread. The triggering event returns without
//! waiting for any subscriber; there is no retry and no delivery
//! confirmation. Each dispatch reports its outcome through the observer,
//! so failures stay observable without coupling subscribers to each
//! other or to the event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;

use app_relay_core::AppId;
use app_relay_core::Event;
use app_relay_core::Notification;
use app_relay_core::RelayError;
use app_relay_core::ScopeKey;
use app_relay_core::Subject;
use app_relay_core::Subscription;

use crate::expand::Expander;
use crate::observer::DispatchOutcome;
use crate::observer::NotifyDispatchEvent;
use crate::service::ProxyService;

// ============================================================================
// SECTION: Subscription Registration
// ============================================================================

impl ProxyService {
    /// Registers a subscription after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when the subscription fails scope
    /// or format validation, [`RelayError::NotFound`] when the
    /// subscribing App is not installed, and store failures as
    /// [`RelayError::Invalid`]. Nothing persists on any failure.
    pub fn subscribe(&self, subscription: Subscription) -> Result<(), RelayError> {
        subscription.validate()?;
        self.enabled_app(&subscription.app_id)?;
        self.subscriptions
            .save(subscription)
            .map_err(|err| RelayError::Invalid(format!("subscription store: {err}")))
    }

    /// Removes an App's subscription for a subject and scope.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NotFound`] when no such subscription exists.
    pub fn unsubscribe(&self, app_id: &AppId, key: &ScopeKey) -> Result<(), RelayError> {
        self.subscriptions
            .delete(app_id, key)
            .map_err(|err| RelayError::NotFound(format!("subscription: {err}")))
    }
}

// ============================================================================
// SECTION: Fan-Out
// ============================================================================

impl ProxyService {
    /// Fans a lifecycle event out to every matching subscriber.
    ///
    /// Dispatches are independent, uncoordinated, and fire-and-forget:
    /// this method returns once every matching subscriber has been handed
    /// to its own dispatch thread. A subscriber whose App is missing,
    /// disabled, or fails expansion is reported through the observer and
    /// dropped without affecting the others.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when the event itself is malformed
    /// (missing subject or a scope not matching the subject's shape).
    pub fn notify(&self, event: &Event) -> Result<(), RelayError> {
        let Some(subject) = event.subject else {
            return Err(RelayError::Invalid("event subject is required".to_string()));
        };
        subject.validate_scope(&event.team_id, &event.channel_id)?;

        let key = ScopeKey {
            subject,
            team_id: event.team_id.clone(),
            channel_id: event.channel_id.clone(),
        };
        for subscription in self.subscriptions.list(&key) {
            self.notify_subscriber(subject, event, &subscription);
        }
        Ok(())
    }

    /// Expands and dispatches one subscriber's notification.
    fn notify_subscriber(&self, subject: Subject, event: &Event, subscription: &Subscription) {
        let report = |outcome: DispatchOutcome| {
            self.observer.notify_dispatched(NotifyDispatchEvent {
                app_id: subscription.app_id.clone(),
                subject,
                outcome,
            });
        };

        let app = match self.enabled_app(&subscription.app_id) {
            Ok(app) => app,
            Err(err) => return report(DispatchOutcome::Failed(err.to_string())),
        };
        let upstream = match self.resolver.resolve(&app) {
            Ok(upstream) => upstream,
            Err(err) => return report(DispatchOutcome::Failed(err.to_string())),
        };

        let directive = subscription.call.as_ref().and_then(|call| call.expand.as_ref());
        let mut expander = Expander::new(
            &app,
            self.host.as_ref(),
            self.tokens.as_ref(),
            &self.site,
            event.base_context(),
        );
        let mut context = match expander.expand(directive) {
            Ok(context) => context,
            Err(err) => return report(DispatchOutcome::Failed(err.to_string())),
        };
        context.subject = Some(subject);

        let notification = Notification {
            subject: Some(subject),
            context,
        };

        // One detached thread per dispatch; the event returns without
        // waiting and failures surface only through the observer.
        let observer = std::sync::Arc::clone(&self.observer);
        let app_id = subscription.app_id.clone();
        thread::spawn(move || {
            let outcome = match upstream.notify(&app, &notification) {
                Ok(()) => DispatchOutcome::Delivered,
                Err(err) => DispatchOutcome::Failed(err.to_string()),
            };
            observer.notify_dispatched(NotifyDispatchEvent {
                app_id,
                subject,
                outcome,
            });
        });
    }
}
