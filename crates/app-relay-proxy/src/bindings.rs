// crates/app-relay-proxy/src/bindings.rs
// ============================================================================
// Module: Binding Aggregator
// Description: Authorization scanning and merge of per-App binding trees.
// Purpose: Produce one authorized UI tree across all installed Apps.
// Dependencies: app-relay-core, app-relay-upstream
// ============================================================================

//! ## Overview
//! Aggregation iterates all enabled Apps in App identifier order, fetches
//! each one's declared binding tree through its upstream, authorization-
//! scans it against the App's granted locations, and folds the survivors
//! into one accumulator keyed by `(app_id, location)` at every tree
//! level. One App's failure never degrades the aggregate: its subtree is
//! skipped and the skip is reported through the observer.
//!
//! Authorization admits a node when its fully qualified location is a
//! descendant of a granted location or a granted location is a descendant
//! of it. The ancestor direction may over-admit container chrome; it is
//! kept deliberately, matching the granted-location semantics the rest of
//! the platform relies on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use app_relay_core::App;
use app_relay_core::Binding;
use app_relay_core::CallRequest;
use app_relay_core::Context;
use app_relay_core::Location;
use app_relay_core::RelayError;
use app_relay_core::default_bindings_call;

use crate::expand::Expander;
use crate::observer::AppSkipEvent;
use crate::service::ProxyService;

// ============================================================================
// SECTION: Merge
// ============================================================================

/// Folds an incoming binding tree into the accumulator.
///
/// Trees merge by `(app_id, location)` identity at each level: a matching
/// incoming leaf overrides the existing node, a matching pair of
/// containers merges children recursively, and non-matching nodes append
/// in input order.
#[must_use]
pub fn merge_bindings(accumulator: Vec<Binding>, incoming: Vec<Binding>) -> Vec<Binding> {
    let mut out = accumulator;
    for node in incoming {
        let position = out
            .iter()
            .position(|candidate| candidate.app_id == node.app_id && candidate.location == node.location);
        match position {
            Some(index) => {
                let mut merged = node;
                if !out[index].bindings.is_empty() && merged.call.is_none() {
                    merged.bindings =
                        merge_bindings(std::mem::take(&mut out[index].bindings), merged.bindings);
                }
                out[index] = merged;
            }
            None => out.push(node),
        }
    }
    out
}

// ============================================================================
// SECTION: Authorization Scan
// ============================================================================

/// Scans a per-App binding tree, dropping unauthorized nodes.
///
/// Admitted non-top-level nodes are stamped with the owning App and
/// require a label; duplicate sibling locations and labels are dropped;
/// containers whose children are all rejected are themselves dropped.
#[must_use]
pub(crate) fn scan_app_bindings(
    app: &App,
    bindings: Vec<Binding>,
    prefix: &Location,
) -> Vec<Binding> {
    let mut out = Vec::new();
    let mut locations_used: BTreeSet<Location> = BTreeSet::new();
    let mut labels_used: BTreeSet<String> = BTreeSet::new();

    for node in bindings {
        let mut node = node;
        if node.location.is_empty() {
            node.location = Location::new(app.app_id().as_str());
        }

        let fql = prefix.join(&node.location);
        let allowed = app
            .granted_locations
            .as_slice()
            .iter()
            .any(|granted| fql.within(granted) || granted.within(&fql));
        if !allowed {
            continue;
        }

        if fql.is_top() {
            if !locations_used.insert(node.location.clone()) {
                continue;
            }
        } else {
            if node.label.is_empty() {
                continue;
            }
            if locations_used.contains(&node.location) || labels_used.contains(&node.label) {
                continue;
            }
            locations_used.insert(node.location.clone());
            labels_used.insert(node.label.clone());
            node.app_id = Some(app.app_id().clone());
        }

        if !node.bindings.is_empty() {
            let scanned = scan_app_bindings(app, std::mem::take(&mut node.bindings), &fql);
            if scanned.is_empty() {
                continue;
            }
            node.bindings = scanned;
        }

        out.push(node);
    }

    out
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

impl ProxyService {
    /// Aggregates the authorized binding trees of all enabled Apps.
    ///
    /// Iteration is deterministic by App identifier order, so later Apps
    /// merge over earlier ones at colliding keys. Per-App failures are
    /// reported through the observer and the App is skipped; aggregation
    /// itself never fails.
    #[must_use]
    pub fn get_bindings(&self, base: &Context) -> Vec<Binding> {
        let mut aggregate = Vec::new();
        for app in self.apps.list() {
            if !app.is_enabled() {
                continue;
            }
            match self.bindings_for_app(&app, base) {
                Ok(scanned) => aggregate = merge_bindings(aggregate, scanned),
                Err(err) => self.observer.app_skipped(AppSkipEvent {
                    app_id: app.app_id().clone(),
                    reason: err.to_string(),
                }),
            }
        }
        aggregate
    }

    /// Fetches and scans one App's binding tree.
    fn bindings_for_app(&self, app: &App, base: &Context) -> Result<Vec<Binding>, RelayError> {
        let call = app
            .manifest
            .bindings
            .as_ref()
            .map_or_else(default_bindings_call, |call| call.with_defaults(&default_bindings_call()));

        let mut expander =
            Expander::new(app, self.host.as_ref(), self.tokens.as_ref(), &self.site, base.clone());
        let context = expander.expand(call.expand.as_ref())?;

        let upstream = self.resolver.resolve(app).map_err(RelayError::Transport)?;
        let request = CallRequest {
            call,
            context,
            ..CallRequest::default()
        };
        let fetched =
            upstream.fetch_bindings(app, &request).map_err(RelayError::Transport)?;
        Ok(scan_app_bindings(app, fetched, &Location::default()))
    }
}
