// crates/app-relay-proxy/tests/dispatch.rs
// ============================================================================
// Module: Call Dispatcher Tests
// Description: End-to-end dispatch tests over in-process Apps.
// Purpose: Pin resolution, path cleaning, passthrough, and error envelopes.
// ============================================================================

//! ## Overview
//! Drives the dispatcher end to end: the lookup passthrough scenario, the
//! always-well-formed error envelope for every failure mode, Call path
//! normalization, the expanded Context actually reaching the App, and the
//! ping probe.

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

mod common;

use std::sync::Arc;

use app_relay_core::Call;
use app_relay_core::CallRequest;
use app_relay_core::CallResponse;
use app_relay_core::CallResponseType;
use app_relay_core::CallType;
use app_relay_core::Context;
use app_relay_core::Expand;
use app_relay_core::ExpandLevel;
use app_relay_core::RelayError;
use app_relay_proxy::call::clean_path;
use serde_json::json;

use crate::common::fixture;
use crate::common::in_process_app;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Builds a request routed to the given App and path.
fn request_to(app_id: &str, path: &str) -> CallRequest {
    CallRequest {
        call: Call::new(path),
        context: Context {
            app_id: app_id.into(),
            acting_user_id: "user-1".into(),
            channel_id: "chan-1".into(),
            ..Context::default()
        },
        ..CallRequest::default()
    }
}

// ============================================================================
// SECTION: Path Cleaning
// ============================================================================

#[test]
fn clean_path_collapses_duplicate_slashes() {
    assert_eq!(clean_path("/send//now").unwrap(), "/send/now");
    assert_eq!(clean_path("/send/").unwrap(), "/send");
    assert_eq!(clean_path("/").unwrap(), "/");
}

#[test]
fn clean_path_rejects_relative_and_dot_paths() {
    assert!(matches!(clean_path(""), Err(RelayError::Invalid(_))));
    assert!(matches!(clean_path("send"), Err(RelayError::Invalid(_))));
    assert!(matches!(clean_path("/send/../other"), Err(RelayError::Invalid(_))));
    assert!(matches!(clean_path("/send/./other"), Err(RelayError::Invalid(_))));
}

// ============================================================================
// SECTION: Dispatch Envelope
// ============================================================================

#[test]
fn lookup_response_passes_through_unmodified() {
    let fixture = fixture();
    fixture.apps.put(in_process_app("lookup-app", &["/command"], &[])).unwrap();
    fixture.upstream.register(
        "lookup-app",
        "/options",
        Arc::new(|_: &CallRequest| {
            CallResponse::data(json!({
                "items": [{"label": "Option 1", "value": "option1"}],
            }))
        }),
    );

    let mut request = request_to("lookup-app", "/options");
    request.call_type = CallType::Lookup;
    request.query = "opt".to_string();

    let response = fixture.service.dispatch(&request);
    assert_eq!(response.response_type, CallResponseType::Ok);
    assert_eq!(response.data.unwrap()["items"][0]["value"], "option1");
}

#[test]
fn dispatch_without_app_id_is_an_error_response() {
    let fixture = fixture();
    let request = CallRequest::new(Call::new("/send"));
    let response = fixture.service.dispatch(&request);
    assert_eq!(response.response_type, CallResponseType::Error);
    assert!(response.error_text().contains("app_id"));
}

#[test]
fn dispatch_to_unknown_app_is_an_error_response() {
    let fixture = fixture();
    let response = fixture.service.dispatch(&request_to("ghost-app", "/send"));
    assert_eq!(response.response_type, CallResponseType::Error);
}

#[test]
fn dispatch_to_disabled_app_is_an_error_response() {
    let fixture = fixture();
    let mut app = in_process_app("dark-app", &["/command"], &[]);
    app.disabled = true;
    fixture.apps.put(app).unwrap();

    let response = fixture.service.dispatch(&request_to("dark-app", "/send"));
    assert_eq!(response.response_type, CallResponseType::Error);
    assert!(response.error_text().contains("disabled"));
}

#[test]
fn dispatch_with_invalid_path_is_an_error_response() {
    let fixture = fixture();
    fixture.apps.put(in_process_app("path-app", &["/command"], &[])).unwrap();

    let response = fixture.service.dispatch(&request_to("path-app", "../escape"));
    assert_eq!(response.response_type, CallResponseType::Error);
}

#[test]
fn dispatch_transport_failure_is_an_error_response() {
    let fixture = fixture();
    fixture.apps.put(in_process_app("absent-app", &["/command"], &[])).unwrap();
    // No handler registered for the path: the upstream reports not-found.

    let response = fixture.service.dispatch(&request_to("absent-app", "/send"));
    assert_eq!(response.response_type, CallResponseType::Error);
}

#[test]
fn dispatch_expansion_failure_is_an_error_response() {
    let fixture = fixture();
    fixture.apps.put(in_process_app("expand-app", &["/command"], &[])).unwrap();
    fixture.upstream.register(
        "expand-app",
        "/send",
        Arc::new(|_: &CallRequest| CallResponse::ok()),
    );

    let mut request = request_to("expand-app", "/send");
    request.context.channel_id = "missing-channel".into();
    request.call.expand = Some(Expand {
        channel: ExpandLevel::All,
        ..Expand::default()
    });

    let response = fixture.service.dispatch(&request);
    assert_eq!(response.response_type, CallResponseType::Error);
}

// ============================================================================
// SECTION: Context Substitution
// ============================================================================

#[test]
fn dispatch_substitutes_the_expanded_context() {
    let fixture = fixture();
    fixture.apps.put(in_process_app("ctx-app", &["/command"], &[])).unwrap();
    fixture.upstream.register(
        "ctx-app",
        "/inspect",
        Arc::new(|request: &CallRequest| {
            // Echo what the App actually received.
            CallResponse::data(json!({
                "app_id": request.context.app_id.as_str(),
                "acting_user_id": request.context.acting_user_id.as_str(),
                "channel": request.context.expanded.channel.as_ref().map(|c| c.display_name.clone()),
                "site_url": request.context.expanded.site_url,
            }))
        }),
    );

    let mut request = request_to("ctx-app", "/inspect");
    request.call.expand = Some(Expand {
        channel: ExpandLevel::Summary,
        ..Expand::default()
    });

    let response = fixture.service.dispatch(&request);
    let data = response.data.unwrap();
    assert_eq!(data["app_id"], "ctx-app", "app_id is pinned to the resolved App");
    assert_eq!(data["acting_user_id"], "", "server-only IDs are stripped");
    assert_eq!(data["channel"], "Town Square");
    assert_eq!(data["site_url"], "https://host.example.com");
}

// ============================================================================
// SECTION: Ping
// ============================================================================

#[test]
fn ping_treats_not_found_as_reachable() {
    let fixture = fixture();
    let app = in_process_app("quiet-app", &["/command"], &[]);
    fixture.apps.put(app.clone()).unwrap();
    // No /ping handler: the in-process upstream reports not-found, which
    // still proves the App is reachable.
    assert!(fixture.service.ping(&app));
}

#[test]
fn ping_succeeds_for_a_responding_app() {
    let fixture = fixture();
    let app = in_process_app("live-app", &["/command"], &[]);
    fixture.apps.put(app.clone()).unwrap();
    fixture.upstream.register("live-app", "/ping", Arc::new(|_: &CallRequest| CallResponse::ok()));
    assert!(fixture.service.ping(&app));
}
