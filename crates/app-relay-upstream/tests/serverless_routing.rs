// crates/app-relay-upstream/tests/serverless_routing.rs
// ============================================================================
// Module: Serverless Upstream Tests
// Description: Path routing and invocation envelope tests.
// Purpose: Pin longest-prefix selection and status handling.
// ============================================================================

//! ## Overview
//! Uses a recording fake in place of the cloud invoker to pin the
//! longest-prefix function selection (declaration order breaking ties),
//! the invocation envelope shape, status-code failure handling, and
//! static asset descriptor resolution.

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

use std::sync::Arc;
use std::sync::Mutex;

use app_relay_core::App;
use app_relay_core::Call;
use app_relay_core::CallRequest;
use app_relay_core::CallResponseType;
use app_relay_core::Deploy;
use app_relay_core::DeployType;
use app_relay_core::FunctionRoute;
use app_relay_core::Manifest;
use app_relay_core::ServerlessDeploy;
use app_relay_core::Upstream;
use app_relay_core::UpstreamError;
use app_relay_upstream::AssetDescriptor;
use app_relay_upstream::FunctionInvoker;
use app_relay_upstream::InvokerError;
use app_relay_upstream::ServerlessUpstream;
use app_relay_upstream::asset_for;
use app_relay_upstream::match_function;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Recording invoker returning a canned invocation response.
struct FakeInvoker {
    /// Invoked function names and raw payloads, in order.
    calls: Mutex<Vec<(String, Vec<u8>)>>,
    /// Raw invocation response returned for every call.
    response: Vec<u8>,
}

impl FakeInvoker {
    /// Creates a fake returning the given invocation response.
    fn new(response: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            response: response.to_string().into_bytes(),
        })
    }

    /// Returns the recorded function names.
    fn invoked(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(name, _)| name.clone()).collect()
    }
}

impl FunctionInvoker for FakeInvoker {
    fn invoke(&self, function: &str, payload: &[u8]) -> Result<Vec<u8>, InvokerError> {
        self.calls.lock().unwrap().push((function.to_string(), payload.to_vec()));
        Ok(self.response.clone())
    }
}

/// Builds a serverless deploy with the given routes.
fn deploy(routes: &[(&str, &str)]) -> ServerlessDeploy {
    ServerlessDeploy {
        functions: routes
            .iter()
            .map(|(path, name)| FunctionRoute {
                path: (*path).to_string(),
                name: (*name).to_string(),
            })
            .collect(),
        static_bucket: String::new(),
    }
}

/// Builds an installed serverless App with the given routes.
fn serverless_app(routes: &[(&str, &str)]) -> App {
    App {
        manifest: Manifest {
            app_id: "fn-app".into(),
            version: "v2".into(),
            homepage_url: "https://example.com/fn".to_string(),
            deploy: Deploy {
                serverless: Some(deploy(routes)),
                ..Deploy::default()
            },
            ..Manifest::default()
        },
        deploy_type: Some(DeployType::Serverless),
        ..App::default()
    }
}

// ============================================================================
// SECTION: Route Matching
// ============================================================================

#[test]
fn match_function_selects_longest_prefix() {
    let deploy = deploy(&[("/", "root"), ("/send", "send"), ("/send/extra", "extra")]);
    assert_eq!(match_function("/send/extra/more", &deploy), Some("extra"));
    assert_eq!(match_function("/send/other", &deploy), Some("send"));
    assert_eq!(match_function("/unrelated", &deploy), Some("root"));
}

#[test]
fn match_function_breaks_ties_by_declaration_order() {
    let deploy = deploy(&[("/send", "first"), ("/send", "second")]);
    assert_eq!(match_function("/send", &deploy), Some("first"));
}

#[test]
fn match_function_requires_a_match() {
    let deploy = deploy(&[("/send", "send")]);
    assert_eq!(match_function("/other", &deploy), None);
}

// ============================================================================
// SECTION: Invocation
// ============================================================================

#[test]
fn invoke_call_wraps_and_unwraps_envelopes() {
    let inner = json!({"type": "ok", "markdown": "done"}).to_string();
    let invoker = FakeInvoker::new(json!({"statusCode": 200, "body": inner}));
    let upstream = ServerlessUpstream::new(Arc::clone(&invoker) as Arc<dyn FunctionInvoker>);
    let app = serverless_app(&[("/send", "send")]);

    let request = CallRequest::new(Call::new("/send/now"));
    let response = upstream.invoke_call(&app, &request).unwrap();
    assert_eq!(response.response_type, CallResponseType::Ok);
    assert_eq!(response.markdown, "done");

    // Function names are qualified with the App identity.
    assert_eq!(invoker.invoked(), vec!["fn-app_v2_send".to_string()]);

    let (_, payload) = invoker.calls.lock().unwrap().remove(0);
    let wrapped: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(wrapped["path"], "/send/now");
    assert_eq!(wrapped["httpMethod"], "POST");
    let body: Value = serde_json::from_str(wrapped["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["path"], "/send/now");
}

#[test]
fn invoke_call_fails_on_unmatched_path() {
    let invoker = FakeInvoker::new(json!({"statusCode": 200, "body": "{}"}));
    let upstream = ServerlessUpstream::new(invoker as Arc<dyn FunctionInvoker>);
    let app = serverless_app(&[("/send", "send")]);

    let request = CallRequest::new(Call::new("/other"));
    let err = upstream.invoke_call(&app, &request).unwrap_err();
    assert!(matches!(err, UpstreamError::NotFound(_)));
}

#[test]
fn invoke_call_fails_on_non_200_envelope_status() {
    let invoker = FakeInvoker::new(json!({"statusCode": 502, "body": "gateway"}));
    let upstream = ServerlessUpstream::new(invoker as Arc<dyn FunctionInvoker>);
    let app = serverless_app(&[("/send", "send")]);

    let request = CallRequest::new(Call::new("/send"));
    let err = upstream.invoke_call(&app, &request).unwrap_err();
    assert!(matches!(err, UpstreamError::App(_)));
}

// ============================================================================
// SECTION: Static Assets
// ============================================================================

#[test]
fn asset_for_builds_bucket_key() {
    let mut app = serverless_app(&[("/send", "send")]);
    if let Some(serverless) = app.manifest.deploy.serverless.as_mut() {
        serverless.static_bucket = "apps-static".to_string();
    }
    let descriptor = asset_for(&app, "icon.png").unwrap();
    assert_eq!(
        descriptor,
        AssetDescriptor::BucketKey {
            bucket: "apps-static".to_string(),
            key: "fn-app/v2/static/icon.png".to_string(),
        }
    );
}

#[test]
fn asset_for_passes_raw_urls_through() {
    let app = serverless_app(&[("/send", "send")]);
    let descriptor = asset_for(&app, "https://cdn.example.com/icon.png").unwrap();
    assert_eq!(descriptor, AssetDescriptor::RawUrl("https://cdn.example.com/icon.png".to_string()));
}

#[test]
fn asset_for_requires_a_bucket_for_relative_paths() {
    let app = serverless_app(&[("/send", "send")]);
    let err = asset_for(&app, "icon.png").unwrap_err();
    assert!(matches!(err, UpstreamError::NotFound(_)));
}
