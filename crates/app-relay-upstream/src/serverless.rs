// crates/app-relay-upstream/src/serverless.rs
// ============================================================================
// Module: Serverless Upstream
// Description: Transport for Apps deployed as serverless functions.
// Purpose: Route Call paths to functions and wrap envelopes for invocation.
// Dependencies: app-relay-core, serde, serde_json
// ============================================================================

//! ## Overview
//! A serverless manifest declares a table of path-prefix to function-name
//! routes. Dispatch selects the function whose declared path is the
//! longest matching prefix of the Call path, with declaration order
//! breaking ties; no match is an error. The concrete cloud client is out
//! of scope and plugs in behind the [`FunctionInvoker`] trait. Envelopes
//! cross the invocation boundary in an API-gateway request/response shape.
//! Static assets resolve through an [`AssetDescriptor`] without invoking
//! any function.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use app_relay_core::App;
use app_relay_core::AppId;
use app_relay_core::AppVersion;
use app_relay_core::CallRequest;
use app_relay_core::CallResponse;
use app_relay_core::Notification;
use app_relay_core::ServerlessDeploy;
use app_relay_core::Upstream;
use app_relay_core::UpstreamError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Function Invoker
// ============================================================================

/// Errors returned by function invokers.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum InvokerError {
    /// The named function does not exist in the deployment.
    #[error("function not found: {0}")]
    NotFound(String),
    /// Invocation failed before a response was produced.
    #[error("function invocation failed: {0}")]
    Failed(String),
}

/// Boundary to the cloud provider's function invocation API.
pub trait FunctionInvoker: Send + Sync {
    /// Invokes a function synchronously and returns its raw response.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError`] when the function is missing or fails.
    fn invoke(&self, function: &str, payload: &[u8]) -> Result<Vec<u8>, InvokerError>;

    /// Invokes a function one-way, discarding any response.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError`] when the invocation cannot be started.
    fn invoke_one_way(&self, function: &str, payload: &[u8]) -> Result<(), InvokerError> {
        self.invoke(function, payload).map(|_| ())
    }
}

// ============================================================================
// SECTION: Invocation Envelopes
// ============================================================================

/// Request envelope crossing the function invocation boundary.
#[derive(Debug, Serialize, Deserialize)]
struct ServerlessRequest {
    /// Call path the function should route on.
    path: String,
    /// HTTP method label; always POST.
    #[serde(rename = "httpMethod")]
    http_method: String,
    /// Content-type headers for the embedded body.
    headers: std::collections::BTreeMap<String, String>,
    /// JSON-encoded Call or Notification envelope.
    body: String,
}

impl ServerlessRequest {
    /// Wraps a JSON envelope for invocation.
    fn wrap<T: Serialize>(path: &str, envelope: &T) -> Result<Vec<u8>, UpstreamError> {
        let body = serde_json::to_string(envelope)
            .map_err(|err| UpstreamError::Decode(format!("encode envelope: {err}")))?;
        let mut headers = std::collections::BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let request = Self {
            path: path.to_string(),
            http_method: "POST".to_string(),
            headers,
            body,
        };
        serde_json::to_vec(&request)
            .map_err(|err| UpstreamError::Decode(format!("encode invocation payload: {err}")))
    }
}

/// Response envelope crossing the function invocation boundary.
#[derive(Debug, Deserialize)]
struct ServerlessResponse {
    /// HTTP-style status code reported by the function.
    #[serde(rename = "statusCode")]
    status_code: u16,
    /// JSON-encoded response body.
    #[serde(default)]
    body: String,
}

impl ServerlessResponse {
    /// Decodes and status-checks a raw invocation response.
    fn unwrap_body(raw: &[u8]) -> Result<String, UpstreamError> {
        let response: Self = serde_json::from_slice(raw)
            .map_err(|err| UpstreamError::Decode(format!("invocation response: {err}")))?;
        if response.status_code != 200 {
            return Err(UpstreamError::App(format!(
                "function failed with status code {}, body {}",
                response.status_code, response.body
            )));
        }
        Ok(response.body)
    }
}

// ============================================================================
// SECTION: Path Routing
// ============================================================================

/// Selects the function for a Call path by longest matching prefix.
///
/// Declaration order breaks ties between routes of equal prefix length.
#[must_use]
pub fn match_function<'a>(path: &str, deploy: &'a ServerlessDeploy) -> Option<&'a str> {
    let mut matched: Option<&str> = None;
    let mut matched_len = 0;
    for route in &deploy.functions {
        if path.starts_with(route.path.as_str()) && route.path.len() > matched_len {
            matched = Some(route.name.as_str());
            matched_len = route.path.len();
        }
    }
    matched
}

/// Builds the deployment-qualified name of a declared function.
#[must_use]
pub fn qualified_function_name(app_id: &AppId, version: &AppVersion, name: &str) -> String {
    format!("{app_id}_{version}_{name}")
}

// ============================================================================
// SECTION: Asset Descriptor
// ============================================================================

/// Where a static asset of a serverless App resolves to.
///
/// Serving the bytes is the host's concern; this descriptor is the
/// boundary handed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetDescriptor {
    /// Object in the deployment's static bucket.
    BucketKey {
        /// Bucket name.
        bucket: String,
        /// Object key within the bucket.
        key: String,
    },
    /// Directly fetchable URL.
    RawUrl(String),
}

/// Resolves a static asset path for a serverless App.
///
/// # Errors
///
/// Returns [`UpstreamError::Config`] when the App has no serverless deploy
/// section, and [`UpstreamError::NotFound`] when it declares no static
/// bucket.
pub fn asset_for(app: &App, path: &str) -> Result<AssetDescriptor, UpstreamError> {
    let Some(serverless) = &app.manifest.deploy.serverless else {
        return Err(UpstreamError::Config(format!(
            "app {} has no serverless deploy section",
            app.app_id()
        )));
    };
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(AssetDescriptor::RawUrl(path.to_string()));
    }
    if serverless.static_bucket.is_empty() {
        return Err(UpstreamError::NotFound(format!(
            "app {} declares no static bucket",
            app.app_id()
        )));
    }
    let key = format!(
        "{}/{}/static/{}",
        app.app_id(),
        app.manifest.version,
        path.trim_start_matches('/')
    );
    Ok(AssetDescriptor::BucketKey {
        bucket: serverless.static_bucket.clone(),
        key,
    })
}

// ============================================================================
// SECTION: Serverless Upstream
// ============================================================================

/// Transport for Apps deployed as serverless functions.
///
/// # Invariants
/// - Route selection is by longest declared prefix, then declaration order.
pub struct ServerlessUpstream {
    /// Cloud invocation boundary.
    invoker: Arc<dyn FunctionInvoker>,
}

impl ServerlessUpstream {
    /// Creates a serverless upstream over the given invoker.
    #[must_use]
    pub fn new(invoker: Arc<dyn FunctionInvoker>) -> Self {
        Self {
            invoker,
        }
    }

    /// Resolves the qualified function name for a Call path.
    fn function_for(&self, app: &App, path: &str) -> Result<String, UpstreamError> {
        let Some(serverless) = &app.manifest.deploy.serverless else {
            return Err(UpstreamError::Config(format!(
                "app {} has no serverless deploy section",
                app.app_id()
            )));
        };
        match_function(path, serverless)
            .map(|name| qualified_function_name(app.app_id(), &app.manifest.version, name))
            .ok_or_else(|| UpstreamError::NotFound(path.to_string()))
    }

    /// Converts an invoker failure into an upstream error.
    fn convert(err: InvokerError) -> UpstreamError {
        match err {
            InvokerError::NotFound(name) => UpstreamError::NotFound(name),
            InvokerError::Failed(reason) => UpstreamError::Transport(reason),
        }
    }
}

impl Upstream for ServerlessUpstream {
    fn invoke_call(&self, app: &App, request: &CallRequest) -> Result<CallResponse, UpstreamError> {
        let function = self.function_for(app, &request.call.path)?;
        let payload = ServerlessRequest::wrap(&request.call.path, request)?;
        let raw = self.invoker.invoke(&function, &payload).map_err(Self::convert)?;
        let body = ServerlessResponse::unwrap_body(&raw)?;
        serde_json::from_str(&body)
            .map_err(|err| UpstreamError::Decode(format!("call response: {err}")))
    }

    fn notify(&self, app: &App, notification: &Notification) -> Result<(), UpstreamError> {
        let Some(subject) = notification.subject else {
            return Err(UpstreamError::Config("notification subject is required".to_string()));
        };
        let path = format!("/notify/{subject}");
        let function = self.function_for(app, &path)?;
        let payload = ServerlessRequest::wrap(&path, notification)?;
        self.invoker.invoke_one_way(&function, &payload).map_err(Self::convert)
    }
}
