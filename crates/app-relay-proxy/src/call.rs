// crates/app-relay-proxy/src/call.rs
// ============================================================================
// Module: Call Dispatcher
// Description: Resolution, expansion, and invocation of inbound Calls.
// Purpose: Route a CallRequest to its App and normalize the result.
// Dependencies: app-relay-core, app-relay-upstream
// ============================================================================

//! ## Overview
//! Dispatch resolves the App named by the request Context, resolves its
//! upstream, expands a fresh Context per the Call's own directive, and
//! invokes the App. The caller always receives a well-formed
//! [`CallResponse`]: resolution, expansion, and transport failures are
//! converted into `error`-type responses at this boundary, and an absent
//! response type normalizes to `ok`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use app_relay_core::App;
use app_relay_core::CallRequest;
use app_relay_core::CallResponse;
use app_relay_core::RelayError;
use app_relay_core::UpstreamError;
use app_relay_core::default_ping_call;

use crate::expand::Expander;
use crate::service::ProxyService;

// ============================================================================
// SECTION: Path Cleaning
// ============================================================================

/// Normalizes a Call path before dispatch.
///
/// The path must be absolute; duplicate slashes collapse and dot segments
/// are rejected rather than resolved, since an App-controlled `..` must
/// never escape the App's own route space.
///
/// # Errors
///
/// Returns [`RelayError::Invalid`] for empty, relative, or dot-segment
/// paths.
pub fn clean_path(path: &str) -> Result<String, RelayError> {
    if path.is_empty() {
        return Err(RelayError::Invalid("call path is empty".to_string()));
    }
    if !path.starts_with('/') {
        return Err(RelayError::Invalid(format!("call path {path} must start with '/'")));
    }
    let mut cleaned = String::with_capacity(path.len());
    for segment in path.split('/') {
        if segment.is_empty() {
            continue;
        }
        if segment == "." || segment == ".." {
            return Err(RelayError::Invalid(format!("call path {path} contains a dot segment")));
        }
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() {
        cleaned.push('/');
    }
    Ok(cleaned)
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

impl ProxyService {
    /// Dispatches an inbound CallRequest to its App.
    ///
    /// Every failure mode returns an `error`-type response; the caller
    /// never observes a transport exception.
    #[must_use]
    pub fn dispatch(&self, request: &CallRequest) -> CallResponse {
        if request.context.app_id.is_empty() {
            return CallResponse::error(
                "app_id is not set in the request context; no App to call",
            );
        }
        let app = match self.enabled_app(&request.context.app_id) {
            Ok(app) => app,
            Err(err) => return CallResponse::error(err),
        };
        match self.call_app(&app, request) {
            Ok(response) => response,
            Err(err) => CallResponse::error(err),
        }
    }

    /// Probes whether an App is reachable.
    ///
    /// Invokes the ping Call with nothing expanded; an App that answers,
    /// even with "no such path", is reachable.
    #[must_use]
    pub fn ping(&self, app: &App) -> bool {
        let request = CallRequest::new(default_ping_call());
        match self.call_app(app, &request) {
            Ok(_) => true,
            Err(RelayError::Transport(UpstreamError::NotFound(_))) => true,
            Err(_) => false,
        }
    }

    /// Resolves, expands, and invokes one Call against a resolved App.
    fn call_app(&self, app: &App, request: &CallRequest) -> Result<CallResponse, RelayError> {
        let path = clean_path(&request.call.path)?;

        let upstream = self.resolver.resolve(app).map_err(RelayError::Transport)?;

        let mut expander = Expander::new(
            app,
            self.host.as_ref(),
            self.tokens.as_ref(),
            &self.site,
            request.context.clone(),
        );
        let context = expander.expand(request.call.expand.as_ref())?;

        let mut outbound = request.clone();
        outbound.call.path = path;
        outbound.context = context;

        // Apps may omit the type on success; an absent type already
        // decodes as ok, and the response passes through otherwise
        // unchanged.
        upstream.invoke_call(app, &outbound).map_err(RelayError::Transport)
    }
}
