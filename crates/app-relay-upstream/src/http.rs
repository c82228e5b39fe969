// crates/app-relay-upstream/src/http.rs
// ============================================================================
// Module: HTTP Upstream
// Description: Transport for externally hosted Apps reached over HTTP.
// Purpose: Sign, stream, and deliver Call and Notification envelopes.
// Dependencies: app-relay-core, reqwest, jsonwebtoken, url, time
// ============================================================================

//! ## Overview
//! The HTTP upstream POSTs JSON envelopes to the App's declared root URL.
//! Each outbound request carries a short-lived HS256 bearer token signed
//! with the App's shared secret, with the acting user's identifier as a
//! claim. Request bodies are streamed through a pipe rather than buffered.
//! Responses are bounded reads; a non-200 status is decoded as a
//! structured error payload when possible and never surfaces as a raw
//! transport exception to the Call flow.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::io::Write;
use std::thread;
use std::time::Duration;

use app_relay_core::App;
use app_relay_core::CallRequest;
use app_relay_core::CallResponse;
use app_relay_core::CallResponseType;
use app_relay_core::Notification;
use app_relay_core::Upstream;
use app_relay_core::UpstreamError;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use reqwest::StatusCode;
use reqwest::blocking::Body;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde::Serialize;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the signed bearer token on outbound requests.
pub const OUTGOING_AUTH_HEADER: &str = "X-App-Authorization";

/// Lifetime of the signed bearer token.
const TOKEN_LIFETIME: Duration = Duration::from_secs(15 * 60);

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP upstream.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` root URLs.
/// - `max_response_bytes` is a hard upper bound on response bodies.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUpstreamConfig {
    /// Allow cleartext HTTP root URLs (developer mode only).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpUpstreamConfig {
    fn default() -> Self {
        Self {
            allow_http: false,
            timeout_ms: 30_000,
            max_response_bytes: 1024 * 1024,
            user_agent: "app-relay/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Token Claims
// ============================================================================

/// Claims carried in the outbound bearer token.
#[derive(Debug, Serialize)]
struct OutgoingClaims {
    /// Expiry as a Unix timestamp.
    exp: i64,
    /// Acting user the request is made on behalf of.
    #[serde(skip_serializing_if = "String::is_empty")]
    acting_user_id: String,
}

/// Signs the outbound bearer token with the App's shared secret.
fn sign_token(acting_user_id: &str, secret: &str) -> Result<String, UpstreamError> {
    let lifetime = i64::try_from(TOKEN_LIFETIME.as_secs())
        .map_err(|_| UpstreamError::Config("token lifetime exceeds i64".to_string()))?;
    let claims = OutgoingClaims {
        exp: time::OffsetDateTime::now_utc().unix_timestamp() + lifetime,
        acting_user_id: acting_user_id.to_string(),
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| UpstreamError::Transport(format!("token signing failed: {err}")))
}

// ============================================================================
// SECTION: HTTP Upstream
// ============================================================================

/// Transport for Apps deployed behind an HTTP root URL.
///
/// # Invariants
/// - Redirects are not followed.
/// - Responses exceeding the configured size limit fail closed.
pub struct HttpUpstream {
    /// Upstream configuration, including limits and policy.
    config: HttpUpstreamConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpUpstream {
    /// Creates a new HTTP upstream with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the HTTP client cannot be created.
    pub fn new(config: HttpUpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| UpstreamError::Config("http client build failed".to_string()))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Resolves the App's root URL joined with a Call path.
    fn call_url(&self, app: &App, path: &str) -> Result<Url, UpstreamError> {
        let Some(http) = &app.manifest.deploy.http else {
            return Err(UpstreamError::Config(format!(
                "app {} has no http deploy section",
                app.app_id()
            )));
        };
        if !self.config.allow_http && http.root_url.starts_with("http://") {
            return Err(UpstreamError::Config(format!(
                "cleartext root URL for {} requires developer mode",
                app.app_id()
            )));
        }
        if !path.starts_with('/') {
            return Err(UpstreamError::Config(format!("call path {path} must start with '/'")));
        }
        let joined = format!("{}{path}", http.root_url.trim_end_matches('/'));
        Url::parse(&joined)
            .map_err(|err| UpstreamError::Config(format!("invalid call URL {joined}: {err}")))
    }

    /// POSTs a JSON envelope, streaming the body through a pipe.
    fn post_json<T>(
        &self,
        url: Url,
        acting_user_id: &str,
        secret: &str,
        envelope: &T,
    ) -> Result<Response, UpstreamError>
    where
        T: Serialize + Clone + Send + 'static,
    {
        let token = sign_token(acting_user_id, secret)?;
        let (reader, mut writer) = std::io::pipe()
            .map_err(|err| UpstreamError::Transport(format!("pipe creation failed: {err}")))?;
        let body_envelope = envelope.clone();
        // The writer side must run concurrently with the request, or a
        // body larger than the pipe buffer would deadlock.
        let writer_handle = thread::spawn(move || {
            let result = serde_json::to_writer(&mut writer, &body_envelope);
            let _ = writer.flush();
            drop(writer);
            result
        });
        let sent = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header(OUTGOING_AUTH_HEADER, format!("Bearer {token}"))
            .body(Body::new(reader))
            .send();
        let _ = writer_handle.join();
        sent.map_err(|err| UpstreamError::Transport(format!("http request failed: {err}")))
    }

    /// Reads the response body while enforcing the configured byte limit.
    fn read_limited(&self, response: Response) -> Result<Vec<u8>, UpstreamError> {
        let limit = u64::try_from(self.config.max_response_bytes)
            .map_err(|_| UpstreamError::Config("response size limit exceeds u64".to_string()))?;
        let mut buf = Vec::new();
        let mut handle = response.take(limit.saturating_add(1));
        handle
            .read_to_end(&mut buf)
            .map_err(|err| UpstreamError::Transport(format!("failed to read response: {err}")))?;
        if buf.len() > self.config.max_response_bytes {
            return Err(UpstreamError::Decode("http response exceeds size limit".to_string()));
        }
        Ok(buf)
    }

    /// Converts a non-200 Call response into the structured error form.
    fn decode_error_status(&self, response: Response) -> UpstreamError {
        let status = response.status();
        let body = match self.read_limited(response) {
            Ok(body) => body,
            Err(err) => return err,
        };
        // Apps are expected to return their error payloads as error-type
        // responses; fall back to the raw body text otherwise.
        if let Ok(decoded) = serde_json::from_slice::<CallResponse>(&body)
            && decoded.response_type == CallResponseType::Error
        {
            return UpstreamError::App(decoded.error_text);
        }
        let text = String::from_utf8_lossy(&body);
        let text = text.trim();
        if text.is_empty() {
            UpstreamError::Transport(format!("http status {status}"))
        } else {
            UpstreamError::App(text.to_string())
        }
    }
}

impl Upstream for HttpUpstream {
    fn invoke_call(&self, app: &App, request: &CallRequest) -> Result<CallResponse, UpstreamError> {
        let url = self.call_url(app, &request.call.path)?;
        let acting_user_id = request.context.acting_user_id.as_str().to_string();
        let response = self.post_json(url, &acting_user_id, &app.secret, request)?;
        let status = response.status();
        if status == StatusCode::OK {
            let body = self.read_limited(response)?;
            return serde_json::from_slice(&body)
                .map_err(|err| UpstreamError::Decode(format!("call response: {err}")));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound(request.call.path.clone()));
        }
        Err(self.decode_error_status(response))
    }

    fn notify(&self, app: &App, notification: &Notification) -> Result<(), UpstreamError> {
        let Some(subject) = notification.subject else {
            return Err(UpstreamError::Config("notification subject is required".to_string()));
        };
        let url = self.call_url(app, &format!("/notify/{subject}"))?;
        let bot_user_id = notification.context.expanded.bot_user_id.as_str().to_string();
        let response = self.post_json(url, &bot_user_id, &app.secret, notification)?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(self.decode_error_status(response))
    }
}
