// crates/app-relay-core/src/core/call.rs
// ============================================================================
// Module: App Relay Calls
// Description: Call descriptors and the request/response envelopes.
// Purpose: Define the exact JSON exchanged with Apps per invocation.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Call`] is a reusable request descriptor: a path, opaque state, and
//! an [`Expand`] directive. A [`CallRequest`] is what actually crosses the
//! wire: a Call flattened together with the request type, user-entered
//! values, and the execution [`Context`]. A [`CallResponse`] is the closed
//! result variant every invocation produces.
//!
//! Response expectations depend on the request type: `submit` accepts any
//! response type, `form` accepts only `form` or `error`, and `lookup`
//! accepts only `ok` (with selectable items in `data`) or `error`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::context::Context;
use crate::core::expand::Expand;

// ============================================================================
// SECTION: Default Calls
// ============================================================================

/// Path of the bindings Call every App must implement.
pub const DEFAULT_BINDINGS_PATH: &str = "/bindings";

/// Path of the reachability-probe Call.
pub const DEFAULT_PING_PATH: &str = "/ping";

/// Returns the default bindings Call template.
#[must_use]
pub fn default_bindings_call() -> Call {
    Call {
        path: DEFAULT_BINDINGS_PATH.to_string(),
        ..Call::default()
    }
}

/// Returns the default ping Call template, with nothing expanded.
#[must_use]
pub fn default_ping_call() -> Call {
    Call {
        path: DEFAULT_PING_PATH.to_string(),
        ..Call::default()
    }
}

// ============================================================================
// SECTION: Call
// ============================================================================

/// Reusable descriptor of one App function invocation.
///
/// # Invariants
/// - `path` is appended to the deploy root (HTTP) or prefix-matched against
///   the function table (serverless); it must start with `/` at dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Path of the Call within the App.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// Caller-opaque state echoed back to the App.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    /// Disclosure directive applied when expanding the Context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<Expand>,
}

impl Call {
    /// Creates a Call for the given path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Fills unset fields from a default template.
    ///
    /// Used to apply manifest overrides on top of the built-in defaults,
    /// for example the bindings Call.
    #[must_use]
    pub fn with_defaults(&self, default: &Self) -> Self {
        let mut merged = self.clone();
        if merged.path.is_empty() {
            merged.path.clone_from(&default.path);
        }
        if merged.expand.is_none() {
            merged.expand.clone_from(&default.expand);
        }
        if merged.state.is_none() {
            merged.state.clone_from(&default.state);
        }
        merged
    }
}

// ============================================================================
// SECTION: Call Type
// ============================================================================

/// What action a [`CallRequest`] asks the App to take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    /// Take the action; the default when absent.
    #[default]
    Submit,
    /// Return the form definition for the current values and context.
    Form,
    /// The form was dismissed with submit-on-cancel set.
    Cancel,
    /// Fetch selectable items for a dynamic select field.
    Lookup,
}

impl CallType {
    /// Returns the stable wire label for the call type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Form => "form",
            Self::Cancel => "cancel",
            Self::Lookup => "lookup",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Call Request
// ============================================================================

/// The envelope sent to an App for one invocation.
///
/// The originating [`Call`] is flattened into the top level of the JSON
/// object, so the wire shape is `{path, state, expand, type, values,
/// context, raw_command, selected_field, query}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    /// The Call that originated the request.
    #[serde(flatten)]
    pub call: Call,
    /// Action requested of the App.
    #[serde(rename = "type", default, skip_serializing_if = "is_submit")]
    pub call_type: CallType,
    /// Values entered by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Map<String, Value>>,
    /// Execution context, expanded per the Call's directive.
    #[serde(default)]
    pub context: Context,
    /// Raw command text when the request came from the command line.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_command: String,
    /// Field being refreshed or looked up, for form and lookup requests.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub selected_field: String,
    /// Query text the user has typed, for lookup requests.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub query: String,
}

impl CallRequest {
    /// Creates a request wrapping the given Call.
    #[must_use]
    pub fn new(call: Call) -> Self {
        Self {
            call,
            ..Self::default()
        }
    }

    /// Returns a user-entered string value, unwrapping select options.
    ///
    /// Select fields submit `{label, value}` objects; the inner `value`
    /// string is returned for those.
    #[must_use]
    pub fn string_value(&self, name: &str, default: &str) -> String {
        let Some(values) = &self.values else {
            return default.to_string();
        };
        match values.get(name) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Object(option)) => match option.get("value") {
                Some(Value::String(s)) => s.clone(),
                _ => default.to_string(),
            },
            _ => default.to_string(),
        }
    }

    /// Returns a user-entered boolean value, unwrapping select options.
    ///
    /// Accepts native booleans and the strings `"true"` / `"false"`.
    #[must_use]
    pub fn bool_value(&self, name: &str) -> bool {
        /// Interprets a single JSON value as a boolean when possible.
        fn as_bool(value: &Value) -> Option<bool> {
            match value {
                Value::Bool(b) => Some(*b),
                Value::String(s) => match s.as_str() {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                },
                _ => None,
            }
        }
        let Some(values) = &self.values else {
            return false;
        };
        match values.get(name) {
            Some(Value::Object(option)) => option.get("value").and_then(as_bool).unwrap_or(false),
            Some(value) => as_bool(value).unwrap_or(false),
            None => false,
        }
    }
}

/// Returns true when the call type is the default `submit`.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "serde skip predicates take references.")]
const fn is_submit(call_type: &CallType) -> bool {
    matches!(call_type, CallType::Submit)
}

// ============================================================================
// SECTION: Call Response
// ============================================================================

/// Discriminant of a [`CallResponse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallResponseType {
    /// Success; `markdown` and `data` may be populated.
    #[default]
    Ok,
    /// Failure; `error` text and optional field-level `data`.
    Error,
    /// A form to display; `form` is populated.
    Form,
    /// A follow-up Call for the caller to execute; reserved, not invoked
    /// by any upstream.
    Call,
    /// Forced client-side navigation; `navigate_to_url` is populated.
    Navigate,
}

impl CallResponseType {
    /// Returns the stable wire label for the response type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Form => "form",
            Self::Call => "call",
            Self::Navigate => "navigate",
        }
    }
}

impl fmt::Display for CallResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The envelope every App invocation returns.
///
/// # Invariants
/// - Exactly the payload fields relevant to `response_type` are populated.
/// - An absent wire `type` decodes as `ok`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallResponse {
    /// Result discriminant.
    #[serde(rename = "type", default)]
    pub response_type: CallResponseType,
    /// Displayable result text, for `ok` responses.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub markdown: String,
    /// Opaque result data, for `ok` responses; field-level errors for
    /// `error` responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Overall error text, for `error` responses.
    #[serde(rename = "error", default, skip_serializing_if = "String::is_empty")]
    pub error_text: String,
    /// Navigation target, for `navigate` responses.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub navigate_to_url: String,
    /// True when navigation should open an external browser.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub use_external_browser: bool,
    /// Follow-up Call, for `call` responses; reserved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<Call>,
    /// Form definition, for `form` responses. Opaque to the proxy; the
    /// form engine is the host's concern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<Value>,
}

impl CallResponse {
    /// Creates an empty `ok` response.
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    /// Creates an `ok` response with display text.
    #[must_use]
    pub fn text(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            ..Self::default()
        }
    }

    /// Creates an `ok` response with opaque data.
    #[must_use]
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Creates an `error` response from any displayable error.
    #[must_use]
    pub fn error(err: impl fmt::Display) -> Self {
        Self {
            response_type: CallResponseType::Error,
            error_text: err.to_string(),
            ..Self::default()
        }
    }

    /// Creates a `form` response.
    #[must_use]
    pub fn form(form: Value) -> Self {
        Self {
            response_type: CallResponseType::Form,
            form: Some(form),
            ..Self::default()
        }
    }

    /// Returns the error text when this is an `error` response.
    #[must_use]
    pub fn error_text(&self) -> &str {
        if self.response_type == CallResponseType::Error {
            &self.error_text
        } else {
            ""
        }
    }

    /// Returns true when this response type is valid for the request type.
    #[must_use]
    pub const fn permitted_for(&self, call_type: CallType) -> bool {
        match call_type {
            CallType::Submit | CallType::Cancel => true,
            CallType::Form => {
                matches!(self.response_type, CallResponseType::Form | CallResponseType::Error)
            }
            CallType::Lookup => {
                matches!(self.response_type, CallResponseType::Ok | CallResponseType::Error)
            }
        }
    }
}
