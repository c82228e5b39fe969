// crates/app-relay-core/src/core/manifest.rs
// ============================================================================
// Module: App Relay Manifest
// Description: App-authored declaration of identity, deploys, and grants.
// Purpose: Validate manifests and expose the single populated deploy type.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Manifest`] is authored by the App developer and is immutable once
//! fetched; it is re-fetched only on version change. It declares exactly
//! one deploy type, the permissions and top-level locations the App
//! requests, and the lifecycle hook Calls the host may invoke. Validation
//! aggregates every problem found rather than stopping at the first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::call::Call;
use crate::core::errors::RelayError;
use crate::core::identifiers::AppId;
use crate::core::identifiers::AppVersion;
use crate::core::permissions::Locations;
use crate::core::permissions::Permissions;

// ============================================================================
// SECTION: Deploy Type
// ============================================================================

/// How an App is deployed and reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployType {
    /// Externally hosted; reached over HTTP with signed requests.
    Http,
    /// Deployed as serverless functions; reached through a function invoker.
    Serverless,
    /// Bundled with the host; reached by direct function call.
    InProcess,
}

impl DeployType {
    /// Returns the stable wire label for the deploy type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Serverless => "serverless",
            Self::InProcess => "in_process",
        }
    }
}

impl std::fmt::Display for DeployType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Deploy Metadata
// ============================================================================

/// HTTP deploy metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpDeploy {
    /// Base URL that Call paths are appended to.
    pub root_url: String,
}

/// One path-prefix to function-name route of a serverless deploy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRoute {
    /// Call path prefix handled by the function.
    pub path: String,
    /// Deployed function name.
    pub name: String,
}

/// Serverless deploy metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerlessDeploy {
    /// Path-prefix routing table, in declaration order.
    pub functions: Vec<FunctionRoute>,
    /// Optional bucket holding the App's static assets.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub static_bucket: String,
}

/// In-process deploy metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InProcessDeploy {
    /// Identifier of the registered in-process handler set.
    pub handler_id: String,
}

/// Deployment section of a manifest; exactly one field may be populated.
///
/// # Invariants
/// - `deploy_type` is `Some` iff exactly one section is populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deploy {
    /// HTTP deploy metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpDeploy>,
    /// Serverless deploy metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serverless: Option<ServerlessDeploy>,
    /// In-process deploy metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_process: Option<InProcessDeploy>,
}

impl Deploy {
    /// Returns the deploy type when exactly one section is populated.
    #[must_use]
    pub const fn deploy_type(&self) -> Option<DeployType> {
        match (&self.http, &self.serverless, &self.in_process) {
            (Some(_), None, None) => Some(DeployType::Http),
            (None, Some(_), None) => Some(DeployType::Serverless),
            (None, None, Some(_)) => Some(DeployType::InProcess),
            _ => None,
        }
    }

    /// Returns true when the section for the given type is populated.
    #[must_use]
    pub const fn contains(&self, deploy_type: DeployType) -> bool {
        match deploy_type {
            DeployType::Http => self.http.is_some(),
            DeployType::Serverless => self.serverless.is_some(),
            DeployType::InProcess => self.in_process.is_some(),
        }
    }

    /// Validates the deploy section.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when zero or multiple sections are
    /// populated, or when the populated section is itself malformed.
    pub fn validate(&self) -> Result<(), RelayError> {
        let Some(deploy_type) = self.deploy_type() else {
            return Err(RelayError::Invalid(
                "manifest must declare exactly one deploy type (http, serverless, in_process)"
                    .to_string(),
            ));
        };
        match deploy_type {
            DeployType::Http => {
                let http = self.http.as_ref().ok_or_else(missing_section)?;
                if http.root_url.is_empty() {
                    return Err(RelayError::Invalid("http deploy root_url is empty".to_string()));
                }
                if !http.root_url.starts_with("http://") && !http.root_url.starts_with("https://") {
                    return Err(RelayError::Invalid(format!(
                        "http deploy root_url {} must be an http(s) URL",
                        http.root_url
                    )));
                }
            }
            DeployType::Serverless => {
                let serverless = self.serverless.as_ref().ok_or_else(missing_section)?;
                if serverless.functions.is_empty() {
                    return Err(RelayError::Invalid(
                        "serverless deploy declares no functions".to_string(),
                    ));
                }
                for route in &serverless.functions {
                    if route.path.is_empty() || route.name.is_empty() {
                        return Err(RelayError::Invalid(
                            "serverless function route requires both path and name".to_string(),
                        ));
                    }
                }
            }
            DeployType::InProcess => {
                let in_process = self.in_process.as_ref().ok_or_else(missing_section)?;
                if in_process.handler_id.is_empty() {
                    return Err(RelayError::Invalid(
                        "in_process deploy handler_id is empty".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Builds the internal inconsistency error for a vanished deploy section.
fn missing_section() -> RelayError {
    RelayError::Invalid("deploy section vanished during validation".to_string())
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// App-authored declaration of identity, deploys, hooks, and requested access.
///
/// # Invariants
/// - Immutable once fetched; replaced wholesale on version change.
/// - Exactly one deploy section is populated once validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// App identifier.
    pub app_id: AppId,
    /// App version label.
    pub version: AppVersion,
    /// Human-readable App name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    /// Short App description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// App homepage URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub homepage_url: String,
    /// Override for the bindings Call; defaults to the `/bindings` path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings: Option<Call>,
    /// Hook invoked after the App is installed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_install: Option<Call>,
    /// Hook invoked before the App is uninstalled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_uninstall: Option<Call>,
    /// Hook invoked when the App is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_enable: Option<Call>,
    /// Hook invoked when the App is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_disable: Option<Call>,
    /// Permissions the App asks for at install time.
    #[serde(default)]
    pub requested_permissions: Permissions,
    /// Top-level locations the App asks to bind to.
    #[serde(default)]
    pub requested_locations: Locations,
    /// Deployment section.
    #[serde(default)]
    pub deploy: Deploy,
}

impl Manifest {
    /// Validates the manifest, aggregating every problem found.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] listing each failed check.
    pub fn validate(&self) -> Result<(), RelayError> {
        let mut problems = Vec::new();
        for result in [
            self.app_id.validate(),
            self.version.validate(),
            self.requested_permissions.validate(),
            self.requested_locations.validate(),
            self.deploy.validate(),
        ] {
            if let Err(err) = result {
                problems.push(err.to_string());
            }
        }
        if self.homepage_url.is_empty() {
            problems.push("homepage_url is empty".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(RelayError::Invalid(problems.join("; ")))
        }
    }
}
