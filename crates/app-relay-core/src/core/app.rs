// crates/app-relay-core/src/core/app.rs
// ============================================================================
// Module: App Relay Installed App Record
// Description: Per-installation state of an App.
// Purpose: Bind a manifest to granted access, identities, and secrets.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`App`] is the installed record of an extension: its immutable
//! [`Manifest`], the deploy type it was installed as, the granted subsets
//! of its requested permissions and locations, its bot identity, and its
//! deploy-specific secrets. Exactly one record exists per App identifier.
//! Records are read-mostly and updated wholesale by the (out-of-scope)
//! lifecycle layer; `disabled` soft-disables without erasing state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::errors::RelayError;
use crate::core::identifiers::AppId;
use crate::core::identifiers::UserId;
use crate::core::manifest::DeployType;
use crate::core::manifest::Manifest;
use crate::core::permissions::Locations;
use crate::core::permissions::Permissions;

// ============================================================================
// SECTION: App
// ============================================================================

/// Installed record of one App.
///
/// # Invariants
/// - Granted permissions and locations are subsets of the manifest's
///   requested sets once validated.
/// - `deploy_type` names a deploy section the manifest populates.
/// - `secret` and the OAuth2 client credentials never appear in any
///   Context disclosed to Apps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct App {
    /// Manifest the App was installed with.
    pub manifest: Manifest,
    /// Deploy type selected at install time.
    pub deploy_type: Option<DeployType>,
    /// True when the App is soft-disabled.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    /// Shared secret used to sign outbound HTTP requests.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,
    /// OAuth2 client identifier provisioned for the App.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth2_client_id: String,
    /// OAuth2 client secret provisioned for the App.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth2_client_secret: String,
    /// Bot account user identifier.
    #[serde(default, skip_serializing_if = "UserId::is_empty")]
    pub bot_user_id: UserId,
    /// Bot account username.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bot_username: String,
    /// Permissions granted at install time.
    #[serde(default)]
    pub granted_permissions: Permissions,
    /// Top-level locations granted at install time.
    #[serde(default)]
    pub granted_locations: Locations,
}

impl App {
    /// Returns the App identifier from the manifest.
    #[must_use]
    pub const fn app_id(&self) -> &AppId {
        &self.manifest.app_id
    }

    /// Returns true when the App may be dispatched to.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Validates the installed record.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when the manifest is invalid, the
    /// granted sets exceed the requested sets, or the deploy type is not
    /// declared by the manifest.
    pub fn validate(&self) -> Result<(), RelayError> {
        self.manifest.validate()?;
        if !self.granted_permissions.subset_of(&self.manifest.requested_permissions) {
            return Err(RelayError::Invalid(format!(
                "granted permissions for {} exceed the manifest's requested permissions",
                self.manifest.app_id
            )));
        }
        if !self.granted_locations.subset_of(&self.manifest.requested_locations) {
            return Err(RelayError::Invalid(format!(
                "granted locations for {} exceed the manifest's requested locations",
                self.manifest.app_id
            )));
        }
        let Some(deploy_type) = self.deploy_type else {
            return Err(RelayError::Invalid(format!(
                "app {} has no deploy type selected",
                self.manifest.app_id
            )));
        };
        if !self.manifest.deploy.contains(deploy_type) {
            return Err(RelayError::Invalid(format!(
                "app {} deploy type {deploy_type} is not declared by its manifest",
                self.manifest.app_id
            )));
        }
        Ok(())
    }
}
