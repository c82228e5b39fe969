// crates/app-relay-core/src/core/permissions.rs
// ============================================================================
// Module: App Relay Permissions
// Description: Act-as-principal permissions and granted location sets.
// Purpose: Gate privileged token disclosure and UI binding locations.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Apps request permissions and top-level locations in their manifest; the
//! granted subsets are stored on the installed [`crate::App`] record. The
//! three act-as-principal permissions each gate one privileged token in the
//! expanded Context. Granted locations bound where an App's bindings may
//! attach in the host UI.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::errors::RelayError;
use crate::core::identifiers::Location;

// ============================================================================
// SECTION: Permission
// ============================================================================

/// An act-as-principal permission grantable to an App.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Act through the App's bot account; gates the bot access token.
    ActAsBot,
    /// Act as the acting user; gates the acting-user access token.
    ActAsUser,
    /// Act with administrative rights; gates the admin access token.
    ActAsAdmin,
}

impl Permission {
    /// Returns the stable wire label for the permission.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActAsBot => "act_as_bot",
            Self::ActAsUser => "act_as_user",
            Self::ActAsAdmin => "act_as_admin",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Permission List
// ============================================================================

/// Ordered list of permissions requested by or granted to an App.
///
/// # Invariants
/// - Free of duplicates once validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(Vec<Permission>);

impl Permissions {
    /// Creates a permission list.
    #[must_use]
    pub fn new(permissions: impl Into<Vec<Permission>>) -> Self {
        Self(permissions.into())
    }

    /// Returns true when the list contains the permission.
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Returns true when every entry also appears in `other`.
    #[must_use]
    pub fn subset_of(&self, other: &Self) -> bool {
        self.0.iter().all(|p| other.contains(*p))
    }

    /// Returns the entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Permission] {
        &self.0
    }

    /// Validates the list.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when a permission appears twice.
    pub fn validate(&self) -> Result<(), RelayError> {
        for (i, p) in self.0.iter().enumerate() {
            if self.0[..i].contains(p) {
                return Err(RelayError::Invalid(format!("duplicate permission: {p}")));
            }
        }
        Ok(())
    }
}

impl From<Vec<Permission>> for Permissions {
    fn from(value: Vec<Permission>) -> Self {
        Self(value)
    }
}

// ============================================================================
// SECTION: Location List
// ============================================================================

/// Ordered list of top-level locations requested by or granted to an App.
///
/// # Invariants
/// - Every entry is absolute (starts with `/`) once validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locations(Vec<Location>);

impl Locations {
    /// Creates a location list.
    #[must_use]
    pub fn new(locations: impl Into<Vec<Location>>) -> Self {
        Self(locations.into())
    }

    /// Returns the entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Location] {
        &self.0
    }

    /// Returns true when every entry also appears in `other`.
    #[must_use]
    pub fn subset_of(&self, other: &Self) -> bool {
        self.0.iter().all(|l| other.0.contains(l))
    }

    /// Validates the list.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when an entry is empty or relative.
    pub fn validate(&self) -> Result<(), RelayError> {
        for location in &self.0 {
            if !location.as_str().starts_with('/') {
                return Err(RelayError::Invalid(format!(
                    "granted location {location} must be absolute"
                )));
            }
        }
        Ok(())
    }
}

impl From<Vec<Location>> for Locations {
    fn from(value: Vec<Location>) -> Self {
        Self(value)
    }
}
