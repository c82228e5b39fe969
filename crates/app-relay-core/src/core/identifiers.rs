// crates/app-relay-core/src/core/identifiers.rs
// ============================================================================
// Module: App Relay Identifiers
// Description: Canonical opaque identifiers for Apps and host entities.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! This module defines the identifiers used throughout App Relay. Host
//! entity identifiers are opaque strings assigned by the host platform and
//! serialize transparently. [`AppId`] is the one identifier with a format
//! contract, since it is embedded into URLs, storage keys, and function
//! names: 3 to 32 bytes of ASCII letters, digits, `-`, `_`, or `.`.
//! [`Location`] strings form a `/`-separated hierarchy with prefix-based
//! containment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::errors::RelayError;

// ============================================================================
// SECTION: App Identifier
// ============================================================================

/// Minimum length of an [`AppId`] in bytes.
pub const MIN_APP_ID_LENGTH: usize = 3;

/// Maximum length of an [`AppId`] in bytes.
pub const MAX_APP_ID_LENGTH: usize = 32;

/// Globally unique identifier of an installed App.
///
/// # Invariants
/// - 3 to 32 bytes once validated.
/// - ASCII letters, digits, `-`, `_`, and `.` only once validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Creates an App identifier without validating it.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the identifier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validates the identifier format.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when the identifier is shorter than
    /// [`MIN_APP_ID_LENGTH`], longer than [`MAX_APP_ID_LENGTH`], or contains
    /// a character outside ASCII letters, digits, `-`, `_`, and `.`.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.0.len() < MIN_APP_ID_LENGTH {
            return Err(RelayError::Invalid(format!(
                "app id {} too short, must be at least {MIN_APP_ID_LENGTH} characters",
                self.0
            )));
        }
        if self.0.len() > MAX_APP_ID_LENGTH {
            return Err(RelayError::Invalid(format!(
                "app id {} too long, must be at most {MAX_APP_ID_LENGTH} characters",
                self.0
            )));
        }
        for c in self.0.chars() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                continue;
            }
            return Err(RelayError::Invalid(format!(
                "invalid character {c} in app id {}",
                self.0
            )));
        }
        Ok(())
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AppId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AppId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: App Version
// ============================================================================

/// Version label of an App, assigned by the App author.
///
/// # Invariants
/// - Opaque UTF-8 string; bounded length enforced by `validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppVersion(String);

/// Maximum length of an [`AppVersion`] in bytes.
pub const MAX_APP_VERSION_LENGTH: usize = 32;

impl AppVersion {
    /// Creates a version label.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Returns the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the version label is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validates the version label length.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when the label is empty or longer
    /// than [`MAX_APP_VERSION_LENGTH`].
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.0.is_empty() {
            return Err(RelayError::Invalid("app version is empty".to_string()));
        }
        if self.0.len() > MAX_APP_VERSION_LENGTH {
            return Err(RelayError::Invalid(format!(
                "app version {} too long, must be at most {MAX_APP_VERSION_LENGTH} characters",
                self.0
            )));
        }
        Ok(())
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AppVersion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Host Entity Identifiers
// ============================================================================

/// Declares an opaque, transparent string identifier assigned by the host.
macro_rules! host_identifier {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        ///
        /// # Invariants
        /// - Opaque UTF-8 string; no normalization or validation is applied.
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true when the identifier is empty.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

host_identifier!(
    /// Identifier of a host user account.
    UserId
);
host_identifier!(
    /// Identifier of a host channel.
    ChannelId
);
host_identifier!(
    /// Identifier of a host team.
    TeamId
);
host_identifier!(
    /// Identifier of a host post.
    PostId
);

// ============================================================================
// SECTION: Location
// ============================================================================

/// Position in the host UI hierarchy, for example `/command/app/send`.
///
/// # Invariants
/// - Containment is a plain string-prefix relation; no segment parsing is
///   performed beyond `/` joins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    /// Creates a location from its string form.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Returns the location as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the location is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Joins a child location under this one.
    ///
    /// An empty parent yields the child unchanged, so top-level nodes keep
    /// their declared absolute form.
    #[must_use]
    pub fn join(&self, child: &Self) -> Self {
        if self.0.is_empty() {
            return child.clone();
        }
        Self(format!("{}/{}", self.0, child.0))
    }

    /// Returns true when this location names a top-level UI surface.
    ///
    /// A top-level location has a single segment, for example `/command`.
    #[must_use]
    pub fn is_top(&self) -> bool {
        !self.0.is_empty() && !self.0.trim_start_matches('/').contains('/')
    }

    /// Returns true when this location falls within `other`.
    ///
    /// Containment is string-prefix based: `/a/b` is within `/a`, while
    /// `/a` is not within `/a/b`.
    #[must_use]
    pub fn within(&self, other: &Self) -> bool {
        self.0.starts_with(other.0.as_str())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
