// crates/app-relay-core/src/core/expand.rs
// ============================================================================
// Module: App Relay Expand Directive
// Description: Per-entity disclosure levels and privileged token requests.
// Purpose: Control how much Context data an App receives per invocation.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`Expand`] clause rides inside a [`crate::Call`] or a
//! [`crate::Subscription`] and selects, per entity type, how much data the
//! expanded Context discloses. Absent or empty levels are equivalent to
//! `none`. Privileged token fields accept only `all` (or empty) and are
//! additionally gated by the App's granted permissions at expansion time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Expand Level
// ============================================================================

/// Disclosure level requested for one Context entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpandLevel {
    /// Level left unspecified; treated as [`ExpandLevel::None`].
    #[default]
    #[serde(rename = "")]
    Default,
    /// Entity omitted entirely, even if fetched for another field.
    #[serde(rename = "none")]
    None,
    /// Fixed allowlist of non-sensitive display fields.
    #[serde(rename = "summary")]
    Summary,
    /// Full entity, minus universally redacted secrets.
    #[serde(rename = "all")]
    All,
}

impl ExpandLevel {
    /// Returns the stable wire label for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::None => "none",
            Self::Summary => "summary",
            Self::All => "all",
        }
    }

    /// Returns true when the level is unspecified.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Returns true when the level requests no disclosure.
    ///
    /// Unspecified levels count as `none`.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::Default | Self::None)
    }
}

impl fmt::Display for ExpandLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Expand Directive
// ============================================================================

/// Requested disclosure levels for one Call or Notification.
///
/// # Invariants
/// - Token levels other than `all` or empty are rejected at expansion time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expand {
    /// Level for the sanitized installed-App record.
    #[serde(default, skip_serializing_if = "ExpandLevel::is_default")]
    pub app: ExpandLevel,
    /// Level for the acting user entity.
    #[serde(default, skip_serializing_if = "ExpandLevel::is_default")]
    pub acting_user: ExpandLevel,
    /// Level for the subject user entity.
    #[serde(default, skip_serializing_if = "ExpandLevel::is_default")]
    pub user: ExpandLevel,
    /// Level for the channel entity.
    #[serde(default, skip_serializing_if = "ExpandLevel::is_default")]
    pub channel: ExpandLevel,
    /// Level for the team entity.
    #[serde(default, skip_serializing_if = "ExpandLevel::is_default")]
    pub team: ExpandLevel,
    /// Level for the post entity.
    #[serde(default, skip_serializing_if = "ExpandLevel::is_default")]
    pub post: ExpandLevel,
    /// Level for the thread root post entity.
    #[serde(default, skip_serializing_if = "ExpandLevel::is_default")]
    pub root_post: ExpandLevel,
    /// Request for the acting-user access token; `all` or empty only.
    #[serde(default, skip_serializing_if = "ExpandLevel::is_default")]
    pub acting_user_access_token: ExpandLevel,
    /// Request for the admin access token; `all` or empty only.
    #[serde(default, skip_serializing_if = "ExpandLevel::is_default")]
    pub admin_access_token: ExpandLevel,
}
