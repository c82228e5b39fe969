// crates/app-relay-core/src/core/entities.rs
// ============================================================================
// Module: App Relay Host Entities
// Description: Boundary snapshots of host platform entities.
// Purpose: Carry user, channel, team, and post data into expanded Contexts.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! These types are the proxy's projection of the host platform's data
//! model, which itself is out of scope. Each entity supports two shaped
//! disclosures: `summarize` produces the fixed allowlist of non-sensitive
//! display fields used at expand level `summary`, and `sanitize` strips the
//! fields that are never disclosed even at level `all`. The allowlists are
//! versioned with this crate and are not caller-configurable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::AppId;
use crate::core::identifiers::AppVersion;
use crate::core::identifiers::ChannelId;
use crate::core::identifiers::PostId;
use crate::core::identifiers::TeamId;
use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: User
// ============================================================================

/// Snapshot of a host user account.
///
/// # Invariants
/// - `auth_data` never survives `sanitize` or `summarize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Login name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    /// Display nickname.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub nickname: String,
    /// First name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    /// Last name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    /// Email address.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// Space-separated role names.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub roles: String,
    /// Preferred locale.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub locale: String,
    /// Job position or title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub position: String,
    /// True when the account is a bot.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_bot: bool,
    /// Bot account description, when the account is a bot.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bot_description: String,
    /// Deletion timestamp in epoch milliseconds; zero when active.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub delete_at: i64,
    /// External authentication data; never disclosed to Apps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_data: Option<String>,
}

impl User {
    /// Returns the summary-level projection of the user.
    #[must_use]
    pub fn summarize(&self) -> Self {
        Self {
            id: self.id.clone(),
            username: self.username.clone(),
            nickname: self.nickname.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
            locale: self.locale.clone(),
            is_bot: self.is_bot,
            bot_description: self.bot_description.clone(),
            delete_at: self.delete_at,
            ..Self::default()
        }
    }

    /// Returns the full projection with non-disclosable fields stripped.
    #[must_use]
    pub fn sanitize(&self) -> Self {
        Self {
            auth_data: None,
            ..self.clone()
        }
    }
}

// ============================================================================
// SECTION: Channel
// ============================================================================

/// Snapshot of a host channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel identifier.
    pub id: ChannelId,
    /// Owning team identifier.
    #[serde(default, skip_serializing_if = "TeamId::is_empty")]
    pub team_id: TeamId,
    /// URL-safe channel name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Human-readable channel name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    /// Channel type label (open, private, direct, group).
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub channel_type: String,
    /// Channel purpose text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub purpose: String,
    /// Channel header text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub header: String,
    /// Deletion timestamp in epoch milliseconds; zero when active.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub delete_at: i64,
}

impl Channel {
    /// Returns the summary-level projection of the channel.
    #[must_use]
    pub fn summarize(&self) -> Self {
        Self {
            id: self.id.clone(),
            team_id: self.team_id.clone(),
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            channel_type: self.channel_type.clone(),
            delete_at: self.delete_at,
            ..Self::default()
        }
    }

    /// Returns the full projection; channels carry no redacted fields.
    #[must_use]
    pub fn sanitize(&self) -> Self {
        self.clone()
    }
}

// ============================================================================
// SECTION: Team
// ============================================================================

/// Snapshot of a host team.
///
/// # Invariants
/// - `invite_id` never survives `sanitize` or `summarize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team identifier.
    pub id: TeamId,
    /// URL-safe team name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Human-readable team name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    /// Team description text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Contact email.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// Team type label (open or invite-only).
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub team_type: String,
    /// Comma-separated email domains allowed to join.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub allowed_domains: String,
    /// Invite token; never disclosed to Apps.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub invite_id: String,
}

impl Team {
    /// Returns the summary-level projection of the team.
    #[must_use]
    pub fn summarize(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            email: self.email.clone(),
            team_type: self.team_type.clone(),
            ..Self::default()
        }
    }

    /// Returns the full projection with non-disclosable fields stripped.
    #[must_use]
    pub fn sanitize(&self) -> Self {
        Self {
            invite_id: String::new(),
            ..self.clone()
        }
    }
}

// ============================================================================
// SECTION: Post
// ============================================================================

/// Snapshot of a host post.
///
/// # Invariants
/// - `props` never survives `sanitize` or `summarize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post identifier.
    pub id: PostId,
    /// Channel the post was made in.
    #[serde(default, skip_serializing_if = "ChannelId::is_empty")]
    pub channel_id: ChannelId,
    /// Thread root post, when the post is a reply.
    #[serde(default, skip_serializing_if = "PostId::is_empty")]
    pub root_id: PostId,
    /// Author user identifier.
    #[serde(default, skip_serializing_if = "UserId::is_empty")]
    pub user_id: UserId,
    /// Message text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Post type label; empty for regular posts.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub post_type: String,
    /// Arbitrary post properties; never disclosed to Apps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
}

impl Post {
    /// Returns the summary-level projection of the post.
    #[must_use]
    pub fn summarize(&self) -> Self {
        Self {
            id: self.id.clone(),
            channel_id: self.channel_id.clone(),
            root_id: self.root_id.clone(),
            user_id: self.user_id.clone(),
            message: self.message.clone(),
            post_type: self.post_type.clone(),
            ..Self::default()
        }
    }

    /// Returns the full projection with non-disclosable fields stripped.
    #[must_use]
    pub fn sanitize(&self) -> Self {
        Self {
            props: None,
            ..self.clone()
        }
    }
}

// ============================================================================
// SECTION: App Info
// ============================================================================

/// Always-redacted projection of an installed App record.
///
/// # Invariants
/// - Never carries secrets, client credentials, or tokens, at any level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    /// App identifier.
    pub app_id: AppId,
    /// Installed version.
    #[serde(default, skip_serializing_if = "AppVersion::is_empty")]
    pub version: AppVersion,
    /// Bot account user identifier.
    #[serde(default, skip_serializing_if = "UserId::is_empty")]
    pub bot_user_id: UserId,
    /// Bot account username.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bot_username: String,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when a millisecond timestamp is zero.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "serde skip predicates take references.")]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}
