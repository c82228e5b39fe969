// crates/app-relay-core/src/core/context.rs
// ============================================================================
// Module: App Relay Context
// Description: Per-invocation identifier bundle and expanded data overlay.
// Purpose: Carry IDs with every Call and disclose expanded data selectively.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Context`] rides with every Call and Notification. The scalar
//! identifier fields describe where the request originated; the flattened
//! [`ExpandedContext`] overlay carries whatever entity data and privileged
//! tokens the expander disclosed for this one invocation. Contexts are
//! built fresh per request and never persisted.
//!
//! Several identifier fields exist for the proxy's own use and are cleared
//! before the Context is handed to an App; see
//! [`Context::strip_server_only_ids`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::entities::AppInfo;
use crate::core::entities::Channel;
use crate::core::entities::Post;
use crate::core::entities::Team;
use crate::core::entities::User;
use crate::core::identifiers::AppId;
use crate::core::identifiers::ChannelId;
use crate::core::identifiers::Location;
use crate::core::identifiers::PostId;
use crate::core::identifiers::TeamId;
use crate::core::identifiers::UserId;
use crate::core::subscription::Subject;

// ============================================================================
// SECTION: Context
// ============================================================================

/// Identifier bundle accompanying every Call and Notification.
///
/// # Invariants
/// - Constructed fresh per invocation; never persisted.
/// - `app_id` is pinned by the proxy before dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// App the request is routed to.
    #[serde(default, skip_serializing_if = "AppId::is_empty")]
    pub app_id: AppId,
    /// Fully qualified UI location the request originated from.
    #[serde(default, skip_serializing_if = "Location::is_empty")]
    pub location: Location,
    /// User agent that performed the action, when user-originated.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_agent: String,
    /// Lifecycle subject, when the request came from a subscription.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    /// User who performed the action; not sent down to Apps.
    #[serde(default, skip_serializing_if = "UserId::is_empty")]
    pub acting_user_id: UserId,
    /// Subject user of the request; not sent down to Apps.
    #[serde(default, skip_serializing_if = "UserId::is_empty")]
    pub user_id: UserId,
    /// Channel the request relates to; not sent down to Apps.
    #[serde(default, skip_serializing_if = "ChannelId::is_empty")]
    pub channel_id: ChannelId,
    /// Team the request relates to; not sent down to Apps.
    #[serde(default, skip_serializing_if = "TeamId::is_empty")]
    pub team_id: TeamId,
    /// Post the request relates to; not sent down to Apps.
    #[serde(default, skip_serializing_if = "PostId::is_empty")]
    pub post_id: PostId,
    /// Thread root post; not sent down to Apps.
    #[serde(default, skip_serializing_if = "PostId::is_empty")]
    pub root_post_id: PostId,
    /// Expanded data overlay, flattened into the same JSON object.
    #[serde(flatten)]
    pub expanded: ExpandedContext,
}

impl Context {
    /// Clears the identifier fields that must not reach Apps.
    ///
    /// The expander discloses entity data according to the Expand
    /// directive; the raw IDs those disclosures were derived from are
    /// server-side routing data and are cleared here.
    pub fn strip_server_only_ids(&mut self) {
        self.acting_user_id = UserId::default();
        self.user_id = UserId::default();
        self.channel_id = ChannelId::default();
        self.team_id = TeamId::default();
        self.post_id = PostId::default();
        self.root_post_id = PostId::default();
    }
}

// ============================================================================
// SECTION: Expanded Context
// ============================================================================

/// Privilege-gated data overlay populated by the expander.
///
/// # Invariants
/// - Entity fields are `None` unless the Expand directive requested them.
/// - Token fields are empty unless both requested and permitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpandedContext {
    /// Host site URL for REST access.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub site_url: String,
    /// Proxy path prefix for this App, appendable to the site URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_path: String,
    /// True when the host runs in developer mode.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub developer_mode: bool,
    /// Bot account user identifier of the App.
    #[serde(default, skip_serializing_if = "UserId::is_empty")]
    pub bot_user_id: UserId,
    /// Bot access token; present when the App holds `act_as_bot`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bot_access_token: String,
    /// Acting-user access token; requested via Expand and gated on
    /// `act_as_user`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub acting_user_access_token: String,
    /// Admin access token; requested via Expand and gated on
    /// `act_as_admin`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub admin_access_token: String,
    /// Sanitized installed-App record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppInfo>,
    /// Acting user entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acting_user: Option<User>,
    /// Subject user entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Channel entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    /// Team entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    /// Post entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
    /// Thread root post entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_post: Option<Post>,
}
