// crates/app-relay-core/src/core/subscription.rs
// ============================================================================
// Module: App Relay Subscriptions
// Description: Lifecycle subjects, durable subscriptions, and notifications.
// Purpose: Validate subscription scopes and shape event fan-out inputs.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Subscription`] registers an App's interest in a lifecycle
//! [`Subject`] within a scope. The scope shape is subject-dependent and is
//! enforced when the subscription is written: global subjects forbid both
//! scope IDs, channel-scoped subjects require a channel and forbid a team,
//! and team-scoped subjects require a team and forbid a channel. An
//! [`Event`] is what a host lifecycle hook reports; a [`Notification`] is
//! the one-way envelope delivered to each matching subscriber.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::call::Call;
use crate::core::context::Context;
use crate::core::errors::RelayError;
use crate::core::identifiers::AppId;
use crate::core::identifiers::ChannelId;
use crate::core::identifiers::PostId;
use crate::core::identifiers::TeamId;
use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: Subject
// ============================================================================

/// Kind of lifecycle event a subscription reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// A user account was created. Global scope.
    UserCreated,
    /// The App's bot joined a channel. Global scope.
    BotJoinedChannel,
    /// The App's bot left a channel. Global scope.
    BotLeftChannel,
    /// The App's bot joined a team. Global scope.
    BotJoinedTeam,
    /// The App's bot left a team. Global scope.
    BotLeftTeam,
    /// A user joined the subscribed channel. Channel scope.
    UserJoinedChannel,
    /// A user left the subscribed channel. Channel scope.
    UserLeftChannel,
    /// A post was made in the subscribed channel. Channel scope.
    PostCreated,
    /// A user joined the subscribed team. Team scope.
    UserJoinedTeam,
    /// A user left the subscribed team. Team scope.
    UserLeftTeam,
    /// A channel was created in the subscribed team. Team scope.
    ChannelCreated,
}

/// Scope shape a subject requires of its subscriptions and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectScope {
    /// Neither team nor channel may be set.
    Global,
    /// Channel required; team must be empty.
    Channel,
    /// Team required; channel must be empty.
    Team,
}

impl Subject {
    /// Returns the stable wire label for the subject.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserCreated => "user_created",
            Self::BotJoinedChannel => "bot_joined_channel",
            Self::BotLeftChannel => "bot_left_channel",
            Self::BotJoinedTeam => "bot_joined_team",
            Self::BotLeftTeam => "bot_left_team",
            Self::UserJoinedChannel => "user_joined_channel",
            Self::UserLeftChannel => "user_left_channel",
            Self::PostCreated => "post_created",
            Self::UserJoinedTeam => "user_joined_team",
            Self::UserLeftTeam => "user_left_team",
            Self::ChannelCreated => "channel_created",
        }
    }

    /// Returns the scope shape this subject requires.
    #[must_use]
    pub const fn scope(self) -> SubjectScope {
        match self {
            Self::UserCreated
            | Self::BotJoinedChannel
            | Self::BotLeftChannel
            | Self::BotJoinedTeam
            | Self::BotLeftTeam => SubjectScope::Global,
            Self::UserJoinedChannel | Self::UserLeftChannel | Self::PostCreated => {
                SubjectScope::Channel
            }
            Self::UserJoinedTeam | Self::UserLeftTeam | Self::ChannelCreated => SubjectScope::Team,
        }
    }

    /// Validates a (team, channel) scope pair against this subject.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when the pair does not match the
    /// subject's required scope shape.
    pub fn validate_scope(self, team_id: &TeamId, channel_id: &ChannelId) -> Result<(), RelayError> {
        match self.scope() {
            SubjectScope::Global => {
                if !team_id.is_empty() || !channel_id.is_empty() {
                    return Err(RelayError::Invalid(format!(
                        "{self} is scoped globally; team_id and channel_id must both be empty"
                    )));
                }
            }
            SubjectScope::Channel => {
                if channel_id.is_empty() {
                    return Err(RelayError::Invalid(format!(
                        "{self} is scoped to a channel; channel_id must not be empty"
                    )));
                }
                if !team_id.is_empty() {
                    return Err(RelayError::Invalid(format!(
                        "{self} is scoped to a channel; team_id must be empty"
                    )));
                }
            }
            SubjectScope::Team => {
                if team_id.is_empty() {
                    return Err(RelayError::Invalid(format!(
                        "{self} is scoped to a team; team_id must not be empty"
                    )));
                }
                if !channel_id.is_empty() {
                    return Err(RelayError::Invalid(format!(
                        "{self} is scoped to a team; channel_id must be empty"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Scope Key
// ============================================================================

/// Storage key of a subscription: subject plus scope identifiers.
///
/// # Invariants
/// - Matches the subject's required scope shape once validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey {
    /// Subscribed subject.
    pub subject: Subject,
    /// Team scope; empty unless the subject is team-scoped.
    pub team_id: TeamId,
    /// Channel scope; empty unless the subject is channel-scoped.
    pub channel_id: ChannelId,
}

// ============================================================================
// SECTION: Subscription
// ============================================================================

/// Durable registration of an App's interest in a lifecycle subject.
///
/// # Invariants
/// - The scope pair matches the subject's shape once validated.
/// - `call` names the path invoked on each matching event; its `expand`
///   directive controls per-notification disclosure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscribing App.
    pub app_id: AppId,
    /// Subscribed subject.
    pub subject: Option<Subject>,
    /// Channel scope, for channel-scoped subjects.
    #[serde(default, skip_serializing_if = "ChannelId::is_empty")]
    pub channel_id: ChannelId,
    /// Team scope, for team-scoped subjects.
    #[serde(default, skip_serializing_if = "TeamId::is_empty")]
    pub team_id: TeamId,
    /// Call invoked one-way on each matching event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<Call>,
}

impl Subscription {
    /// Validates the subscription before persistence.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when the App identifier is
    /// malformed, the subject is missing, the scope pair does not match
    /// the subject, or the Call is absent or pathless.
    pub fn validate(&self) -> Result<(), RelayError> {
        self.app_id.validate()?;
        let Some(subject) = self.subject else {
            return Err(RelayError::Invalid("subscription subject is required".to_string()));
        };
        subject.validate_scope(&self.team_id, &self.channel_id)?;
        match &self.call {
            Some(call) if !call.path.is_empty() => Ok(()),
            _ => Err(RelayError::Invalid("subscription call with a path is required".to_string())),
        }
    }

    /// Returns the storage key of this subscription.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] when the subject is missing.
    pub fn scope_key(&self) -> Result<ScopeKey, RelayError> {
        let Some(subject) = self.subject else {
            return Err(RelayError::Invalid("subscription subject is required".to_string()));
        };
        Ok(ScopeKey {
            subject,
            team_id: self.team_id.clone(),
            channel_id: self.channel_id.clone(),
        })
    }
}

// ============================================================================
// SECTION: Event
// ============================================================================

/// What a host lifecycle hook reports when an event fires.
///
/// # Invariants
/// - The scope pair selects which subscriptions match.
/// - Identifier fields seed the per-subscription Context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    /// Subject of the event.
    pub subject: Option<Subject>,
    /// Team scope of the event, when team-scoped.
    pub team_id: TeamId,
    /// Channel scope of the event, when channel-scoped.
    pub channel_id: ChannelId,
    /// User who caused the event.
    pub acting_user_id: UserId,
    /// Subject user of the event.
    pub user_id: UserId,
    /// Post the event relates to.
    pub post_id: PostId,
    /// Thread root post the event relates to.
    pub root_post_id: PostId,
}

impl Event {
    /// Returns the base Context seeded from this event's identifiers.
    #[must_use]
    pub fn base_context(&self) -> Context {
        Context {
            subject: self.subject,
            acting_user_id: self.acting_user_id.clone(),
            user_id: self.user_id.clone(),
            channel_id: self.channel_id.clone(),
            team_id: self.team_id.clone(),
            post_id: self.post_id.clone(),
            root_post_id: self.root_post_id.clone(),
            ..Context::default()
        }
    }
}

// ============================================================================
// SECTION: Notification
// ============================================================================

/// One-way envelope delivered to a subscriber on a matching event.
///
/// Posted to the App's `/notify/<subject>` path; no response body is
/// expected beyond a success status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Subject that fired.
    pub subject: Option<Subject>,
    /// Expanded context for this subscriber.
    #[serde(default)]
    pub context: Context,
}
