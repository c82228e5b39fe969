// crates/app-relay-core/tests/subscription_scope.rs
// ============================================================================
// Module: Subscription Scope Tests
// Description: Write-time validation of subject-dependent scope shapes.
// Purpose: Pin the scope matrix enforced before any subscription persists.
// ============================================================================

//! ## Overview
//! Every subject class has a required scope shape: global subjects forbid
//! both identifiers, channel-scoped subjects require a channel and forbid a
//! team, team-scoped subjects require a team and forbid a channel. Any
//! other combination is rejected at subscribe time, never partially
//! applied.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use app_relay_core::Call;
use app_relay_core::ChannelId;
use app_relay_core::Subject;
use app_relay_core::Subscription;
use app_relay_core::TeamId;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Builds a subscription for the subject with the given scope pair.
fn sub(subject: Subject, team_id: &str, channel_id: &str) -> Subscription {
    Subscription {
        app_id: "someapp".into(),
        subject: Some(subject),
        team_id: TeamId::new(team_id),
        channel_id: ChannelId::new(channel_id),
        call: Some(Call::new("/event")),
    }
}

// ============================================================================
// SECTION: Scope Matrix
// ============================================================================

#[test]
fn global_subjects_require_empty_scope() {
    for subject in [
        Subject::UserCreated,
        Subject::BotJoinedChannel,
        Subject::BotLeftChannel,
        Subject::BotJoinedTeam,
        Subject::BotLeftTeam,
    ] {
        assert!(sub(subject, "", "").validate().is_ok(), "{subject} with empty scope");
        assert!(sub(subject, "t1", "").validate().is_err(), "{subject} with team");
        assert!(sub(subject, "", "c1").validate().is_err(), "{subject} with channel");
    }
}

#[test]
fn channel_subjects_require_channel_only() {
    for subject in [Subject::UserJoinedChannel, Subject::UserLeftChannel, Subject::PostCreated] {
        assert!(sub(subject, "", "c1").validate().is_ok(), "{subject} with channel");
        assert!(sub(subject, "", "").validate().is_err(), "{subject} without channel");
        assert!(sub(subject, "t1", "c1").validate().is_err(), "{subject} with team set");
    }
}

#[test]
fn team_subjects_require_team_only() {
    for subject in [Subject::UserJoinedTeam, Subject::UserLeftTeam, Subject::ChannelCreated] {
        assert!(sub(subject, "t1", "").validate().is_ok(), "{subject} with team");
        assert!(sub(subject, "", "").validate().is_err(), "{subject} without team");
        assert!(sub(subject, "t1", "c1").validate().is_err(), "{subject} with channel set");
    }
}

// ============================================================================
// SECTION: Other Write-Time Rules
// ============================================================================

#[test]
fn subscription_requires_subject() {
    let mut s = sub(Subject::ChannelCreated, "t1", "");
    s.subject = None;
    assert!(s.validate().is_err());
}

#[test]
fn subscription_requires_call_with_path() {
    let mut s = sub(Subject::ChannelCreated, "t1", "");
    s.call = None;
    assert!(s.validate().is_err());
    s.call = Some(Call::default());
    assert!(s.validate().is_err());
}

#[test]
fn subscription_requires_valid_app_id() {
    let mut s = sub(Subject::ChannelCreated, "t1", "");
    s.app_id = "ab".into();
    assert!(s.validate().is_err());
}

#[test]
fn scope_key_carries_subject_and_scope() {
    let s = sub(Subject::UserJoinedChannel, "", "c1");
    let key = s.scope_key().unwrap();
    assert_eq!(key.subject, Subject::UserJoinedChannel);
    assert_eq!(key.channel_id.as_str(), "c1");
    assert!(key.team_id.is_empty());
}
