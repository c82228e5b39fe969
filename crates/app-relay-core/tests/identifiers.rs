// crates/app-relay-core/tests/identifiers.rs
// ============================================================================
// Module: Identifier Tests
// Description: Format and containment tests for App and location identifiers.
// Purpose: Pin the AppId format contract and the Location prefix relation.
// ============================================================================

//! ## Overview
//! Covers the [`AppId`] format rules (length bounds, character set) and the
//! string-prefix containment relation on [`Location`], including the join
//! and top-level helpers the binding aggregator depends on.

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

use app_relay_core::AppId;
use app_relay_core::Location;
use proptest::prelude::proptest;

// ============================================================================
// SECTION: AppId Format
// ============================================================================

#[test]
fn app_id_accepts_minimum_length() {
    assert!(AppId::new("abc").validate().is_ok());
}

#[test]
fn app_id_accepts_full_character_set() {
    assert!(AppId::new("My-App_2.0").validate().is_ok());
}

#[test]
fn app_id_accepts_maximum_length() {
    assert!(AppId::new("a".repeat(32)).validate().is_ok());
}

#[test]
fn app_id_rejects_too_short() {
    assert!(AppId::new("ab").validate().is_err());
}

#[test]
fn app_id_rejects_too_long() {
    assert!(AppId::new("a".repeat(33)).validate().is_err());
}

#[test]
fn app_id_rejects_path_characters() {
    assert!(AppId::new("../path").validate().is_err());
}

#[test]
fn app_id_rejects_spaces_and_unicode() {
    assert!(AppId::new("my app").validate().is_err());
    assert!(AppId::new("मेराऐप").validate().is_err());
}

// ============================================================================
// SECTION: Location Containment
// ============================================================================

#[test]
fn location_within_descendant_holds() {
    assert!(Location::new("/a/b").within(&Location::new("/a")));
}

#[test]
fn location_within_ancestor_does_not_hold() {
    assert!(!Location::new("/a").within(&Location::new("/a/b")));
}

#[test]
fn location_within_sibling_does_not_hold() {
    assert!(!Location::new("/b").within(&Location::new("/a")));
}

#[test]
fn location_within_self_holds() {
    assert!(Location::new("/command").within(&Location::new("/command")));
}

#[test]
fn location_join_appends_segment() {
    let parent = Location::new("/command");
    assert_eq!(parent.join(&Location::new("send")).as_str(), "/command/send");
}

#[test]
fn location_join_from_empty_keeps_child() {
    let root = Location::default();
    assert_eq!(root.join(&Location::new("/channel_header")).as_str(), "/channel_header");
}

#[test]
fn location_is_top_single_segment_only() {
    assert!(Location::new("/command").is_top());
    assert!(!Location::new("/command/send").is_top());
    assert!(!Location::default().is_top());
}

proptest! {
    /// Containment is exactly the string-prefix relation.
    #[test]
    fn location_within_matches_string_prefix(a in "[a-z/]{0,12}", b in "[a-z/]{0,12}") {
        let holds = Location::new(a.clone()).within(&Location::new(b.clone()));
        assert_eq!(holds, a.starts_with(&b));
    }

    /// Joining always yields a location within the non-empty parent.
    #[test]
    fn location_join_stays_within_parent(parent in "/[a-z]{1,8}", child in "[a-z]{1,8}") {
        let parent = Location::new(parent);
        let joined = parent.join(&Location::new(child));
        assert!(joined.within(&parent));
    }
}
