// crates/app-relay-core/src/core/binding.rs
// ============================================================================
// Module: App Relay Bindings
// Description: Nodes of the App-declared, host-rendered UI tree.
// Purpose: Represent leaf actions and containers attached to UI locations.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Apps attach functionality to the host UI by returning a tree of
//! [`Binding`] nodes from their bindings Call. A node is either a leaf
//! bound to a [`Call`] or a container of child bindings. The aggregator
//! stamps the owning App onto admitted non-top-level nodes; top-level
//! containers are shared UI surfaces and carry no App identifier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::call::Call;
use crate::core::identifiers::AppId;
use crate::core::identifiers::Location;

// ============================================================================
// SECTION: Binding
// ============================================================================

/// One node of an App's UI binding tree.
///
/// # Invariants
/// - A leaf carries `call`; a container carries `bindings`.
/// - `app_id` is stamped by the aggregator, never trusted from the App.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Owning App; set by the aggregator on admitted non-top-level nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<AppId>,
    /// Location of this node relative to its parent.
    #[serde(default, skip_serializing_if = "Location::is_empty")]
    pub location: Location,
    /// Icon URL or static asset path.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    /// Primary display text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    /// Secondary display text, for example a tooltip or hint line.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hint: String,
    /// Extended help text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Role required to see the node.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role_id: String,
    /// True when the node varies by team.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub depends_on_team: bool,
    /// True when the node varies by channel.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub depends_on_channel: bool,
    /// True when the node varies by user.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub depends_on_user: bool,
    /// True when the node varies by post.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub depends_on_post: bool,
    /// Call invoked when the node is activated; leaves only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<Call>,
    /// Child bindings; containers only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
}

impl Binding {
    /// Creates a container node at the given location.
    #[must_use]
    pub fn container(location: impl Into<Location>, bindings: Vec<Self>) -> Self {
        Self {
            location: location.into(),
            bindings,
            ..Self::default()
        }
    }

    /// Creates a leaf node at the given location bound to a Call.
    #[must_use]
    pub fn leaf(location: impl Into<Location>, label: impl Into<String>, call: Call) -> Self {
        Self {
            location: location.into(),
            label: label.into(),
            call: Some(call),
            ..Self::default()
        }
    }
}
