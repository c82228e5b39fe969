// crates/app-relay-proxy/tests/common/mod.rs
// ============================================================================
// Module: Proxy Test Fixtures
// Description: Fake host boundaries and service wiring for proxy tests.
// Purpose: Build a ProxyService over in-process Apps with counting fakes.
// ============================================================================

//! ## Overview
//! Shared fixtures: a counting fake host data source, a deterministic
//! token issuer, and builders for installed in-process Apps and a wired
//! [`ProxyService`]. Tests register handler closures per App path and
//! drive the proxy end to end with no network.

#![allow(
    dead_code,
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Shared test fixtures; not every test uses every helper."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use app_relay_core::App;
use app_relay_core::Channel;
use app_relay_core::ChannelId;
use app_relay_core::Deploy;
use app_relay_core::DeployType;
use app_relay_core::HostDataSource;
use app_relay_core::HostFetchError;
use app_relay_core::InProcessDeploy;
use app_relay_core::Location;
use app_relay_core::Locations;
use app_relay_core::Manifest;
use app_relay_core::Permission;
use app_relay_core::Permissions;
use app_relay_core::Post;
use app_relay_core::PostId;
use app_relay_core::Team;
use app_relay_core::TeamId;
use app_relay_core::TokenError;
use app_relay_core::TokenIssuer;
use app_relay_core::User;
use app_relay_core::UserId;
use app_relay_proxy::MemoryAppStore;
use app_relay_proxy::MemorySubscriptionStore;
use app_relay_proxy::ProxyObserver;
use app_relay_proxy::ProxyService;
use app_relay_proxy::SiteConfig;
use app_relay_upstream::InProcessUpstream;
use app_relay_upstream::UpstreamResolver;

// ============================================================================
// SECTION: Fake Host Data Source
// ============================================================================

/// Counting fake over fixed host entities.
#[derive(Default)]
pub struct FakeHost {
    /// Users keyed by identifier.
    pub users: BTreeMap<String, User>,
    /// Channels keyed by identifier.
    pub channels: BTreeMap<String, Channel>,
    /// Teams keyed by identifier.
    pub teams: BTreeMap<String, Team>,
    /// Posts keyed by identifier.
    pub posts: BTreeMap<String, Post>,
    /// Fetch counts keyed by entity kind and identifier.
    pub fetches: Mutex<BTreeMap<String, usize>>,
}

impl FakeHost {
    /// Creates an empty fake host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one fetch of the given entity.
    fn count(&self, kind: &str, id: &str) {
        let mut fetches = self.fetches.lock().unwrap();
        *fetches.entry(format!("{kind}:{id}")).or_insert(0) += 1;
    }

    /// Returns how often the given entity was fetched.
    pub fn fetch_count(&self, kind: &str, id: &str) -> usize {
        *self.fetches.lock().unwrap().get(&format!("{kind}:{id}")).unwrap_or(&0)
    }
}

impl HostDataSource for FakeHost {
    fn get_user(&self, id: &UserId) -> Result<User, HostFetchError> {
        self.count("user", id.as_str());
        self.users
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| HostFetchError::NotFound(id.to_string()))
    }

    fn get_channel(&self, id: &ChannelId) -> Result<Channel, HostFetchError> {
        self.count("channel", id.as_str());
        self.channels
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| HostFetchError::NotFound(id.to_string()))
    }

    fn get_team(&self, id: &TeamId) -> Result<Team, HostFetchError> {
        self.count("team", id.as_str());
        self.teams
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| HostFetchError::NotFound(id.to_string()))
    }

    fn get_post(&self, id: &PostId) -> Result<Post, HostFetchError> {
        self.count("post", id.as_str());
        self.posts
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| HostFetchError::NotFound(id.to_string()))
    }
}

/// Builds a fake host pre-populated with one of each entity.
pub fn populated_host() -> FakeHost {
    let mut host = FakeHost::new();
    host.users.insert(
        "user-1".to_string(),
        User {
            id: "user-1".into(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            position: "engineer".to_string(),
            auth_data: Some("saml-id".to_string()),
            ..User::default()
        },
    );
    host.channels.insert(
        "chan-1".to_string(),
        Channel {
            id: "chan-1".into(),
            team_id: "team-1".into(),
            name: "town-square".to_string(),
            display_name: "Town Square".to_string(),
            channel_type: "O".to_string(),
            purpose: "general chatter".to_string(),
            ..Channel::default()
        },
    );
    host.teams.insert(
        "team-1".to_string(),
        Team {
            id: "team-1".into(),
            name: "main".to_string(),
            display_name: "Main Team".to_string(),
            invite_id: "invite-secret".to_string(),
            ..Team::default()
        },
    );
    host.posts.insert(
        "post-1".to_string(),
        Post {
            id: "post-1".into(),
            channel_id: "chan-1".into(),
            user_id: "user-1".into(),
            message: "hello there".to_string(),
            props: Some(serde_json::json!({"from_webhook": true})),
            ..Post::default()
        },
    );
    host
}

// ============================================================================
// SECTION: Fake Token Issuer
// ============================================================================

/// Deterministic token issuer stamping the principal into the token.
#[derive(Default)]
pub struct FakeTokens;

impl TokenIssuer for FakeTokens {
    fn bot_token(&self, app: &App) -> Result<String, TokenError> {
        Ok(format!("bot-token-{}", app.app_id()))
    }

    fn acting_user_token(&self, app: &App, user_id: &UserId) -> Result<String, TokenError> {
        Ok(format!("user-token-{}-{user_id}", app.app_id()))
    }

    fn admin_token(&self, app: &App) -> Result<String, TokenError> {
        Ok(format!("admin-token-{}", app.app_id()))
    }
}

// ============================================================================
// SECTION: App and Service Builders
// ============================================================================

/// Builds an installed in-process App with the given grants.
pub fn in_process_app(
    app_id: &str,
    locations: &[&str],
    permissions: &[Permission],
) -> App {
    App {
        manifest: Manifest {
            app_id: app_id.into(),
            version: "v1".into(),
            homepage_url: format!("https://example.com/{app_id}"),
            requested_permissions: Permissions::new(permissions.to_vec()),
            requested_locations: Locations::new(
                locations.iter().map(|l| Location::new(*l)).collect::<Vec<_>>(),
            ),
            deploy: Deploy {
                in_process: Some(InProcessDeploy {
                    handler_id: app_id.to_string(),
                }),
                ..Deploy::default()
            },
            ..Manifest::default()
        },
        deploy_type: Some(DeployType::InProcess),
        bot_user_id: format!("bot-{app_id}").into(),
        bot_username: format!("{app_id}-bot"),
        granted_permissions: Permissions::new(permissions.to_vec()),
        granted_locations: Locations::new(
            locations.iter().map(|l| Location::new(*l)).collect::<Vec<_>>(),
        ),
        ..App::default()
    }
}

/// Everything a wired test fixture exposes.
pub struct Fixture {
    /// The wired proxy service.
    pub service: ProxyService,
    /// The in-process handler registry behind the resolver.
    pub upstream: Arc<InProcessUpstream>,
    /// The App store backing the service.
    pub apps: Arc<MemoryAppStore>,
    /// The fake host behind the expander.
    pub host: Arc<FakeHost>,
}

/// Wires a proxy service over in-process transport and memory stores.
pub fn fixture_with(host: FakeHost, observer: Option<Arc<dyn ProxyObserver>>) -> Fixture {
    let upstream = Arc::new(InProcessUpstream::new());
    let apps = Arc::new(MemoryAppStore::new());
    let host = Arc::new(host);
    let mut builder = ProxyService::builder()
        .apps(Arc::clone(&apps) as Arc<dyn app_relay_core::AppStore>)
        .subscriptions(Arc::new(MemorySubscriptionStore::new()))
        .host(Arc::clone(&host) as Arc<dyn HostDataSource>)
        .tokens(Arc::new(FakeTokens))
        .resolver(UpstreamResolver::builder().in_process(Arc::clone(&upstream)).build())
        .site(SiteConfig {
            site_url: "https://host.example.com".to_string(),
            app_path_prefix: "/plugins/apps".to_string(),
            developer_mode: false,
        });
    if let Some(observer) = observer {
        builder = builder.observer(observer);
    }
    Fixture {
        service: builder.build().unwrap(),
        upstream,
        apps,
        host,
    }
}

/// Wires the default fixture over a populated host.
pub fn fixture() -> Fixture {
    fixture_with(populated_host(), None)
}
