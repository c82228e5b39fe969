// crates/app-relay-proxy/src/expand.rs
// ============================================================================
// Module: Context Expander
// Description: Permission-scoped, memoized expansion of Call Contexts.
// Purpose: Disclose exactly what the Expand directive requests and the
//          App's grants permit.
// Dependencies: app-relay-core
// ============================================================================

//! ## Overview
//! An [`Expander`] is a call-scoped object wrapping one base Context. It
//! fetches each referenced entity at most once, memoizing the result so
//! repeated expansions of the same base are fetch-for-fetch identical,
//! then projects per the requested level: `all` yields the sanitized full
//! entity, `summary` the fixed allowlist, and `none` (or absent) leaves
//! the field empty even when the entity was fetched for another field.
//!
//! Privileged tokens are populated only when the directive requests them
//! at level `all` AND the App holds the matching act-as permission; a
//! missing grant leaves the field silently empty, so Apps cannot
//! distinguish "not requested" from "not permitted". Entity fetch
//! failures abort the enclosing Call or Notification.
//!
//! One instance serves one request; instances are never shared or reused
//! across requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use app_relay_core::App;
use app_relay_core::AppInfo;
use app_relay_core::Channel;
use app_relay_core::Context;
use app_relay_core::Expand;
use app_relay_core::ExpandLevel;
use app_relay_core::ExpandedContext;
use app_relay_core::HostDataSource;
use app_relay_core::Permission;
use app_relay_core::Post;
use app_relay_core::RelayError;
use app_relay_core::Team;
use app_relay_core::TokenIssuer;
use app_relay_core::User;

use crate::service::SiteConfig;

// ============================================================================
// SECTION: Expander
// ============================================================================

/// Call-scoped Context expander with per-entity memoization.
///
/// # Invariants
/// - One instance per Call or Notification; never shared concurrently.
/// - Each referenced entity is fetched at most once per instance.
pub struct Expander<'a> {
    /// App the expansion is scoped to.
    app: &'a App,
    /// Host entity boundary.
    host: &'a dyn HostDataSource,
    /// Privileged token boundary.
    tokens: &'a dyn TokenIssuer,
    /// Process-wide site configuration snapshot.
    site: &'a SiteConfig,
    /// Base Context the expansion starts from.
    base: Context,
    /// Memoized acting user entity.
    acting_user: Option<User>,
    /// Memoized subject user entity.
    user: Option<User>,
    /// Memoized channel entity.
    channel: Option<Channel>,
    /// Memoized team entity.
    team: Option<Team>,
    /// Memoized post entity.
    post: Option<Post>,
    /// Memoized thread root post entity.
    root_post: Option<Post>,
}

impl<'a> Expander<'a> {
    /// Creates an expander over one base Context.
    #[must_use]
    pub fn new(
        app: &'a App,
        host: &'a dyn HostDataSource,
        tokens: &'a dyn TokenIssuer,
        site: &'a SiteConfig,
        base: Context,
    ) -> Self {
        Self {
            app,
            host,
            tokens,
            site,
            base,
            acting_user: None,
            user: None,
            channel: None,
            team: None,
            post: None,
            root_post: None,
        }
    }

    /// Expands the base Context per the directive.
    ///
    /// Returns a clean Context ready to hand to the App: the App
    /// identifier pinned, baseline site and bot data seeded, requested
    /// entities projected, and server-only identifiers stripped.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Expansion`] when a requested entity cannot
    /// be fetched, including privileged token issue failures for granted
    /// permissions.
    pub fn expand(&mut self, directive: Option<&Expand>) -> Result<Context, RelayError> {
        let default_directive = Expand::default();
        let directive = directive.unwrap_or(&default_directive);

        let mut expanded = ExpandedContext {
            site_url: self.site.site_url.clone(),
            app_path: self.site.app_path(self.app.app_id()),
            developer_mode: self.site.developer_mode,
            bot_user_id: self.app.bot_user_id.clone(),
            ..ExpandedContext::default()
        };

        // The bot token is baseline context for any App granted act_as_bot.
        if self.app.granted_permissions.contains(Permission::ActAsBot)
            && !self.app.bot_user_id.is_empty()
        {
            expanded.bot_access_token = self
                .tokens
                .bot_token(self.app)
                .map_err(|err| RelayError::Expansion(format!("bot token: {err}")))?;
        }

        if !directive.app.is_none() {
            expanded.app = Some(AppInfo {
                app_id: self.app.app_id().clone(),
                version: self.app.manifest.version.clone(),
                bot_user_id: self.app.bot_user_id.clone(),
                bot_username: self.app.bot_username.clone(),
            });
        }

        expanded.acting_user = self.project_user(directive.acting_user, UserField::Acting)?;
        expanded.user = self.project_user(directive.user, UserField::Subject)?;
        expanded.channel = self.project_channel(directive.channel)?;
        expanded.team = self.project_team(directive.team)?;
        expanded.post = self.project_post(directive.post, PostField::Post)?;
        expanded.root_post = self.project_post(directive.root_post, PostField::Root)?;

        expanded.acting_user_access_token =
            self.acting_user_token(directive.acting_user_access_token)?;
        expanded.admin_access_token = self.admin_token(directive.admin_access_token)?;

        let mut context = self.base.clone();
        context.app_id = self.app.app_id().clone();
        context.expanded = expanded;
        context.strip_server_only_ids();
        Ok(context)
    }

    /// Projects a user entity at the requested level.
    fn project_user(
        &mut self,
        level: ExpandLevel,
        field: UserField,
    ) -> Result<Option<User>, RelayError> {
        if level.is_none() {
            return Ok(None);
        }
        let id = match field {
            UserField::Acting => self.base.acting_user_id.clone(),
            UserField::Subject => self.base.user_id.clone(),
        };
        if id.is_empty() {
            return Ok(None);
        }
        let memo = match field {
            UserField::Acting => &mut self.acting_user,
            UserField::Subject => &mut self.user,
        };
        if memo.is_none() {
            let fetched = self
                .host
                .get_user(&id)
                .map_err(|err| RelayError::Expansion(format!("user {id}: {err}")))?;
            *memo = Some(fetched);
        }
        let user = memo.as_ref().map_or_else(User::default, Clone::clone);
        Ok(Some(project(level, &user, User::summarize, User::sanitize)))
    }

    /// Projects the channel entity at the requested level.
    fn project_channel(&mut self, level: ExpandLevel) -> Result<Option<Channel>, RelayError> {
        if level.is_none() || self.base.channel_id.is_empty() {
            return Ok(None);
        }
        if self.channel.is_none() {
            let id = self.base.channel_id.clone();
            let fetched = self
                .host
                .get_channel(&id)
                .map_err(|err| RelayError::Expansion(format!("channel {id}: {err}")))?;
            self.channel = Some(fetched);
        }
        let channel = self.channel.as_ref().map_or_else(Channel::default, Clone::clone);
        Ok(Some(project(level, &channel, Channel::summarize, Channel::sanitize)))
    }

    /// Projects the team entity at the requested level.
    fn project_team(&mut self, level: ExpandLevel) -> Result<Option<Team>, RelayError> {
        if level.is_none() || self.base.team_id.is_empty() {
            return Ok(None);
        }
        if self.team.is_none() {
            let id = self.base.team_id.clone();
            let fetched = self
                .host
                .get_team(&id)
                .map_err(|err| RelayError::Expansion(format!("team {id}: {err}")))?;
            self.team = Some(fetched);
        }
        let team = self.team.as_ref().map_or_else(Team::default, Clone::clone);
        Ok(Some(project(level, &team, Team::summarize, Team::sanitize)))
    }

    /// Projects a post entity at the requested level.
    fn project_post(
        &mut self,
        level: ExpandLevel,
        field: PostField,
    ) -> Result<Option<Post>, RelayError> {
        if level.is_none() {
            return Ok(None);
        }
        let id = match field {
            PostField::Post => self.base.post_id.clone(),
            PostField::Root => self.base.root_post_id.clone(),
        };
        if id.is_empty() {
            return Ok(None);
        }
        let memo = match field {
            PostField::Post => &mut self.post,
            PostField::Root => &mut self.root_post,
        };
        if memo.is_none() {
            let fetched = self
                .host
                .get_post(&id)
                .map_err(|err| RelayError::Expansion(format!("post {id}: {err}")))?;
            *memo = Some(fetched);
        }
        let post = memo.as_ref().map_or_else(Post::default, Clone::clone);
        Ok(Some(project(level, &post, Post::summarize, Post::sanitize)))
    }

    /// Issues the acting-user token when requested and permitted.
    ///
    /// A missing grant leaves the token empty without error, so the App
    /// receives no signal distinguishing "not requested" from "not
    /// permitted".
    fn acting_user_token(&self, level: ExpandLevel) -> Result<String, RelayError> {
        if level != ExpandLevel::All
            || !self.app.granted_permissions.contains(Permission::ActAsUser)
            || self.base.acting_user_id.is_empty()
        {
            return Ok(String::new());
        }
        self.tokens
            .acting_user_token(self.app, &self.base.acting_user_id)
            .map_err(|err| RelayError::Expansion(format!("acting user token: {err}")))
    }

    /// Issues the admin token when requested and permitted.
    fn admin_token(&self, level: ExpandLevel) -> Result<String, RelayError> {
        if level != ExpandLevel::All
            || !self.app.granted_permissions.contains(Permission::ActAsAdmin)
        {
            return Ok(String::new());
        }
        self.tokens
            .admin_token(self.app)
            .map_err(|err| RelayError::Expansion(format!("admin token: {err}")))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Which user field of the base Context is being projected.
#[derive(Debug, Clone, Copy)]
enum UserField {
    /// The acting user.
    Acting,
    /// The subject user.
    Subject,
}

/// Which post field of the base Context is being projected.
#[derive(Debug, Clone, Copy)]
enum PostField {
    /// The post itself.
    Post,
    /// The thread root post.
    Root,
}

/// Applies the level projection to a fetched entity.
fn project<T>(
    level: ExpandLevel,
    entity: &T,
    summarize: impl Fn(&T) -> T,
    sanitize: impl Fn(&T) -> T,
) -> T {
    match level {
        ExpandLevel::Summary => summarize(entity),
        // `is_none` levels never reach projection.
        _ => sanitize(entity),
    }
}
