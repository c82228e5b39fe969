// crates/app-relay-upstream/src/resolver.rs
// ============================================================================
// Module: Upstream Resolver
// Description: Deploy-type to transport selection for installed Apps.
// Purpose: Resolve exactly one upstream per App from its manifest.
// Dependencies: app-relay-core
// ============================================================================

//! ## Overview
//! Selection is a pure function of the App's deploy type, cross-checked
//! against the manifest's populated deploy section: exactly one section
//! must be populated and an upstream for it must be configured, or
//! dispatch fails with a configuration error. The resolver holds one
//! shared instance per deploy type; implementations are interchangeable at
//! every call site.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use app_relay_core::App;
use app_relay_core::DeployType;
use app_relay_core::Upstream;
use app_relay_core::UpstreamError;

use crate::http::HttpUpstream;
use crate::in_process::InProcessUpstream;
use crate::serverless::ServerlessUpstream;

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for an [`UpstreamResolver`].
///
/// # Invariants
/// - Unconfigured deploy types resolve to configuration errors, not panics.
#[derive(Default)]
pub struct UpstreamResolverBuilder {
    /// HTTP transport instance.
    http: Option<Arc<HttpUpstream>>,
    /// Serverless transport instance.
    serverless: Option<Arc<ServerlessUpstream>>,
    /// In-process transport instance.
    in_process: Option<Arc<InProcessUpstream>>,
}

impl UpstreamResolverBuilder {
    /// Registers the HTTP transport.
    #[must_use]
    pub fn http(mut self, upstream: HttpUpstream) -> Self {
        self.http = Some(Arc::new(upstream));
        self
    }

    /// Registers the serverless transport.
    #[must_use]
    pub fn serverless(mut self, upstream: ServerlessUpstream) -> Self {
        self.serverless = Some(Arc::new(upstream));
        self
    }

    /// Registers the in-process transport.
    #[must_use]
    pub fn in_process(mut self, upstream: Arc<InProcessUpstream>) -> Self {
        self.in_process = Some(upstream);
        self
    }

    /// Builds the resolver.
    #[must_use]
    pub fn build(self) -> UpstreamResolver {
        UpstreamResolver {
            http: self.http,
            serverless: self.serverless,
            in_process: self.in_process,
        }
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves the transport bound to an App for its lifetime.
pub struct UpstreamResolver {
    /// HTTP transport instance.
    http: Option<Arc<HttpUpstream>>,
    /// Serverless transport instance.
    serverless: Option<Arc<ServerlessUpstream>>,
    /// In-process transport instance.
    in_process: Option<Arc<InProcessUpstream>>,
}

impl UpstreamResolver {
    /// Returns a builder for the resolver.
    #[must_use]
    pub fn builder() -> UpstreamResolverBuilder {
        UpstreamResolverBuilder::default()
    }

    /// Resolves the upstream for an App.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Config`] when the manifest does not
    /// populate exactly one deploy section, the installed deploy type
    /// disagrees with the manifest, or no transport is configured for it.
    pub fn resolve(&self, app: &App) -> Result<Arc<dyn Upstream>, UpstreamError> {
        let Some(declared) = app.manifest.deploy.deploy_type() else {
            return Err(UpstreamError::Config(format!(
                "app {} must declare exactly one deploy type",
                app.app_id()
            )));
        };
        let selected = app.deploy_type.unwrap_or(declared);
        if selected != declared {
            return Err(UpstreamError::Config(format!(
                "app {} is installed as {selected} but its manifest declares {declared}",
                app.app_id()
            )));
        }
        match selected {
            DeployType::Http => self.http.clone().map(|up| up as Arc<dyn Upstream>),
            DeployType::Serverless => self.serverless.clone().map(|up| up as Arc<dyn Upstream>),
            DeployType::InProcess => self.in_process.clone().map(|up| up as Arc<dyn Upstream>),
        }
        .ok_or_else(|| {
            UpstreamError::Config(format!("no {selected} upstream is configured on this host"))
        })
    }
}
