//! The plugin contract driven by the host authentication middleware
//!
//! A strategy is invoked in three externally-scheduled phases: the request
//! phase produces a redirect location, the callback phase turns the provider
//! redirect into request-scoped session state, and cleanup clears that state
//! once the host has consumed the accessors. The strategy never schedules
//! anything itself.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::{AuthFailure, Result};
use crate::types::{Credentials, UserInfo};

/// Inputs the host middleware hands a strategy for one request
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    query: HashMap<String, String>,
    options: RequestOptions,
}

impl AuthRequest {
    /// Create a request from its query parameters and framework-managed
    /// options.
    #[must_use]
    pub fn new(query: HashMap<String, String>, options: RequestOptions) -> Self {
        Self { query, options }
    }

    /// Query parameter by name, if present
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Framework-managed per-request options
    #[must_use]
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }
}

/// Per-request options managed by the host framework
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Absolute callback URL for this deployment, used as `redirect_uri`
    pub callback_url: Option<String>,

    /// Per-request client id, when the host varies credentials per request
    pub client_id: Option<String>,

    /// Per-request client secret
    pub client_secret: Option<String>,
}

/// Provider-specific authentication plugin.
///
/// The host drives the three phases in order and only calls the accessors
/// after a successful callback, before cleanup. Accessors are pure reads of
/// the session; they synthesize their output on every call.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Request-scoped transient state produced by a successful callback
    type Session: Send;

    /// Provider-specific raw data bundled for the host
    type Extra;

    /// Strategy identity registered with the host middleware
    fn name(&self) -> &'static str;

    /// Request phase: build the authorization redirect location.
    ///
    /// Malformed input is not an error here; missing parameters simply
    /// produce a URL with fewer parameters.
    async fn handle_request(&self, request: &AuthRequest) -> Result<String>;

    /// Callback phase: exchange the authorization code and fetch the
    /// user profile.
    ///
    /// On success the returned session holds both the token and the profile
    /// record; every failure short-circuits before a session value exists.
    async fn handle_callback(
        &self,
        request: &AuthRequest,
    ) -> std::result::Result<Self::Session, AuthFailure>;

    /// Clear both transient slots; runs on success and failure paths alike.
    fn handle_cleanup(&self, session: &mut Self::Session);

    /// Stable per-user identifier
    fn uid(&self, session: &Self::Session) -> Option<String>;

    /// Token fields mapped into the shared credentials shape
    fn credentials(&self, session: &Self::Session) -> Option<Credentials>;

    /// Normalized profile fields
    fn info(&self, session: &Self::Session) -> Option<UserInfo>;

    /// Raw provider data the host may want to persist or inspect
    fn extra(&self, session: &Self::Session) -> Option<Self::Extra>;
}
