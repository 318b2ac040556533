//! Strategy configuration
//!
//! Constructed once at process start and passed by value into the adapter
//! and strategy constructors. No global lookup happens after construction.

use keyline_domain::{KeylineError, Result};

/// Twitch authorization endpoint
pub const AUTHORIZATION_ENDPOINT: &str = "https://id.twitch.tv/oauth2/authorize";
/// Twitch token endpoint
pub const TOKEN_ENDPOINT: &str = "https://id.twitch.tv/oauth2/token";
/// Helix users endpoint
pub const PROFILE_ENDPOINT: &str = "https://api.twitch.tv/helix/users";

const DEFAULT_SCOPE: &str = "user:read:email";
const DEFAULT_UID_FIELD: &str = "login";

/// Configuration for the Twitch strategy
#[derive(Debug, Clone)]
pub struct TwitchConfig {
    /// OAuth client id issued by the Twitch developer console
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Requested permission scope when the incoming request carries none
    pub default_scope: String,

    /// Profile field used as the stable per-user identifier
    pub uid_field: String,

    /// Ask Twitch to re-prompt the user even with an active session
    pub force_verify: bool,

    /// Authorization endpoint; overridable so tests can point at a mock
    /// server
    pub authorization_endpoint: String,

    /// Token endpoint
    pub token_endpoint: String,

    /// User-profile endpoint
    pub profile_endpoint: String,
}

impl TwitchConfig {
    /// Create a configuration with the fixed Twitch endpoints and defaults.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            default_scope: DEFAULT_SCOPE.to_string(),
            uid_field: DEFAULT_UID_FIELD.to_string(),
            force_verify: false,
            authorization_endpoint: AUTHORIZATION_ENDPOINT.to_string(),
            token_endpoint: TOKEN_ENDPOINT.to_string(),
            profile_endpoint: PROFILE_ENDPOINT.to_string(),
        }
    }

    /// Load credentials and optional overrides from the environment.
    ///
    /// `TWITCH_CLIENT_ID` and `TWITCH_CLIENT_SECRET` are required;
    /// `TWITCH_DEFAULT_SCOPE` and `TWITCH_UID_FIELD` override the defaults
    /// when set.
    ///
    /// # Errors
    /// Returns [`KeylineError::Config`] when a required variable is unset.
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("TWITCH_CLIENT_ID")
            .map_err(|_| KeylineError::Config("TWITCH_CLIENT_ID not set".into()))?;
        let client_secret = std::env::var("TWITCH_CLIENT_SECRET")
            .map_err(|_| KeylineError::Config("TWITCH_CLIENT_SECRET not set".into()))?;

        let mut config = Self::new(client_id, client_secret);
        if let Ok(scope) = std::env::var("TWITCH_DEFAULT_SCOPE") {
            config.default_scope = scope;
        }
        if let Ok(field) = std::env::var("TWITCH_UID_FIELD") {
            config.uid_field = field;
        }

        Ok(config)
    }
}
