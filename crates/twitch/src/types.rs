//! Token and profile types for the Twitch strategy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// OAuth access and refresh tokens with metadata.
///
/// Produced by the token exchange; never mutated after creation. Discarded
/// at the end of the request unless the host persists it elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for provider API calls
    pub access_token: String,

    /// Refresh token for obtaining new access tokens
    /// Optional because the provider may not issue one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type as reported by the provider
    pub token_type: String,

    /// Access token lifetime in seconds, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Absolute expiration timestamp (UTC)
    /// Calculated from `expires_in` at token creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,
}

impl TokenSet {
    /// Create a new `TokenSet` with a calculated expiration timestamp.
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        token_type: String,
        expires_in: Option<i64>,
        scope: Option<Vec<String>>,
    ) -> Self {
        let expires_at = expires_in
            .filter(|seconds| *seconds > 0)
            .map(|seconds| Utc::now() + chrono::Duration::seconds(seconds));

        Self { access_token, refresh_token, token_type, expires_in, expires_at, scope }
    }

    /// True when the provider reported an expiry for this token
    #[must_use]
    pub fn expires(&self) -> bool {
        self.expires_at.is_some()
    }

    /// Seconds until token expiration, when an expiry is set
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }
}

/// One record from the Helix `users` endpoint.
///
/// Only the fields the mapping step reads are typed; the full record is
/// retained alongside as raw JSON for the configured uid lookup and the
/// extras accessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitchProfile {
    /// Numeric user id, as a string on the wire
    pub id: String,

    /// Login handle (the default uid field)
    pub login: String,

    #[serde(default)]
    pub display_name: Option<String>,

    /// Requires the `user:read:email` scope
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub profile_image_url: Option<String>,

    /// "partner", "affiliate", or empty
    #[serde(default)]
    pub broadcaster_type: Option<String>,

    /// Verbatim partnered flag, kept for older payload shapes
    #[serde(default)]
    pub partnered: Option<bool>,
}

impl TwitchProfile {
    /// Whether the account is a partnered channel.
    ///
    /// Honors a verbatim `partnered` flag when the payload carries one;
    /// otherwise Twitch encodes partnership as `broadcaster_type ==
    /// "partner"`.
    #[must_use]
    pub fn is_partnered(&self) -> bool {
        match self.partnered {
            Some(flag) => flag,
            None => self.broadcaster_type.as_deref() == Some("partner"),
        }
    }
}

/// Raw provider data bundled for the host
#[derive(Debug, Clone, Serialize)]
pub struct TwitchExtra {
    /// Token exactly as produced by the exchange
    pub raw_token: TokenSet,

    /// Profile record exactly as returned by the provider
    pub raw_profile: Value,

    /// Denormalized partnership flag extracted from the profile
    pub is_partnered: bool,
}
