//! Normalized output structures handed back to the host middleware
//!
//! These shapes are the contract between a strategy and the host: every
//! provider maps its own token and profile records into them. They are
//! synthesized fresh from transient state on each accessor call, never
//! cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credentials extracted from a completed authentication attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Access token issued by the provider
    pub access_token: String,

    /// Token type as reported by the provider (typically "bearer")
    pub token_type: String,

    /// Refresh token, when the provider issued one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Absolute expiration timestamp (UTC), when the provider reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// True when an expiry timestamp is present
    pub expires: bool,
}

/// Normalized profile fields shared by every provider.
///
/// Providers fill what they have; fields with no provider equivalent stay
/// `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    //! Unit tests for types.
    use super::*;

    /// Validates `UserInfo::default` behavior for the empty profile scenario.
    ///
    /// Assertions:
    /// - Ensures every optional field starts out absent.
    /// - Ensures `info.urls.is_empty()` evaluates to true.
    #[test]
    fn test_user_info_defaults_are_empty() {
        let info = UserInfo::default();

        assert!(info.name.is_none());
        assert!(info.first_name.is_none());
        assert!(info.last_name.is_none());
        assert!(info.nickname.is_none());
        assert!(info.email.is_none());
        assert!(info.image.is_none());
        assert!(info.description.is_none());
        assert!(info.location.is_none());
        assert!(info.phone.is_none());
        assert!(info.urls.is_empty());
    }

    /// Validates the credentials serialization scenario.
    ///
    /// Assertions:
    /// - Ensures absent optionals are omitted from the serialized form.
    /// - Confirms the `expires` flag survives the round trip.
    #[test]
    fn test_credentials_serialization_omits_absent_fields() {
        let credentials = Credentials {
            access_token: "access123".to_string(),
            token_type: "bearer".to_string(),
            refresh_token: None,
            expires_at: None,
            expires: false,
        };

        let json = serde_json::to_value(&credentials).unwrap();
        assert_eq!(json["access_token"], "access123");
        assert!(json.get("refresh_token").is_none());
        assert!(json.get("expires_at").is_none());
        assert_eq!(json["expires"], false);
    }
}
