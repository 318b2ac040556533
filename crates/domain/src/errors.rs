//! Error types shared by Keyline strategies

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for strategy construction and configuration
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum KeylineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Keyline operations
pub type Result<T> = std::result::Result<T, KeylineError>;

/// Terminal failure of one authentication attempt.
///
/// Surfaced to the host middleware as a structured failure (kind plus
/// human-readable description); the host decides user-visible presentation.
/// None of these are retried; a code exchange is not safe to replay.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum AuthFailure {
    /// The callback request carried no authorization code.
    #[error("authorization callback carried no code parameter")]
    #[serde(rename = "missing_code")]
    MissingCode,

    /// The provider rejected the code exchange.
    #[error("token exchange rejected ({code}): {description}")]
    #[serde(rename = "oauth_exchange_error")]
    Exchange { code: String, description: String },

    /// The profile fetch returned HTTP 401.
    #[error("user profile request was unauthorized")]
    #[serde(rename = "unauthorized")]
    Unauthorized,

    /// The underlying HTTP call failed before a response was produced.
    #[error("transport error: {0}")]
    #[serde(rename = "transport_error")]
    Transport(String),

    /// The provider answered with a shape outside the handled cases.
    #[error("unexpected provider response: {0}")]
    #[serde(rename = "unexpected_response")]
    UnexpectedResponse(String),
}

impl AuthFailure {
    /// Stable identifier for the failure kind, independent of the details.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCode => "missing_code",
            Self::Exchange { .. } => "oauth_exchange_error",
            Self::Unauthorized => "unauthorized",
            Self::Transport(_) => "transport_error",
            Self::UnexpectedResponse(_) => "unexpected_response",
        }
    }
}
