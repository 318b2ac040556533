//! OAuth client adapter for the Twitch endpoints
//!
//! Wraps a reqwest client with the fixed endpoint configuration and the
//! per-deployment credentials. Exposes authorization-URL construction, the
//! code exchange, token refresh, and an authenticated GET helper. All calls
//! run inside the host's request context; the client's own timeout is the
//! only enforcement.

use std::collections::HashMap;
use std::time::Duration;

use keyline_domain::AuthFailure;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::TwitchConfig;
use crate::types::TokenSet;

/// Per-request credential overrides supplied by the host middleware
#[derive(Debug, Clone, Default)]
pub struct ClientOverrides {
    /// Client id to use instead of the configured one
    pub client_id: Option<String>,

    /// Client secret to use instead of the configured one
    pub client_secret: Option<String>,
}

impl ClientOverrides {
    fn client_id<'a>(&'a self, config: &'a TwitchConfig) -> &'a str {
        self.client_id.as_deref().unwrap_or(&config.client_id)
    }

    fn client_secret<'a>(&'a self, config: &'a TwitchConfig) -> &'a str {
        self.client_secret.as_deref().unwrap_or(&config.client_secret)
    }
}

/// Raw HTTP response from an authenticated provider call.
///
/// The caller interprets status and body; the adapter does not classify.
#[derive(Debug)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: StatusCode,

    /// Parsed JSON body, `Value::Null` when the body was not JSON
    pub body: Value,
}

/// Token endpoint response before classification.
///
/// Twitch signals errors either with an OAuth error body on a non-2xx
/// status, or with HTTP 200 and an absent access token plus error fields
/// embedded in the body; both shapes are captured here and normalized by
/// [`classify_token_response`].
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    scope: Option<Vec<String>>,
    error: Option<String>,
    error_description: Option<String>,
    #[serde(flatten)]
    params: HashMap<String, Value>,
}

/// OAuth client bound to the Twitch endpoints
#[derive(Debug, Clone)]
pub struct TwitchOAuthClient {
    config: TwitchConfig,
    http: Client,
}

impl TwitchOAuthClient {
    /// Create a new client for the configured endpoints.
    #[must_use]
    pub fn new(config: TwitchConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, http }
    }

    /// Build the authorization redirect URL.
    ///
    /// Merge order: fixed defaults (`response_type`, client id), then
    /// caller-supplied parameters, with per-request credential overrides
    /// winning on the client id. Pure construction; no side effects.
    #[must_use]
    pub fn authorize_url(
        &self,
        extra_params: &[(&str, String)],
        overrides: &ClientOverrides,
    ) -> String {
        let mut params: Vec<(String, String)> = vec![
            ("response_type".to_string(), "code".to_string()),
            ("client_id".to_string(), overrides.client_id(&self.config).to_string()),
        ];

        for (key, value) in extra_params {
            match params.iter_mut().find(|(existing, _)| existing.as_str() == *key) {
                Some(entry) => entry.1.clone_from(value),
                None => params.push(((*key).to_string(), value.clone())),
            }
        }

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.config.authorization_endpoint, query_string)
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    /// Returns [`AuthFailure::Exchange`] when the provider rejects the code,
    /// [`AuthFailure::Transport`] when the HTTP call fails, and
    /// [`AuthFailure::UnexpectedResponse`] when the body is not JSON.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
        overrides: &ClientOverrides,
    ) -> Result<TokenSet, AuthFailure> {
        let mut form = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("client_id".to_string(), overrides.client_id(&self.config).to_string()),
            ("client_secret".to_string(), overrides.client_secret(&self.config).to_string()),
            ("code".to_string(), code.to_string()),
        ];
        if let Some(redirect_uri) = redirect_uri {
            form.push(("redirect_uri".to_string(), redirect_uri.to_string()));
        }

        debug!(endpoint = %self.config.token_endpoint, "exchanging authorization code");
        self.token_request(&form).await
    }

    /// Obtain a new access token from a refresh token.
    ///
    /// # Errors
    /// Classified exactly like [`Self::exchange_code`].
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        overrides: &ClientOverrides,
    ) -> Result<TokenSet, AuthFailure> {
        if refresh_token.is_empty() {
            return Err(AuthFailure::Exchange {
                code: "invalid_request".to_string(),
                description: "no refresh token available".to_string(),
            });
        }

        let form = vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("client_id".to_string(), overrides.client_id(&self.config).to_string()),
            ("client_secret".to_string(), overrides.client_secret(&self.config).to_string()),
            ("refresh_token".to_string(), refresh_token.to_string()),
        ];

        debug!(endpoint = %self.config.token_endpoint, "refreshing access token");
        self.token_request(&form).await
    }

    /// GET a provider endpoint with the access token.
    ///
    /// Adds `Authorization: Bearer <token>` and the `client_secret` request
    /// parameter Twitch requires on authenticated calls (a provider quirk,
    /// not a generic OAuth2 requirement). Returns the raw status and parsed
    /// body for the caller to interpret.
    ///
    /// # Errors
    /// Returns the transport error when the HTTP call itself fails.
    pub async fn authenticated_get(
        &self,
        access_token: &str,
        url: &str,
        headers: &[(&str, &str)],
        overrides: &ClientOverrides,
    ) -> Result<ApiResponse, reqwest::Error> {
        let mut request = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(&[("client_secret", overrides.client_secret(&self.config))]);

        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%status, %url, "authenticated GET completed");

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(ApiResponse { status, body })
    }

    async fn token_request(&self, form: &[(String, String)]) -> Result<TokenSet, AuthFailure> {
        let response = self
            .http
            .post(&self.config.token_endpoint)
            .form(form)
            .send()
            .await
            .map_err(|e| AuthFailure::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| AuthFailure::Transport(e.to_string()))?;
        debug!(%status, "token endpoint replied");

        let parsed: TokenEndpointResponse = serde_json::from_slice(&body).map_err(|e| {
            AuthFailure::UnexpectedResponse(format!("token response was not valid JSON: {e}"))
        })?;

        classify_token_response(parsed)
    }
}

/// Normalize the two ways the provider signals an exchange error into one
/// failure shape: an explicit OAuth error body, or an absent access token
/// with error fields carried as side-channel parameters.
fn classify_token_response(response: TokenEndpointResponse) -> Result<TokenSet, AuthFailure> {
    if let Some(code) = response.error {
        return Err(AuthFailure::Exchange {
            code,
            description: response.error_description.unwrap_or_default(),
        });
    }

    match response.access_token {
        Some(access_token) => Ok(TokenSet::new(
            access_token,
            response.refresh_token,
            response.token_type.unwrap_or_else(|| "bearer".to_string()),
            response.expires_in,
            response.scope,
        )),
        None => Err(exchange_failure_from_params(&response.params, response.error_description)),
    }
}

fn exchange_failure_from_params(
    params: &HashMap<String, Value>,
    description: Option<String>,
) -> AuthFailure {
    let code = params
        .get("status")
        .map(value_to_string)
        .unwrap_or_else(|| "invalid_token_response".to_string());
    let description = description
        .or_else(|| params.get("message").map(value_to_string))
        .unwrap_or_else(|| "token endpoint returned no access token".to_string());

    AuthFailure::Exchange { code, description }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
