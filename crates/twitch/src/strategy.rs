//! Twitch strategy: phase handlers and accessor mapping
//!
//! Drives the OAuth adapter through the externally-scheduled request and
//! callback phases and maps the results into the provider-agnostic output
//! structures the host middleware expects. Mapping dominates; the protocol
//! work lives in [`crate::client`].

use async_trait::async_trait;
use keyline_domain::{
    AuthFailure, AuthRequest, AuthStrategy, Credentials, Result, UserInfo,
};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{ApiResponse, ClientOverrides, TwitchOAuthClient};
use crate::config::TwitchConfig;
use crate::types::{TokenSet, TwitchExtra, TwitchProfile};

/// Transient state for one authentication flow.
///
/// Created at callback time, read by the accessors, cleared by cleanup.
/// Owned exclusively by the in-flight request; never shared across
/// requests. A session handed to the accessors always carries both slots;
/// failures short-circuit before one exists.
#[derive(Debug, Default)]
pub struct TwitchSession {
    token: Option<TokenSet>,
    profile: Option<TwitchProfile>,
    raw_profile: Option<Value>,
}

impl TwitchSession {
    fn established(token: TokenSet, profile: TwitchProfile, raw_profile: Value) -> Self {
        Self { token: Some(token), profile: Some(profile), raw_profile: Some(raw_profile) }
    }

    /// Exchanged token, when the session is live
    #[must_use]
    pub fn token(&self) -> Option<&TokenSet> {
        self.token.as_ref()
    }

    /// Typed profile record, when the session is live
    #[must_use]
    pub fn profile(&self) -> Option<&TwitchProfile> {
        self.profile.as_ref()
    }

    /// True once cleanup has discarded both slots
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.token.is_none() && self.profile.is_none() && self.raw_profile.is_none()
    }
}

/// Twitch sign-in strategy
pub struct TwitchStrategy {
    config: TwitchConfig,
    client: TwitchOAuthClient,
}

impl TwitchStrategy {
    /// Create a strategy from an explicit configuration.
    #[must_use]
    pub fn new(config: TwitchConfig) -> Self {
        let client = TwitchOAuthClient::new(config.clone());
        Self { config, client }
    }

    /// Create a strategy from the process environment.
    ///
    /// # Errors
    /// Returns a configuration error when required credentials are unset.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(TwitchConfig::from_env()?))
    }

    /// The adapter, for callers that need raw provider access.
    #[must_use]
    pub fn client(&self) -> &TwitchOAuthClient {
        &self.client
    }

    fn overrides_for(request: &AuthRequest) -> ClientOverrides {
        ClientOverrides {
            client_id: request.options().client_id.clone(),
            client_secret: request.options().client_secret.clone(),
        }
    }

    async fn fetch_profile(
        &self,
        token: &TokenSet,
        overrides: &ClientOverrides,
    ) -> std::result::Result<(TwitchProfile, Value), AuthFailure> {
        let response = self
            .client
            .authenticated_get(&token.access_token, &self.config.profile_endpoint, &[], overrides)
            .await
            .map_err(|e| AuthFailure::Transport(e.to_string()))?;

        classify_profile_response(response)
    }
}

/// Sort the profile response into the handled shapes: 401 is unauthorized,
/// a 2xx/3xx body with a non-empty `data` array carries the record, and
/// anything else is an unexpected response.
fn classify_profile_response(
    response: ApiResponse,
) -> std::result::Result<(TwitchProfile, Value), AuthFailure> {
    if response.status == StatusCode::UNAUTHORIZED {
        return Err(AuthFailure::Unauthorized);
    }

    if !(response.status.is_success() || response.status.is_redirection()) {
        return Err(AuthFailure::UnexpectedResponse(format!(
            "profile endpoint returned {}",
            response.status
        )));
    }

    let records = response.body.get("data").and_then(Value::as_array);
    if let Some(records) = records {
        if records.len() > 1 {
            warn!(
                count = records.len(),
                "profile endpoint returned multiple records, using the first"
            );
        }
    }

    let record = records
        .and_then(|records| records.first())
        .cloned()
        .ok_or_else(|| {
            AuthFailure::UnexpectedResponse("profile response carried no user record".to_string())
        })?;

    let profile: TwitchProfile = serde_json::from_value(record.clone())
        .map_err(|e| AuthFailure::UnexpectedResponse(format!("malformed user record: {e}")))?;

    Ok((profile, record))
}

#[async_trait]
impl AuthStrategy for TwitchStrategy {
    type Session = TwitchSession;
    type Extra = TwitchExtra;

    fn name(&self) -> &'static str {
        "twitch"
    }

    async fn handle_request(&self, request: &AuthRequest) -> Result<String> {
        let scope = request.query("scope").unwrap_or(&self.config.default_scope);

        let mut params: Vec<(&str, String)> = vec![("scope", scope.to_string())];
        if let Some(callback_url) = &request.options().callback_url {
            params.push(("redirect_uri", callback_url.clone()));
        }
        if let Some(state) = request.query("state") {
            params.push(("state", state.to_string()));
        }
        if self.config.force_verify {
            params.push(("force_verify", "true".to_string()));
        }

        let location = self.client.authorize_url(&params, &Self::overrides_for(request));
        info!(strategy = self.name(), "generated authorization redirect");

        Ok(location)
    }

    async fn handle_callback(
        &self,
        request: &AuthRequest,
    ) -> std::result::Result<TwitchSession, AuthFailure> {
        let code = request.query("code").ok_or(AuthFailure::MissingCode)?;
        let overrides = Self::overrides_for(request);
        let redirect_uri = request.options().callback_url.as_deref();

        let token = self.client.exchange_code(code, redirect_uri, &overrides).await?;
        debug!(strategy = self.name(), "authorization code exchanged");

        let (profile, raw_profile) = self.fetch_profile(&token, &overrides).await?;
        info!(strategy = self.name(), login = %profile.login, "authentication completed");

        Ok(TwitchSession::established(token, profile, raw_profile))
    }

    fn handle_cleanup(&self, session: &mut TwitchSession) {
        session.token = None;
        session.profile = None;
        session.raw_profile = None;
    }

    fn uid(&self, session: &TwitchSession) -> Option<String> {
        session
            .raw_profile
            .as_ref()
            .and_then(|record| record.get(&self.config.uid_field))
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }

    fn credentials(&self, session: &TwitchSession) -> Option<Credentials> {
        session.token.as_ref().map(|token| Credentials {
            access_token: token.access_token.clone(),
            token_type: token.token_type.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at: token.expires_at,
            expires: token.expires(),
        })
    }

    fn info(&self, session: &TwitchSession) -> Option<UserInfo> {
        session.profile.as_ref().map(|profile| UserInfo {
            name: profile.display_name.clone(),
            email: profile.email.clone(),
            image: profile.profile_image_url.clone(),
            description: profile.description.clone(),
            ..UserInfo::default()
        })
    }

    fn extra(&self, session: &TwitchSession) -> Option<TwitchExtra> {
        let token = session.token.as_ref()?;
        let profile = session.profile.as_ref()?;
        let raw_profile = session.raw_profile.as_ref()?;

        Some(TwitchExtra {
            raw_token: token.clone(),
            raw_profile: raw_profile.clone(),
            is_partnered: profile.is_partnered(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for strategy.
    use std::collections::HashMap;

    use keyline_domain::RequestOptions;
    use serde_json::json;

    use super::*;

    fn strategy() -> TwitchStrategy {
        TwitchStrategy::new(TwitchConfig::new("test_client_id", "test_client_secret"))
    }

    fn request(query: &[(&str, &str)], options: RequestOptions) -> AuthRequest {
        let query = query
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>();
        AuthRequest::new(query, options)
    }

    fn live_session(profile_json: Value) -> TwitchSession {
        let profile: TwitchProfile = serde_json::from_value(profile_json.clone()).unwrap();
        let token = TokenSet::new(
            "access123".to_string(),
            Some("refresh456".to_string()),
            "bearer".to_string(),
            Some(3600),
            None,
        );
        TwitchSession::established(token, profile, profile_json)
    }

    #[tokio::test]
    async fn request_phase_uses_the_configured_default_scope() {
        let url =
            strategy().handle_request(&request(&[], RequestOptions::default())).await.unwrap();

        assert!(url.contains("scope=user%3Aread%3Aemail"));
    }

    #[tokio::test]
    async fn request_phase_lets_the_query_override_the_scope() {
        let url = strategy()
            .handle_request(&request(
                &[("scope", "channel:read:subscriptions")],
                RequestOptions::default(),
            ))
            .await
            .unwrap();

        assert!(url.contains("scope=channel%3Aread%3Asubscriptions"));
        assert!(!url.contains("user%3Aread%3Aemail"));
    }

    #[tokio::test]
    async fn request_phase_passes_state_and_redirect_through() {
        let options = RequestOptions {
            callback_url: Some("https://example.com/auth/twitch/callback".to_string()),
            ..RequestOptions::default()
        };
        let url = strategy()
            .handle_request(&request(&[("state", "abc123")], options))
            .await
            .unwrap();

        assert!(url.contains("state=abc123"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fauth%2Ftwitch%2Fcallback"));
    }

    #[tokio::test]
    async fn request_phase_adds_force_verify_only_when_enabled() {
        let plain =
            strategy().handle_request(&request(&[], RequestOptions::default())).await.unwrap();
        assert!(!plain.contains("force_verify"));

        let mut config = TwitchConfig::new("id", "secret");
        config.force_verify = true;
        let forced = TwitchStrategy::new(config)
            .handle_request(&request(&[], RequestOptions::default()))
            .await
            .unwrap();
        assert!(forced.contains("force_verify=true"));
    }

    #[tokio::test]
    async fn callback_without_code_fails_before_any_exchange() {
        let result = strategy().handle_callback(&request(&[], RequestOptions::default())).await;

        assert_eq!(result.unwrap_err(), AuthFailure::MissingCode);
    }

    #[test]
    fn profile_classification_maps_401_to_unauthorized() {
        let response = ApiResponse { status: StatusCode::UNAUTHORIZED, body: Value::Null };

        assert_eq!(classify_profile_response(response).unwrap_err(), AuthFailure::Unauthorized);
    }

    #[test]
    fn profile_classification_rejects_an_empty_data_array() {
        let response = ApiResponse { status: StatusCode::OK, body: json!({ "data": [] }) };

        assert!(matches!(
            classify_profile_response(response),
            Err(AuthFailure::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn profile_classification_rejects_server_errors() {
        let response = ApiResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({ "data": [{ "id": "1", "login": "alice" }] }),
        };

        assert!(matches!(
            classify_profile_response(response),
            Err(AuthFailure::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn profile_classification_takes_the_first_record() {
        let response = ApiResponse {
            status: StatusCode::OK,
            body: json!({ "data": [
                { "id": "1", "login": "alice" },
                { "id": "2", "login": "bob" }
            ]}),
        };

        let (profile, raw) = classify_profile_response(response).unwrap();
        assert_eq!(profile.login, "alice");
        assert_eq!(raw["id"], "1");
    }

    #[test]
    fn uid_reads_the_configured_field_from_the_raw_record() {
        let session = live_session(json!({
            "id": "44322889",
            "login": "alice",
            "display_name": "Alice"
        }));

        assert_eq!(strategy().uid(&session), Some("alice".to_string()));

        let mut config = TwitchConfig::new("id", "secret");
        config.uid_field = "id".to_string();
        let by_id = TwitchStrategy::new(config);
        assert_eq!(by_id.uid(&session), Some("44322889".to_string()));
    }

    #[test]
    fn info_maps_the_fixed_profile_fields() {
        let session = live_session(json!({
            "id": "44322889",
            "login": "alice",
            "display_name": "Alice",
            "email": "a@x.com",
            "description": "streams on tuesdays",
            "profile_image_url": "https://static.example/alice.png"
        }));

        let info = strategy().info(&session).unwrap();
        assert_eq!(info.name.as_deref(), Some("Alice"));
        assert_eq!(info.email.as_deref(), Some("a@x.com"));
        assert_eq!(info.image.as_deref(), Some("https://static.example/alice.png"));
        assert_eq!(info.description.as_deref(), Some("streams on tuesdays"));
        // No Twitch equivalent for these; they stay empty.
        assert!(info.first_name.is_none());
        assert!(info.last_name.is_none());
        assert!(info.nickname.is_none());
        assert!(info.location.is_none());
        assert!(info.phone.is_none());
    }

    #[test]
    fn credentials_derive_the_expires_flag_from_the_timestamp() {
        let session = live_session(json!({ "id": "1", "login": "alice" }));

        let credentials = strategy().credentials(&session).unwrap();
        assert_eq!(credentials.access_token, "access123");
        assert_eq!(credentials.refresh_token.as_deref(), Some("refresh456"));
        assert!(credentials.expires);
        assert!(credentials.expires_at.is_some());
    }

    #[test]
    fn extra_bundles_raw_records_and_the_partnered_flag() {
        let session = live_session(json!({
            "id": "1",
            "login": "alice",
            "broadcaster_type": "partner"
        }));

        let extra = strategy().extra(&session).unwrap();
        assert_eq!(extra.raw_token.access_token, "access123");
        assert_eq!(extra.raw_profile["login"], "alice");
        assert!(extra.is_partnered);
    }

    #[test]
    fn cleanup_clears_both_slots() {
        let strategy = strategy();
        let mut session = live_session(json!({ "id": "1", "login": "alice" }));

        strategy.handle_cleanup(&mut session);

        assert!(session.is_cleared());
        assert!(strategy.uid(&session).is_none());
        assert!(strategy.credentials(&session).is_none());
        assert!(strategy.info(&session).is_none());
        assert!(strategy.extra(&session).is_none());
    }
}
