//! Twitch sign-in strategy for the Keyline authentication middleware
//!
//! Implements the OAuth 2.0 authorization-code flow against Twitch: build an
//! authorization redirect, exchange the callback code for an access token,
//! fetch the Helix user record, and map it into the provider-agnostic output
//! structures the host expects.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  TwitchStrategy  │  Phase handlers + accessor mapping
//! └────────┬─────────┘
//!          │
//!          ├──► TwitchOAuthClient  (authorize URL, code exchange,
//!          │                        authenticated GET)
//!          └──► TwitchSession      (request-scoped token + profile)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use keyline_domain::{AuthRequest, AuthStrategy, RequestOptions};
//! use keyline_twitch::{TwitchConfig, TwitchStrategy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TwitchConfig::new("client_id", "client_secret");
//!     let strategy = TwitchStrategy::new(config);
//!
//!     // Request phase: the host redirects the browser here.
//!     let options = RequestOptions {
//!         callback_url: Some("https://example.com/auth/twitch/callback".to_string()),
//!         ..RequestOptions::default()
//!     };
//!     let request = AuthRequest::new(HashMap::new(), options.clone());
//!     let location = strategy.handle_request(&request).await?;
//!     println!("redirect to {location}");
//!
//!     // ... the provider redirects back with ?code=... ...
//!
//!     let mut query = HashMap::new();
//!     query.insert("code".to_string(), "authorization_code".to_string());
//!     let callback = AuthRequest::new(query, options);
//!     let mut session = match strategy.handle_callback(&callback).await {
//!         Ok(session) => session,
//!         Err(failure) => return Err(failure.into()),
//!     };
//!
//!     // Accessors read the session; cleanup discards it.
//!     println!("uid: {:?}", strategy.uid(&session));
//!     strategy.handle_cleanup(&mut session);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod strategy;
pub mod types;

// Re-export commonly used items
pub use client::{ApiResponse, ClientOverrides, TwitchOAuthClient};
pub use config::TwitchConfig;
pub use strategy::{TwitchSession, TwitchStrategy};
pub use types::{TokenSet, TwitchExtra, TwitchProfile};
