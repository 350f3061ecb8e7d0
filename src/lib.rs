//! Deck resolution for Shadowverse: Worlds Beyond.
//!
//! Accepts either a deck-sharing URL or a short deck code, fetches the deck
//! from the official site, and returns a [`DeckSummary`] whose shape never
//! depends on how the upstream response happened to be nested.
//!
//! Legacy deck pages (`https://shadowverse-wb.com/<lang>/deck/detail/?hash=...`)
//! are rewritten to the JSON API form before fetching.
//!
//! # Quick start
//!
//! ```no_run
//! use shadowverse_deck::{DeckResolver, ResolvedRequest};
//!
//! # async fn example() -> shadowverse_deck::Result<()> {
//! let resolver = DeckResolver::builder().build()?;
//!
//! let deck = resolver.resolve(&ResolvedRequest::from_deck_code("Ab1C")).await?;
//! println!("{} followers", deck.num_follower);
//!
//! let request = ResolvedRequest::from_url("https://shadowverse-wb.com/cht/deck/detail/?hash=abc")
//!     .with_lang(Some("en".to_string()));
//! let deck = resolver.resolve(&request).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod deck_url;
pub mod digger;
pub mod error;
pub mod models;
pub mod request;
pub mod server;

pub use client::UpstreamClient;
pub use digger::Digger;
pub use error::{DeckError, Result};
pub use models::{CardId, DeckSummary};
pub use request::{DeckParams, DeckSource, ResolvedRequest};

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// DeckResolverBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`DeckResolver`].
///
/// Use [`DeckResolver::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](DeckResolverBuilder::build).
pub struct DeckResolverBuilder {
    upstream_base: String,
    timeout: Duration,
    user_agent: String,
    wrapper_keys: Option<Vec<String>>,
}

impl Default for DeckResolverBuilder {
    fn default() -> Self {
        Self {
            upstream_base: config::UPSTREAM_BASE.to_string(),
            timeout: config::DEFAULT_TIMEOUT,
            user_agent: config::DEFAULT_USER_AGENT.to_string(),
            wrapper_keys: None,
        }
    }
}

impl DeckResolverBuilder {
    /// Set the base URL the deck-code endpoint is resolved against.
    ///
    /// Defaults to `https://shadowverse-wb.com`. Legacy URL rewriting always
    /// targets the official domain regardless of this setting.
    pub fn upstream_base(mut self, base: impl Into<String>) -> Self {
        self.upstream_base = base.into();
        self
    }

    /// Set the upstream request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent sent when a request does not supply its own.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replace the wrapper keys searched when a field is missing at the root.
    pub fn wrapper_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wrapper_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Build the resolver and its HTTP client.
    ///
    /// A zero timeout is rejected with [`DeckError::InvalidInput`].
    pub fn build(self) -> Result<DeckResolver> {
        if self.timeout.is_zero() {
            return Err(DeckError::InvalidInput(
                "timeout must be greater than zero".to_string(),
            ));
        }
        let endpoint = deck_url::parse_input_url(&config::deck_code_endpoint(&self.upstream_base))?;
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()?;
        let digger = match self.wrapper_keys {
            Some(keys) => Digger::new(keys),
            None => Digger::default(),
        };
        Ok(DeckResolver {
            client: UpstreamClient::new(http, endpoint),
            digger,
        })
    }
}

// ---------------------------------------------------------------------------
// DeckResolver
// ---------------------------------------------------------------------------

/// Resolves deck URLs and deck codes into [`DeckSummary`] values.
///
/// Holds no per-request state, so one instance can serve any number of
/// concurrent resolutions. Each resolution makes exactly one upstream call.
#[derive(Debug, Clone)]
pub struct DeckResolver {
    client: UpstreamClient,
    digger: Digger,
}

impl DeckResolver {
    /// Create a new builder for configuring the resolver.
    pub fn builder() -> DeckResolverBuilder {
        DeckResolverBuilder::default()
    }

    /// Resolve a validated request.
    pub async fn resolve(&self, request: &ResolvedRequest) -> Result<DeckSummary> {
        let user_agent = request.user_agent.as_deref();
        let raw = match &request.source {
            DeckSource::Url(input) => {
                let url = deck_url::resolve_fetch_url(input, request.lang.as_deref())?;
                self.client.fetch_by_url(&url, user_agent).await?
            }
            DeckSource::DeckCode(code) => {
                if request.lang.is_some() {
                    log::debug!("lang is ignored for deck code lookups");
                }
                self.client.fetch_by_deck_code(code, user_agent).await?
            }
        };
        Ok(self.digger.summarize(&raw))
    }

    /// Validate merged request parameters and resolve them.
    pub async fn resolve_params(&self, params: DeckParams) -> Result<DeckSummary> {
        let request = params.resolve()?;
        self.resolve(&request).await
    }

    pub fn client(&self) -> &UpstreamClient {
        &self.client
    }

    pub fn digger(&self) -> &Digger {
        &self.digger
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for DeckResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeckResolver(endpoint={}, wrapper_keys=[{}])",
            self.client.deck_code_endpoint(),
            self.digger.wrapper_keys().join(", ")
        )
    }
}
