//! Inbound request parameters and their validation.
//!
//! Parameters arrive from the query string, a JSON body, or both. Each source
//! is parsed into a partial [`DeckParams`]; the body is then overlaid on the
//! query field by field, and the merged record is validated into a
//! [`ResolvedRequest`] with exactly one input mode.

use serde::Deserialize;

use crate::error::{DeckError, Result};

pub const MISSING_SOURCE: &str = "provide url or deck_code";
pub const CONFLICTING_SOURCES: &str = "url and deck_code are mutually exclusive";

/// Partial request record from one input source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeckParams {
    pub url: Option<String>,
    #[serde(alias = "deckCode")]
    pub deck_code: Option<String>,
    pub lang: Option<String>,
    pub ua: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl DeckParams {
    /// Parse a JSON request body. An empty body yields an empty record.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| DeckError::InvalidBody(e.to_string()))
    }

    /// Overlay `body` on top of `self`; non-blank body values win.
    pub fn overlay(self, body: DeckParams) -> Self {
        Self {
            url: non_blank(body.url).or(self.url),
            deck_code: non_blank(body.deck_code).or(self.deck_code),
            lang: non_blank(body.lang).or(self.lang),
            ua: non_blank(body.ua).or(self.ua),
        }
    }

    /// Validate into a [`ResolvedRequest`]. Blank values count as absent.
    pub fn resolve(self) -> Result<ResolvedRequest> {
        let source = match (non_blank(self.url), non_blank(self.deck_code)) {
            (Some(_), Some(_)) => {
                return Err(DeckError::InvalidInput(CONFLICTING_SOURCES.to_string()))
            }
            (Some(url), None) => DeckSource::Url(url),
            (None, Some(code)) => DeckSource::DeckCode(code),
            (None, None) => return Err(DeckError::InvalidInput(MISSING_SOURCE.to_string())),
        };
        Ok(ResolvedRequest {
            source,
            lang: non_blank(self.lang),
            user_agent: non_blank(self.ua),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckSource {
    Url(String),
    DeckCode(String),
}

/// A validated request with exactly one input mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub source: DeckSource,
    /// Overrides the `lang` query parameter of the fetched URL (URL mode only).
    pub lang: Option<String>,
    pub user_agent: Option<String>,
}

impl ResolvedRequest {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            source: DeckSource::Url(url.into()),
            lang: None,
            user_agent: None,
        }
    }

    pub fn from_deck_code(deck_code: impl Into<String>) -> Self {
        Self {
            source: DeckSource::DeckCode(deck_code.into().trim().to_string()),
            lang: None,
            user_agent: None,
        }
    }

    pub fn with_lang(mut self, lang: Option<String>) -> Self {
        self.lang = non_blank(lang);
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = non_blank(user_agent);
        self
    }
}
