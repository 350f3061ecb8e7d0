//! Upstream HTTP client for the two deck lookups the game site supports.
//!
//! Both lookups share one contract: a non-success status is an error, the body
//! must be JSON, and the top-level JSON value must be an object. No retries
//! are attempted here.

use reqwest::header::USER_AGENT;
use reqwest::Response;
use serde_json::{json, Map, Value};
use url::Url;

use crate::error::{DeckError, Result};

/// Upstream error bodies are cut to this many characters in error messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Client for the upstream deck endpoints.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    deck_code_endpoint: Url,
}

impl UpstreamClient {
    pub fn new(http: reqwest::Client, deck_code_endpoint: Url) -> Self {
        Self {
            http,
            deck_code_endpoint,
        }
    }

    pub fn deck_code_endpoint(&self) -> &Url {
        &self.deck_code_endpoint
    }

    /// GET an already-normalized deck URL.
    pub async fn fetch_by_url(
        &self,
        url: &Url,
        user_agent: Option<&str>,
    ) -> Result<Map<String, Value>> {
        log::debug!("GET {url}");
        let mut request = self.http.get(url.clone());
        if let Some(ua) = user_agent {
            request = request.header(USER_AGENT, ua);
        }
        read_object(request.send().await?).await
    }

    /// POST `{"deck_code": ...}` to the deck-code endpoint.
    pub async fn fetch_by_deck_code(
        &self,
        deck_code: &str,
        user_agent: Option<&str>,
    ) -> Result<Map<String, Value>> {
        log::debug!("POST {} deck_code={deck_code}", self.deck_code_endpoint);
        let mut request = self
            .http
            .post(self.deck_code_endpoint.clone())
            .json(&json!({ "deck_code": deck_code }));
        if let Some(ua) = user_agent {
            request = request.header(USER_AGENT, ua);
        }
        read_object(request.send().await?).await
    }
}

async fn read_object(resp: Response) -> Result<Map<String, Value>> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp
            .text()
            .await
            .ok()
            .filter(|text| !text.trim().is_empty())
            .map(|text| text.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>());
        return Err(DeckError::UpstreamStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        });
    }

    let bytes = resp.bytes().await?;
    into_object(parse_body(&bytes)?)
}

/// Parse a response body as JSON.
///
/// The raw bytes are tried first. If that fails the body is decoded as
/// (lossy) UTF-8 text with any byte-order mark and surrounding whitespace
/// removed, and parsed again. The first parse error is reported when both fail.
pub fn parse_body(bytes: &[u8]) -> Result<Value> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(first) => {
            let text = String::from_utf8_lossy(bytes);
            let text = text.trim_start_matches('\u{feff}').trim();
            serde_json::from_str(text).map_err(|_| DeckError::NotJson(first))
        }
    }
}

/// Require a JSON object at the top level.
pub fn into_object(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(DeckError::NotObject("array")),
        Value::String(_) => Err(DeckError::NotObject("string")),
        Value::Number(_) => Err(DeckError::NotObject("number")),
        Value::Bool(_) => Err(DeckError::NotObject("boolean")),
        Value::Null => Err(DeckError::NotObject("null")),
    }
}
