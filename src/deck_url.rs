//! Deck URL normalization.
//!
//! The official site shares decks as human-facing pages shaped like
//! `https://shadowverse-wb.com/<lang>/deck/detail/?hash=...`. Those pages do
//! not return JSON, so they are rewritten to the JSON endpoint
//! `/web/DeckBuilder/deckHashDetail?hash=...&lang=...`. URLs on other hosts,
//! or upstream URLs of any other shape, pass through untouched.

use std::borrow::Cow;

use url::{form_urlencoded, Url};

use crate::config;
use crate::error::{DeckError, Result};

/// Result of [`normalize_deck_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    pub url: Url,
    /// Language taken from the first path segment of a legacy URL, if any.
    pub detected_lang: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum LegacyShape {
    /// `/<lang>/deck/detail...`
    WithLang(String),
    /// `/deck/detail...`
    Bare,
}

/// Parse user input as a URL, defaulting to `https://` when no scheme is given.
pub fn parse_input_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    let candidate: Cow<'_, str> = if has_scheme(trimmed) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("https://{trimmed}"))
    };
    Url::parse(&candidate).map_err(|source| DeckError::InvalidUrl {
        input: input.to_string(),
        source,
    })
}

/// `true` when `input` starts with `<scheme>://`.
///
/// A `://` later in the path or query (e.g. `?ref=https://...`) does not count.
fn has_scheme(input: &str) -> bool {
    input.split_once("://").is_some_and(|(scheme, _)| {
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// `true` for the upstream domain itself and any of its subdomains.
pub fn is_upstream_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    match host.strip_suffix(config::UPSTREAM_DOMAIN) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

fn legacy_shape(url: &Url) -> Option<LegacyShape> {
    let path = url.path().to_lowercase();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [first, "deck", detail, ..]
            if detail.starts_with("detail") && !config::RESERVED_PATH_SEGMENTS.contains(first) =>
        {
            Some(LegacyShape::WithLang((*first).to_string()))
        }
        ["deck", detail, ..] if detail.starts_with("detail") => Some(LegacyShape::Bare),
        _ => None,
    }
}

/// Last value of query parameter `name`; repeated keys resolve to the last one.
fn query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .filter(|(key, _)| key == name)
        .last()
        .map(|(_, value)| value.into_owned())
}

/// Rewrite a legacy deck-detail URL into the JSON API form.
///
/// The rewrite only happens on the upstream domain, for a legacy path shape,
/// and when a non-empty `hash` parameter is present. The rewritten URL keeps
/// `hash` and carries `lang` from the original query, falling back to the
/// language in the path. Anything else comes back unchanged.
pub fn normalize_deck_url(input: &str) -> Result<NormalizedUrl> {
    let url = parse_input_url(input)?;
    let unchanged = |url: Url| NormalizedUrl {
        url,
        detected_lang: None,
    };

    if !url.host_str().is_some_and(is_upstream_host) {
        return Ok(unchanged(url));
    }
    let Some(shape) = legacy_shape(&url) else {
        return Ok(unchanged(url));
    };
    let Some(hash) = query_value(&url, "hash").filter(|h| !h.is_empty()) else {
        return Ok(unchanged(url));
    };

    let detected_lang = match shape {
        LegacyShape::WithLang(lang) => Some(lang),
        LegacyShape::Bare => None,
    };
    let lang = query_value(&url, "lang").or_else(|| detected_lang.clone());

    let mut canonical = url;
    canonical.set_path(config::DECK_HASH_DETAIL_PATH);
    canonical.set_fragment(None);
    {
        let mut pairs = canonical.query_pairs_mut();
        pairs.clear().append_pair("hash", &hash);
        if let Some(lang) = &lang {
            pairs.append_pair("lang", lang);
        }
    }

    log::debug!("rewrote legacy deck url {input} -> {canonical}");
    Ok(NormalizedUrl {
        url: canonical,
        detected_lang,
    })
}

/// Set the `lang` query parameter, replacing any existing value in place.
///
/// Only `lang` pairs are touched; every other query segment keeps its
/// original encoding. Repeated `lang` keys collapse into the first one.
/// A blank `lang` leaves the URL untouched.
pub fn apply_lang_override(url: &mut Url, lang: &str) {
    let lang = lang.trim();
    if lang.is_empty() {
        return;
    }

    let lang_pair = format!(
        "lang={}",
        form_urlencoded::byte_serialize(lang.as_bytes()).collect::<String>()
    );
    let mut replaced = false;
    let mut segments: Vec<String> = Vec::new();
    for segment in url.query().unwrap_or("").split('&').filter(|s| !s.is_empty()) {
        let key = segment.split('=').next().unwrap_or(segment);
        if key == "lang" {
            if !replaced {
                segments.push(lang_pair.clone());
                replaced = true;
            }
        } else {
            segments.push(segment.to_string());
        }
    }
    if !replaced {
        segments.push(lang_pair);
    }

    url.set_query(Some(&segments.join("&")));
}

/// Normalize `input` and apply the caller's language override, producing the
/// URL that is actually fetched.
pub fn resolve_fetch_url(input: &str, lang_override: Option<&str>) -> Result<Url> {
    let NormalizedUrl { mut url, .. } = normalize_deck_url(input)?;
    if let Some(lang) = lang_override {
        apply_lang_override(&mut url, lang);
    }
    Ok(url)
}
