use std::time::Duration;

/// Domain the legacy deck-detail rewrite applies to (subdomains included).
pub const UPSTREAM_DOMAIN: &str = "shadowverse-wb.com";
pub const UPSTREAM_BASE: &str = "https://shadowverse-wb.com";

/// Endpoint path that resolves a deck code via POST `{"deck_code": "..."}`.
pub const DECK_CODE_PATH: &str = "/web/DeckCode/getDeck";
/// JSON API path that legacy `/<lang>/deck/detail/?hash=...` pages map onto.
pub const DECK_HASH_DETAIL_PATH: &str = "/web/DeckBuilder/deckHashDetail";

/// First path segments that are never a language code.
pub const RESERVED_PATH_SEGMENTS: &[&str] = &["web", "deck", "builder"];

/// Keys under which upstream responses have been seen to nest the deck payload.
pub const CANDIDATE_WRAPPER_KEYS: &[&str] = &["data", "result", "deckDetail", "deck", "payload"];

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

// Default field values substituted when the upstream omits a field.
pub const DEFAULT_BATTLE_FORMAT: i64 = 2;
pub const DEFAULT_CLASS_ID: i64 = 5;

/// Full deck-code endpoint URL for the given upstream base.
pub fn deck_code_endpoint(base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), DECK_CODE_PATH)
}
