#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid url '{input}': {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP {status} - {reason}{}", body_suffix(.body))]
    UpstreamStatus {
        status: u16,
        reason: String,
        body: Option<String>,
    },

    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("top-level JSON is not an object (got {0})")]
    NotObject(&'static str),

    #[error("request body is not a valid JSON object: {0}")]
    InvalidBody(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(text) if !text.trim().is_empty() => format!(" - {}", text.trim()),
        _ => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
