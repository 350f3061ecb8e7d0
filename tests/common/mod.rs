//! Shared test fixtures for the deck resolution integration tests.
//!
//! Provides `spawn_upstream()`, an in-process stand-in for the game site that
//! answers every request with one canned response and records what it was
//! sent, and `spawn_app()`, which serves the real router on an ephemeral port.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use shadowverse_deck::{server, DeckResolver};
use tokio::net::TcpListener;

/// A request as seen by the stub upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string, e.g. `/web/DeckCode/getDeck`.
    pub target: String,
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// The canned response returned by the stub upstream.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl StubResponse {
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "application/json",
            body: value.to_string(),
        }
    }

    pub fn raw(status: StatusCode, content_type: &'static str, body: &str) -> Self {
        Self {
            status,
            content_type,
            body: body.to_string(),
        }
    }
}

pub struct StubUpstream {
    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub base: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubUpstream {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The single request the stub received. Panics on any other count.
    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        requests.into_iter().next().unwrap()
    }

    /// A resolver whose deck-code endpoint points at this stub.
    pub fn resolver(&self) -> DeckResolver {
        DeckResolver::builder()
            .upstream_base(&self.base)
            .timeout(Duration::from_secs(5))
            .user_agent("stub-default-agent")
            .build()
            .unwrap()
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Start a stub upstream that answers every request with `response`.
pub async fn spawn_upstream(response: StubResponse) -> StubUpstream {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();

    let app = Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
            let log = log.clone();
            let response = response.clone();
            async move {
                log.lock().unwrap().push(RecordedRequest {
                    method: method.to_string(),
                    target: uri
                        .path_and_query()
                        .map(|pq| pq.to_string())
                        .unwrap_or_default(),
                    user_agent: header_string(&headers, header::USER_AGENT),
                    content_type: header_string(&headers, header::CONTENT_TYPE),
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
                let resp: Response = (
                    response.status,
                    [(header::CONTENT_TYPE, response.content_type)],
                    response.body,
                )
                    .into_response();
                resp
            }
        },
    );

    StubUpstream {
        base: serve_in_background(app).await,
        requests,
    }
}

/// Serve the deck API router backed by `resolver`; returns its base URL.
pub async fn spawn_app(resolver: DeckResolver) -> String {
    serve_in_background(server::router(resolver)).await
}

async fn serve_in_background(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
