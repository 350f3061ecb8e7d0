//! HTTP front end for [`DeckResolver`].
//!
//! Every outcome is rendered as a JSON envelope: `{"ok": true, "data": ...}`
//! on success, `{"ok": false, "error": "..."}` on any failure. All responses,
//! including the OPTIONS pre-flight and errors, carry the same cross-origin
//! headers.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, MethodRouter};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::DeckError;
use crate::request::DeckParams;
use crate::DeckResolver;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

type SharedResolver = Arc<DeckResolver>;

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Failure rendered as `{"ok": false, "error": "..."}`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "ok": false, "error": self.message })),
        )
            .into_response()
    }
}

impl From<DeckError> for AppError {
    fn from(e: DeckError) -> Self {
        log::warn!("deck request failed: {e}");
        AppError::bad_request(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn deck_routes() -> MethodRouter<SharedResolver> {
    get(get_deck)
        .post(post_deck)
        .put(post_deck)
        .options(preflight)
        .fallback(unsupported_method)
}

/// Build the application router, served at both `/` and `/api/deck`.
pub fn router(resolver: DeckResolver) -> Router {
    let deck = deck_routes();
    Router::new()
        .route("/", deck.clone())
        .route("/api/deck", deck)
        .fallback(unknown_route)
        .with_state(Arc::new(resolver))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
}

/// Serve the router on `listener` until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, resolver: DeckResolver, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        log::info!("listening on http://{addr}");
    }
    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(shutdown)
        .await
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn query_params(query: Result<Query<DeckParams>, QueryRejection>) -> Result<DeckParams, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

async fn respond(resolver: &DeckResolver, params: DeckParams) -> Result<Json<Value>, AppError> {
    let deck = resolver.resolve_params(params).await?;
    Ok(Json(json!({ "ok": true, "data": deck })))
}

/// GET /?url=...&lang=... or GET /?deck_code=...
async fn get_deck(
    State(resolver): State<SharedResolver>,
    query: Result<Query<DeckParams>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let params = query_params(query)?;
    respond(&resolver, params).await
}

/// POST/PUT / with a JSON body; body fields override query fields.
async fn post_deck(
    State(resolver): State<SharedResolver>,
    query: Result<Query<DeckParams>, QueryRejection>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let params = query_params(query)?.overlay(DeckParams::from_body(&body)?);
    respond(&resolver, params).await
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn unsupported_method() -> AppError {
    AppError::method_not_allowed("method not allowed")
}

async fn unknown_route() -> AppError {
    AppError::not_found("not found")
}
