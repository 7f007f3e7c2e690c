//! Form endpoint handlers.
//!
//! All four endpoints share one pipeline: ingress guard (rate limit,
//! body size, JSON object parse) → per-form validation → the
//! notification dispatcher. The two relay endpoints additionally
//! verify an HMAC signature over the raw body before parsing, and
//! fail fast with 503 when their chat webhook is unconfigured, since
//! they have no secondary channel to fall back to.
//!
//! Once validation has passed, the caller always gets a success
//! response: a downstream outage is an operational incident, not a
//! user-facing error.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::forms::{contact, order, quote};
use crate::notify::{Dispatcher, Notification};
use crate::web::error::{success, ApiError};
use crate::web::rate_limit::{source_key, RateLimiter};
use crate::web::signature::{verify_signature, SIGNATURE_HEADER};

/// Maximum accepted request body size in bytes.
pub const MAX_BODY_BYTES: usize = 50_000;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub limiter: Arc<RateLimiter>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(config: Config, client: reqwest::Client) -> Self {
        let config = Arc::new(config);
        Self {
            dispatcher: Arc::new(Dispatcher::new(client, config.clone())),
            limiter: Arc::new(RateLimiter::new()),
            config,
        }
    }
}

/// Build the application router. POST-only form routes; other methods
/// fall through to a 405 that carries the same `{error}` JSON body as
/// every other non-success response.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health).fallback(method_not_allowed))
        .route("/api/contact", post(contact_form).fallback(method_not_allowed))
        .route("/api/quote", post(quote_form).fallback(method_not_allowed))
        .route(
            "/api/webhooks/order",
            post(order_webhook).fallback(method_not_allowed),
        )
        .route(
            "/api/webhooks/quote",
            post(quote_webhook).fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

// =============================================================================
// Health Check
// =============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Shared ingress guard
// =============================================================================

/// Rate limit and body size checks, before anything touches the body
/// contents.
fn guard_ingress(state: &AppState, headers: &HeaderMap, peer: Option<SocketAddr>, body: &Bytes) -> Result<(), ApiError> {
    let key = source_key(headers, peer);
    if state.limiter.check(&key) {
        warn!(source = %key, "rate_limited");
        return Err(ApiError::RateLimited);
    }

    if body.len() > MAX_BODY_BYTES {
        warn!(source = %key, body_length = body.len(), "body_too_large");
        return Err(ApiError::PayloadTooLarge);
    }

    Ok(())
}

/// Unwrap the buffered body, folding framework-level buffering
/// failures (the outer length limit included) into the same `{error}`
/// JSON shape as the explicit size guard.
fn read_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ApiError> {
    body.map_err(|rejection| {
        warn!(error = %rejection, "body_read_failed");
        ApiError::PayloadTooLarge
    })
}

/// Parse the body as a JSON object.
fn parse_object(body: &Bytes) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ApiError::InvalidJson),
    }
}

/// Verify the webhook signature over the raw body. Skipped entirely
/// when no shared secret is configured (dev-mode bypass, deliberately
/// permissive). Missing and malformed signatures get one uniform
/// error; only the logs distinguish them.
fn check_signature(config: &Config, headers: &HeaderMap, body: &[u8]) -> Result<(), ApiError> {
    let Some(secret) = config.webhook_secret.as_configured() else {
        warn!("webhook_secret_not_configured");
        return Ok(());
    };

    match headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(signature) if verify_signature(body, signature, secret) => Ok(()),
        Some(_) => {
            warn!("webhook_signature_invalid");
            Err(ApiError::InvalidSignature)
        }
        None => {
            warn!("webhook_signature_missing");
            Err(ApiError::InvalidSignature)
        }
    }
}

/// Run the dispatcher and answer the submitter. Delivery outcomes are
/// logged by the dispatcher and never surfaced here.
async fn dispatch_and_respond(
    state: &AppState,
    note: Notification,
    message: &str,
) -> (StatusCode, Json<crate::web::error::SuccessBody>) {
    state.dispatcher.dispatch(&note).await;
    success(message)
}

// =============================================================================
// Website forms
// =============================================================================

pub async fn contact_form(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = read_body(body)?;
    guard_ingress(&state, &headers, connect_info.map(|c| c.0), &body)?;
    let payload = parse_object(&body)?;

    info!(
        has_email = payload.contains_key("email"),
        body_length = body.len(),
        "contact_form_received"
    );

    let mut note = contact::build(&payload).map_err(ApiError::Validation)?;
    note.webhook_url = state
        .config
        .contact_webhook_url
        .as_configured()
        .map(str::to_string);

    Ok(dispatch_and_respond(&state, note, "Thanks! Your message has been received.").await)
}

pub async fn quote_form(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = read_body(body)?;
    guard_ingress(&state, &headers, connect_info.map(|c| c.0), &body)?;
    let payload = parse_object(&body)?;

    info!(
        has_email = payload.contains_key("email"),
        body_length = body.len(),
        "quote_form_received"
    );

    let mut note = quote::build(&payload).map_err(ApiError::Validation)?;
    note.webhook_url = state
        .config
        .quote_webhook_url
        .as_configured()
        .map(str::to_string);

    Ok(dispatch_and_respond(&state, note, "Thanks! Your quote request has been received.").await)
}

// =============================================================================
// Signed relay webhooks
// =============================================================================

pub async fn order_webhook(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = read_body(body)?;
    guard_ingress(&state, &headers, connect_info.map(|c| c.0), &body)?;
    check_signature(&state.config, &headers, &body)?;

    // No secondary channel exists on this path; without the chat
    // webhook there is nothing to deliver to.
    let Some(url) = state.config.order_relay_webhook_url.as_configured() else {
        warn!("order_relay_unconfigured");
        return Err(ApiError::NoDeliveryPath);
    };
    let url = url.to_string();

    let payload = parse_object(&body)?;
    info!(body_length = body.len(), "order_webhook_received");

    let mut note = order::build(&payload).map_err(ApiError::Validation)?;
    note.webhook_url = Some(url);

    Ok(dispatch_and_respond(&state, note, "Order received.").await)
}

pub async fn quote_webhook(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = read_body(body)?;
    guard_ingress(&state, &headers, connect_info.map(|c| c.0), &body)?;
    check_signature(&state.config, &headers, &body)?;

    let Some(url) = state.config.quote_relay_webhook_url.as_configured() else {
        warn!("quote_relay_unconfigured");
        return Err(ApiError::NoDeliveryPath);
    };
    let url = url.to_string();

    let payload = parse_object(&body)?;
    info!(body_length = body.len(), "quote_webhook_received");

    let mut note = quote::build_relay(&payload).map_err(ApiError::Validation)?;
    note.webhook_url = Some(url);

    Ok(dispatch_and_respond(&state, note, "Quote request received.").await)
}
