//! Request error taxonomy and response bodies.
//!
//! Client errors surface immediately as 4xx with a descriptive
//! message, halting the pipeline before any notification attempt.
//! Downstream delivery failures never appear here; the dispatcher
//! folds them into the fallback ladder.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// JSON error body returned for every 4xx/5xx outcome.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// JSON body returned for every accepted submission.
#[derive(Debug, Serialize)]
pub struct SuccessBody {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Too many requests, please try again later")]
    RateLimited,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Request body must be a JSON object")]
    InvalidJson,

    #[error("{0}")]
    Validation(String),

    #[error("Invalid signature")]
    InvalidSignature,

    /// Relay endpoints have no secondary channel; with the chat
    /// webhook unconfigured there is no delivery path at all.
    #[error("Notification channel is not configured")]
    NoDeliveryPath,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InvalidJson | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidSignature => StatusCode::UNAUTHORIZED,
            ApiError::NoDeliveryPath => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Build the 200 success response.
pub fn success(message: impl Into<String>) -> (StatusCode, Json<SuccessBody>) {
    (
        StatusCode::OK,
        Json(SuccessBody {
            success: true,
            message: message.into(),
        }),
    )
}
