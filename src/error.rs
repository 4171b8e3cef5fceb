//! Error types for the API surface
//!
//! Every failure that reaches a route boundary is one of these variants and
//! renders as the uniform `{success: false, error, message}` envelope.

use std::time::Duration;

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::booking::{BookingError, IntakeError, StoreError};
use crate::upstream::FetchError;

/// Retry hint sent when the upstream is rate limiting the proxy.
pub const UPSTREAM_RATE_LIMIT_RETRY: Duration = Duration::from_secs(60);

/// Retry hint sent after an upstream timeout.
pub const UPSTREAM_TIMEOUT_RETRY: Duration = Duration::from_secs(5);

/// Message shown whenever the upstream fails for reasons the caller cannot fix.
const UNAVAILABLE_MESSAGE: &str = "News service is temporarily unavailable. Please try again later.";

// == Api Error Enum ==
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad input, rejected before any cache or upstream work
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The request governor denied this client
    #[error("Too many requests")]
    GovernorDenied { retry_after: Duration },

    #[error("Upstream request timed out")]
    UpstreamTimeout,

    #[error("Upstream rate limit reached")]
    UpstreamRateLimited,

    /// Detail is logged, never sent to the caller
    #[error("Upstream authentication failed")]
    UpstreamAuthFailed(String),

    #[error("Unexpected upstream failure: {0}")]
    UpstreamUnexpected(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::GovernorDenied { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpstreamTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::UpstreamRateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpstreamAuthFailed(_)
            | ApiError::UpstreamUnexpected(_)
            | ApiError::Storage(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Seconds the caller should wait before retrying, if any.
    pub fn retry_after(&self) -> Option<u64> {
        let wait = match self {
            ApiError::GovernorDenied { retry_after } => *retry_after,
            ApiError::UpstreamTimeout => UPSTREAM_TIMEOUT_RETRY,
            ApiError::UpstreamRateLimited => UPSTREAM_RATE_LIMIT_RETRY,
            _ => return None,
        };
        // Round partial seconds up so the hint is never early
        Some(wait.as_secs() + u64::from(wait.subsec_nanos() > 0))
    }

    fn label(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Bad Request",
            ApiError::NotFound(_) => "Not Found",
            ApiError::GovernorDenied { .. } | ApiError::UpstreamRateLimited => "Too Many Requests",
            ApiError::UpstreamTimeout => "Request Timeout",
            _ => "Internal Server Error",
        }
    }

    /// Message safe to show the caller.
    fn public_message(&self) -> String {
        match self {
            ApiError::Validation(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::GovernorDenied { .. } => {
                "Too many requests from this client. Please try again later.".to_string()
            }
            ApiError::UpstreamTimeout => {
                "The news service took too long to respond. Please try again.".to_string()
            }
            ApiError::UpstreamRateLimited => {
                "News service rate limit reached. Please try again later.".to_string()
            }
            ApiError::UpstreamAuthFailed(_) | ApiError::UpstreamUnexpected(_) => {
                UNAVAILABLE_MESSAGE.to_string()
            }
            ApiError::Storage(_) | ApiError::Internal(_) => {
                "An internal error occurred.".to_string()
            }
        }
    }
}

// == Conversions ==
impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout(_) => ApiError::UpstreamTimeout,
            FetchError::UpstreamRateLimited => ApiError::UpstreamRateLimited,
            FetchError::UpstreamAuthFailed(detail) => ApiError::UpstreamAuthFailed(detail),
            FetchError::UpstreamUnexpected(detail) => ApiError::UpstreamUnexpected(detail),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Io(e) => ApiError::Storage(e.to_string()),
            rejected => ApiError::Validation(rejected.to_string()),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Invalid(msg) => ApiError::Validation(msg),
            not_found @ BookingError::NotFound(_) => ApiError::NotFound(not_found.to_string()),
            BookingError::Intake(e) => e.into(),
            BookingError::Store(e) => e.into(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("{}", self);
        }

        let retry_after = self.retry_after();
        let mut body = json!({
            "success": false,
            "error": self.label(),
            "message": self.public_message(),
        });
        if let Some(secs) = retry_after {
            body["retryAfter"] = json!(secs);
        }

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

// == Result Type Alias ==
pub type Result<T> = std::result::Result<T, ApiError>;
