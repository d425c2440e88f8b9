//! Client-facing errors
//!
//! Every failure that leaves the service is a [`ServiceError`]: an HTTP
//! status, a stable machine-readable code and a message that is safe to show
//! a client. Store internals (paths, SQLite messages, I/O errors) are logged
//! here and replaced by a generic message.
//!
//! | Source | Status | Code |
//! |--------|--------|------|
//! | `ValidationError` | 400 | `validation_error` |
//! | `StoreError::Unavailable` | 503 | `store_unavailable` |
//! | `StoreError::Corrupt` | 500 | `store_corrupt` |
//! | anything else | 500 | `internal_error` |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scorekeep_core::{StoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Code for rejected input
pub const VALIDATION_ERROR: &str = "validation_error";
/// Code for a store that cannot be reached right now
pub const STORE_UNAVAILABLE: &str = "store_unavailable";
/// Code for a store whose contents cannot be read
pub const STORE_CORRUPT: &str = "store_corrupt";
/// Code for failures outside the store
pub const INTERNAL_ERROR: &str = "internal_error";

/// Error returned by `ResultService` and the HTTP handlers
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorPayload<'a>,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    code: &'a str,
    message: &'a str,
}

impl ServiceError {
    /// 400 with the given message
    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError {
            status: StatusCode::BAD_REQUEST,
            code: VALIDATION_ERROR,
            message: message.into(),
        }
    }

    /// 500 with a generic message; `detail` is only logged
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(target: "scorekeep::http", error = %detail, "Internal error");
        ServiceError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: INTERNAL_ERROR,
            message: "internal server error".to_string(),
        }
    }

    /// HTTP status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Client-safe message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the client may retry the same request
    pub fn is_retryable(&self) -> bool {
        self.status == StatusCode::SERVICE_UNAVAILABLE
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::bad_request(err.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => e.into(),
            StoreError::Unavailable { reason } => {
                warn!(target: "scorekeep::http", %reason, "Store unavailable");
                ServiceError {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    code: STORE_UNAVAILABLE,
                    message: "leaderboard storage is temporarily unavailable, retry later"
                        .to_string(),
                }
            }
            StoreError::Corrupt { reason } => {
                error!(target: "scorekeep::http", %reason, "Store corrupt");
                ServiceError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: STORE_CORRUPT,
                    message: "leaderboard storage could not be read".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorPayload {
                code: self.code,
                message: &self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
