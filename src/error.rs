//! Application error type and its HTTP mapping.
//!
//! Every fallible operation in the service layer returns [`AppError`]. Handlers
//! propagate it with `?` and axum turns it into a response through the
//! [`IntoResponse`] impl below:
//!
//! ```json
//! { "error": "not_found", "message": "Short URL not found", "code": 404 }
//! ```
//!
//! Rate-limit rejections are the exception: they are answered with a plain
//! text body.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Message shared by missing and expired links so callers cannot tell them apart.
pub const LINK_NOT_FOUND_MESSAGE: &str = "Short URL not found";

/// Body returned to clients when a request is rejected by the rate limiter.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Try again later.";

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    code: u16,
    #[serde(skip_serializing_if = "Value::is_null")]
    details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request body or destination URL.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// User-supplied short code has the wrong length or characters, or is reserved.
    #[error("{0}")]
    InvalidCustomCode(String),

    /// User-supplied short code is already taken.
    #[error("custom code already exists")]
    CodeConflict { code: String },

    /// The store refused an insert because the code exists.
    #[error("short code '{code}' already exists")]
    DuplicateCode { code: String },

    /// Every generation attempt collided with an existing code.
    #[error("failed to generate unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    #[error("short code '{code}' not found")]
    LinkNotFound { code: String },

    #[error("short code '{code}' has expired")]
    LinkExpired { code: String },

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::InvalidCustomCode(_)
            | Self::CodeConflict { .. }
            | Self::DuplicateCode { .. } => StatusCode::BAD_REQUEST,
            Self::LinkNotFound { .. } | Self::LinkExpired { .. } => StatusCode::NOT_FOUND,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::GenerationExhausted { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error kind placed in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } | Self::InvalidCustomCode(_) => "validation_error",
            Self::CodeConflict { .. } | Self::DuplicateCode { .. } => "code_conflict",
            Self::GenerationExhausted { .. } => "generation_exhausted",
            Self::LinkNotFound { .. } | Self::LinkExpired { .. } => "not_found",
            Self::RateLimitExceeded => "rate_limited",
            Self::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind();

        let (message, details) = match self {
            AppError::RateLimitExceeded => {
                return (status, RATE_LIMIT_MESSAGE).into_response();
            }
            AppError::Validation { message, details } => (message, details),
            AppError::Internal { message, details } => {
                tracing::error!(%message, %details, "Internal error");
                (message, Value::Null)
            }
            AppError::LinkNotFound { .. } | AppError::LinkExpired { .. } => {
                (LINK_NOT_FOUND_MESSAGE.to_string(), Value::Null)
            }
            AppError::CodeConflict { ref code } | AppError::DuplicateCode { ref code } => {
                let details = json!({ "code": code });
                ("Custom code already exists".to_string(), details)
            }
            other => (other.to_string(), Value::Null),
        };

        let body = ErrorBody {
            error: kind,
            message,
            code: status.as_u16(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::internal("Database error", json!({ "reason": e.to_string() }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request("Validation failed", json!({ "fields": e.to_string() }))
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::bad_request("Invalid request body", json!({ "reason": e.body_text() }))
    }
}

/// Converts a store error into [`AppError`], reporting unique-constraint
/// violations on `code` as [`AppError::DuplicateCode`].
pub fn map_sqlx_error(e: sqlx::Error, code: &str) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return AppError::DuplicateCode {
            code: code.to_string(),
        };
    }

    e.into()
}
