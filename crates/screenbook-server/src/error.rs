//! Mapping of service errors onto HTTP responses.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use screenbook_core::error::ScreeningError;
use serde::Serialize;
use tracing::error;

/// Error returned from every handler.
///
/// Rendered as `{"error": {"code", "message", "retryable"}}`. Server-side
/// failures are logged with their detail and reported with a generic
/// message.
#[derive(Debug)]
pub struct ApiError(pub ScreeningError);

impl ApiError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self(ScreeningError::AuthenticationFailed {
            reason: reason.into(),
        })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(ScreeningError::validation(message))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ScreeningError::NotFound { .. } => StatusCode::NOT_FOUND,
            ScreeningError::Conflict { .. }
            | ScreeningError::InvalidTransition { .. }
            | ScreeningError::AlreadyCancelled { .. }
            | ScreeningError::AlreadySent { .. }
            | ScreeningError::Duplicate { .. } => StatusCode::CONFLICT,
            ScreeningError::InvalidCapacity { .. } | ScreeningError::Validation { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ScreeningError::NotPublished { .. } | ScreeningError::Forbidden { .. } => {
                StatusCode::FORBIDDEN
            }
            ScreeningError::InvalidOtp { .. } => StatusCode::BAD_REQUEST,
            ScreeningError::OtpAttemptsExceeded => StatusCode::TOO_MANY_REQUESTS,
            ScreeningError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ScreeningError::Notification(_) => StatusCode::BAD_GATEWAY,
            ScreeningError::Storage(_)
            | ScreeningError::Database(_)
            | ScreeningError::Crypto(_)
            | ScreeningError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match &self.0 {
            ScreeningError::NotFound { .. } => "NOT_FOUND",
            ScreeningError::Conflict { .. } => "CONFLICT",
            ScreeningError::InvalidTransition { .. } => "INVALID_TRANSITION",
            ScreeningError::InvalidCapacity { .. } => "INVALID_CAPACITY",
            ScreeningError::NotPublished { .. } => "NOT_PUBLISHED",
            ScreeningError::AlreadyCancelled { .. } => "ALREADY_CANCELLED",
            ScreeningError::InvalidOtp { .. } => "INVALID_OTP",
            ScreeningError::OtpAttemptsExceeded => "OTP_ATTEMPTS_EXCEEDED",
            ScreeningError::Forbidden { .. } => "FORBIDDEN",
            ScreeningError::AuthenticationFailed { .. } => "UNAUTHORIZED",
            ScreeningError::AlreadySent { .. } => "ALREADY_SENT",
            ScreeningError::Duplicate { .. } => "DUPLICATE",
            ScreeningError::Validation { .. } => "VALIDATION_ERROR",
            ScreeningError::Notification(_) => "NOTIFICATION_FAILED",
            ScreeningError::Storage(_) => "STORAGE_ERROR",
            ScreeningError::Database(_) => "DATABASE_ERROR",
            ScreeningError::Crypto(_) => "CRYPTO_ERROR",
            ScreeningError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ScreeningError> for ApiError {
    fn from(err: ScreeningError) -> Self {
        Self(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(format!("malformed multipart body: {}", err.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: String,
    retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            error!(code = self.code(), error = %self.0, "Request failed");
            "An internal error occurred".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message,
                retryable: self.0.is_retryable(),
            },
        };
        (status, Json(body)).into_response()
    }
}
