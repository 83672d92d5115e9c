//! Application error type with HTTP response conversion.
//!
//! Every failure leaving a handler is an [`AppError`]. It carries a
//! [`ErrorKind`] tag from the fixed taxonomy, the HTTP status derived from
//! that tag, and the underlying [`anyhow::Error`]. The response body is the
//! canonical envelope:
//!
//! ```json
//! { "success": false, "message": "Course not found", "code": "not_found" }
//! ```
//!
//! Internal errors are logged in full and rendered with a generic message.

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationErrors;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error taxonomy shared by every route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing, malformed, forged, or expired credential
    Unauthenticated,
    /// Known identity whose role is not allowed on the route
    Forbidden,
    /// Credential is valid but no live identity matches its email
    UnknownIdentity,
    /// Referenced record does not exist
    NotFound,
    /// Missing or malformed input
    ValidationError,
    /// The store applied no change
    UpdateFailed,
    /// Unexpected store or processor failure
    InternalError,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden | ErrorKind::UnknownIdentity => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::UpdateFailed => StatusCode::CONFLICT,
            ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::UnknownIdentity => "unknown_identity",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::UpdateFailed => "update_failed",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub kind: ErrorKind,
    pub error: Error,
}

/// Error body rendered by [`AppError`].
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: &'static str,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status: kind.status(),
            kind,
            error: err.into(),
        }
    }

    fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, anyhow!(message.into()))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Unauthenticated, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Forbidden, message)
    }

    pub fn unknown_identity(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::UnknownIdentity, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::ValidationError, message)
    }

    /// DTO validation failure; same kind as [`AppError::bad_request`] but 422.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        let mut err = Self::with_message(ErrorKind::ValidationError, message);
        err.status = StatusCode::UNPROCESSABLE_ENTITY;
        err
    }

    pub fn update_failed(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::UpdateFailed, message)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::InternalError, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::InternalError, message)
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        Self::unprocessable(format_validation_errors(errors))
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self.kind {
            ErrorKind::InternalError => INTERNAL_MESSAGE.to_string(),
            _ => self.error.to_string(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.kind == ErrorKind::InternalError {
            tracing::error!(error = ?self.error, "Request failed with internal error");
        }

        let body = ErrorResponse {
            success: false,
            message: self.public_message(),
            code: self.kind.code(),
        };

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

/// Flattens field errors into `"field is invalid"` style messages.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join(", ")
}
