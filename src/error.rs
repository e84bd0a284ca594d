use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::store::{ProviderKind, StoreError};
use crate::validation::{FieldError, format_errors};

#[derive(Debug)]
pub enum AppError {
    Store(StoreError),
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

fn body(status: StatusCode, error: &'static str, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        success: false,
        error,
        message: message.into(),
        errors: None,
    };
    (status, Json(body)).into_response()
}

fn provider_response(kind: ProviderKind) -> Response {
    let (error, message) = match kind {
        ProviderKind::RateLimited => (
            "Service temporarily unavailable",
            "Our system is experiencing high traffic. Please try again in a few minutes.",
        ),
        ProviderKind::Auth => (
            "Service configuration error",
            "There was a problem with our system. Please contact us directly to submit your RSVP.",
        ),
        ProviderKind::Network => (
            "Network error",
            "We could not reach our guest list. Please try again in a moment.",
        ),
        ProviderKind::ServerError | ProviderKind::Unknown => (
            "Service temporarily unavailable",
            "Service temporarily unavailable. Please try again later.",
        ),
    };
    body(StatusCode::SERVICE_UNAVAILABLE, error, message)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Store(StoreError::InvalidCode(message)) => {
                body(StatusCode::BAD_REQUEST, "Invalid invitation code format", message)
            }
            AppError::Store(StoreError::Validation(errors)) => {
                let body = ErrorBody {
                    success: false,
                    error: "Validation failed",
                    message: format_errors(&errors),
                    errors: Some(errors),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AppError::Store(StoreError::NotFound) => body(
                StatusCode::NOT_FOUND,
                "Invitation code not found",
                "The provided invitation code was not found. Please check your code and try again.",
            ),
            AppError::Store(StoreError::GuestMismatch) => body(
                StatusCode::BAD_REQUEST,
                "Guest names mismatch",
                "The guest names in your RSVP do not match our records. Please contact us if you need to make changes.",
            ),
            // already logged with operation context by the store
            AppError::Store(StoreError::Provider { kind, .. }) => provider_response(kind),
            AppError::BadRequest(message) => body(StatusCode::BAD_REQUEST, "Bad request", message),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {e}");
        AppError::BadRequest(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        tracing::debug!("Rejected path parameters: {e}");
        AppError::BadRequest(e.body_text())
    }
}
