//! Error handling - failures rendered as `{ ok: false, error }` form responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use formguard_shared::FormResponse;
use std::fmt;

const GENERIC_ERROR: &str = "Er ging iets mis. Probeer het later opnieuw.";

/// Application-level error type. Messages are shown to site visitors.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// A downstream service is missing or failing; the message is user-facing.
    Unavailable(String),
    /// Logged, never shown.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::BadRequest(msg) | AppError::Unavailable(msg) => FormResponse::error(msg),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                FormResponse::error(GENERIC_ERROR)
            }
        };

        HttpResponse::build(self.status_code())
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(body)
    }
}

// Conversion from domain errors
impl From<formguard_core::DomainError> for AppError {
    fn from(err: formguard_core::DomainError) -> Self {
        match err {
            formguard_core::DomainError::Validation(msg) => AppError::BadRequest(msg),
            formguard_core::DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
