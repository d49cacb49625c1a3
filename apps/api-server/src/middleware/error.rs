//! Error handling - JSON error bodies for the posts API.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quire_core::error::{DomainError, RepoError};
use quire_shared::ErrorResponse;

/// Application-level error type rendered as `{"error", "status"}` JSON.
///
/// The message is what the client sees. Infrastructure details are logged
/// where the error is created and never put in the message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_id() -> Self {
        AppError::BadRequest("Invalid ID".to_string())
    }

    /// Map a domain error, using `fallback` as the message for store failures.
    pub fn domain(fallback: &'static str) -> impl Fn(DomainError) -> AppError {
        move |err| match err {
            DomainError::Repository(repo) => {
                tracing::error!(error = %repo, "{}", fallback);
                AppError::Internal(fallback.to_string())
            }
            other => other.into(),
        }
    }

    /// JSON body for this error.
    pub fn body(&self) -> ErrorResponse {
        match self {
            AppError::BadRequest(msg) => ErrorResponse::bad_request(msg.as_str()),
            AppError::NotFound(msg) => ErrorResponse::not_found(msg.as_str()),
            AppError::Internal(msg) => ErrorResponse::internal_error(msg.as_str()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{} not found", entity_type))
            }
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Repository(repo) => repo.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) | RepoError::Constraint(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
