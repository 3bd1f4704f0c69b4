//! Event domain error types

use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

pub type EventResult<T> = Result<T, EventError>;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event not found: {0}")]
    NotFound(Uuid),

    #[error("Registration not found: {0}")]
    RegistrationNotFound(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Publishing blocked; one entry per missing or inconsistent part
    #[error("Event cannot be published: {}", .0.join("; "))]
    Incomplete(Vec<String>),

    /// State does not allow the operation (already registered, full, closed, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound(id) => AppError::NotFound(format!("Event {} not found", id)),
            EventError::RegistrationNotFound(id) => {
                AppError::NotFound(format!("Registration {} not found", id))
            }
            EventError::Validation(msg) => AppError::BadRequest(msg),
            err @ EventError::Incomplete(_) => AppError::BadRequest(err.to_string()),
            EventError::Conflict(msg) => AppError::Conflict(msg),
            EventError::Forbidden(msg) => AppError::Forbidden(msg),
            EventError::Unauthorized(msg) => AppError::Unauthorized(msg),
            EventError::Database(msg) => AppError::Database(msg),
            EventError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for EventError {
    fn from(err: mongodb::error::Error) -> Self {
        EventError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for EventError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        EventError::Database(err.to_string())
    }
}

impl From<AppError> for EventError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Forbidden(msg) => EventError::Forbidden(msg),
            AppError::Unauthorized(msg) => EventError::Unauthorized(msg),
            other => EventError::Internal(other.to_string()),
        }
    }
}
