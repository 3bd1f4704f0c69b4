use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Message not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ContactResult<T> = Result<T, ContactError>;

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::NotFound(id) => AppError::NotFound(format!("Message {} not found", id)),
            ContactError::Validation(msg) => AppError::BadRequest(msg),
            ContactError::Forbidden(msg) => AppError::Forbidden(msg),
            ContactError::Unauthorized(msg) => AppError::Unauthorized(msg),
            ContactError::Database(msg) => AppError::Database(msg),
            ContactError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ContactError {
    fn from(err: mongodb::error::Error) -> Self {
        ContactError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for ContactError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        ContactError::Database(err.to_string())
    }
}

/// Role checks from `CurrentUser::require_any`
impl From<AppError> for ContactError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Forbidden(msg) => ContactError::Forbidden(msg),
            AppError::Unauthorized(msg) => ContactError::Unauthorized(msg),
            other => ContactError::Internal(other.to_string()),
        }
    }
}
