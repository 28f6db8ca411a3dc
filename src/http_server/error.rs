//! Defines the custom `ApiError` type for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::json;

use crate::persistence::error::PersistenceError;

/// A custom error type for the API that can be converted into an HTTP response.
pub enum ApiError {
    /// Represents a resource that could not be found.
    NotFound(String),

    /// Represents a validation error for an unprocessable entity.
    UnprocessableEntity(String),

    /// Represents a generic internal server error.
    InternalServerError(String),
}

/// Converts a `PersistenceError` into an `ApiError`.
///
/// This allows for the convenient use of the `?` operator in handlers
/// on functions that return `Result<_, PersistenceError>`.
impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(msg) => ApiError::NotFound(msg),
            PersistenceError::InvalidInput(msg) => ApiError::UnprocessableEntity(msg),
            _ => ApiError::InternalServerError(err.to_string()),
        }
    }
}

/// Implements the conversion from `ApiError` into an `axum` response.
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::InternalServerError(err) => {
                tracing::error!("Internal server error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An internal server error occurred" }),
                )
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            ApiError::UnprocessableEntity(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}
