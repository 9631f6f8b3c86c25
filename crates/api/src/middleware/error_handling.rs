//! # Error Handling Middleware
//!
//! This module provides a standardized way to handle errors in the studio API.
//! It maps domain-specific errors to appropriate HTTP status codes and JSON
//! error responses, ensuring a consistent error handling experience across
//! both portals.
//!
//! The implementation is based on Axum's error handling mechanisms and integrates
//! with the shared `StudioError` type.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use studio_core::errors::StudioError;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps domain-specific `StudioError` instances and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate
/// status codes and JSON payloads.
///
/// # Example
///
/// ```
/// use axum::Json;
/// use studio_api::middleware::error_handling::AppError;
/// use studio_core::errors::StudioError;
///
/// async fn handler(name: String) -> Result<Json<String>, AppError> {
///     if name.trim().is_empty() {
///         return Err(AppError(StudioError::Validation("Name is required".to_string())));
///     }
///     Ok(Json(name))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub StudioError);

impl AppError {
    /// HTTP status the wrapped error is reported with.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            StudioError::NotFound(_) => StatusCode::NOT_FOUND,
            StudioError::Validation(_) => StatusCode::BAD_REQUEST,
            StudioError::Conflict(_) => StatusCode::CONFLICT,
            StudioError::Authentication(_) => StatusCode::UNAUTHORIZED,
            StudioError::Authorization(_) => StatusCode::FORBIDDEN,
            StudioError::Storage(_) => StatusCode::BAD_GATEWAY,
            StudioError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StudioError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts application errors to HTTP responses
///
/// This implementation maps each error type to the appropriate HTTP status code
/// and formats the error message into a JSON response body. Server-side
/// failures are logged with their full cause chain; the body only carries
/// the top-level message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self.0);
        }

        // Get the error message and format as JSON
        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        // Combine status code and JSON body into a response
        (status, body).into_response()
    }
}

/// Automatic conversion from StudioError to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, StudioError>` in handler functions that return `Result<T, AppError>`.
impl From<StudioError> for AppError {
    fn from(err: StudioError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, eyre::Report>` in handler functions that return `Result<T, AppError>`.
/// A `StudioError` carried inside the report keeps its own status; anything
/// else becomes a `StudioError::Database`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        match err.downcast::<StudioError>() {
            Ok(studio) => AppError(studio),
            Err(report) => AppError(StudioError::Database(report)),
        }
    }
}

/// Maps a StudioError to an HTTP response
///
/// # Arguments
///
/// * `err` - The StudioError to convert
///
/// # Returns
///
/// * `Response` - An HTTP response with appropriate status code and body
pub fn map_error(err: StudioError) -> Response {
    AppError(err).into_response()
}

/// Wraps a storage failure so it is reported as a bad gateway.
pub fn storage_error(err: eyre::Report) -> AppError {
    AppError(StudioError::Storage(format!("{:#}", err)))
}
