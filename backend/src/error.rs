//! Error types and error handling for the application
//!
//! This module defines the HTTP-boundary error type. Every handler returns
//! `AppError` on failure and `IntoResponse` turns it into a plain-text reply.

use crate::state::PersistenceError;
use crate::survey::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body is missing, not JSON, or has no `answers` field
    #[error("answers required")]
    MissingAnswers,

    /// An answer failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Request body exceeds the configured limit
    #[error("request body too large")]
    PayloadTooLarge,

    /// Clearing is disabled because no admin token is configured
    #[error("ADMIN_TOKEN is not configured")]
    AdminDisabled,

    /// Admin token header missing or wrong
    #[error("unauthorized")]
    Unauthorized,

    /// Error occurred while writing the survey store
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingAnswers | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::AdminDisabled => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, message).into_response()
    }
}
