//! Error types for the bookstore server

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message carried by every 5xx response body
pub const FAULT_MESSAGE: &str = "An error occurred while processing your request";

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Book with id {id} was modified concurrently")]
    Concurrency { id: i32 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::AlreadyExists(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Concurrency { .. }
            | AppError::Database(_)
            | AppError::Token(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fault text reported in the `detailed` field
    pub fn detail(&self) -> String {
        match self {
            AppError::Internal(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Error response body, shared by handled errors and caught faults
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub detailed: String,
}

impl ErrorResponse {
    /// Body for an unhandled fault: fixed message, fault text in `detailed`
    pub fn fault(detailed: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            message: FAULT_MESSAGE.to_string(),
            detailed: detailed.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = if status.is_server_error() {
            tracing::error!(error = %self, "An unhandled error has occurred");
            ErrorResponse::fault(self.detail())
        } else {
            let message = match &self {
                AppError::Authentication(_) => "Authentication required",
                AppError::InvalidCredentials => "Unauthorized",
                AppError::NotFound(_) => "Resource not found",
                AppError::AlreadyExists(_) => "Username already exists",
                _ => "Bad request",
            };
            ErrorResponse {
                status_code: status.as_u16(),
                message: message.to_string(),
                detailed: self.detail(),
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
