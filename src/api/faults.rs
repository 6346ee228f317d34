//! Catch-all fault handling: panics, unknown routes and the fault probe

use std::any::Any;

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{AppError, AppResult, ErrorResponse};

/// Turn a handler panic into the uniform 500 body
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    tracing::error!(detail = %detail, "An unhandled panic has occurred");

    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::fault(detail))).into_response()
}

/// JSON 404 for unknown routes
pub async fn fallback(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

/// Always faults, for checking the error body end to end
#[utoipa::path(
    get,
    path = "/Exception",
    tag = "health",
    responses(
        (status = 500, description = "Always", body = ErrorResponse)
    )
)]
pub async fn throw_exception() -> AppResult<StatusCode> {
    Err(AppError::Internal("for testing".to_string()))
}
