//! Registration and login endpoints

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{LoginRequest, RegisterRequest, TokenResponse},
    AppState,
};

use super::AppJson;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/Register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = TokenResponse),
        (status = 400, description = "Username already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    request.validate()?;

    state
        .services
        .auth
        .register(&request.username, &request.password)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::AlreadyExists(format!("Username '{}' already exists", request.username)))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/Login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    state
        .services
        .auth
        .login(&request.username, &request.password)
        .await?
        .map(Json)
        .ok_or(AppError::InvalidCredentials)
}
