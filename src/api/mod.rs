//! API handlers for the bookstore REST endpoints

pub mod auth;
pub mod books;
pub mod faults;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
    routing::{delete, get, post, put},
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::TokenClaims, AppState};

/// Extractor for an authenticated caller from the bearer token
pub struct AuthenticatedUser(pub TokenClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| AppError::Authentication(e.to_string()))?;

        let claims = TokenClaims::from_token(bearer.token(), &state.config.auth)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// JSON body extractor whose rejections use the uniform error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameter extractor whose rejections use the uniform error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let bookstore = Router::new()
        .route("/GetBooks", get(books::get_books))
        .route("/GetBook/:id", get(books::get_book))
        .route("/PostBook", post(books::post_book))
        .route("/PutBook/:id", put(books::put_book))
        .route("/DeleteBook/:id", delete(books::delete_book));

    let api = Router::new()
        .nest("/BookStore", bookstore)
        .route("/Register", post(auth::register))
        .route("/Login", post(auth::login));

    let app = Router::new()
        .nest("/api", api)
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/Exception", get(faults::throw_exception))
        .fallback(faults::fallback)
        .with_state(state)
        .merge(openapi::create_openapi_router());

    with_middleware(app)
}

/// Wrap a router with fault catching, request tracing and CORS
pub fn with_middleware(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(CatchPanicLayer::custom(faults::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
