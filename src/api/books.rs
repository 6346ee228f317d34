//! Book catalog endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::book::Book,
    services::books::BookOutcome,
    AppState,
};

use super::{AppJson, AppPath, AuthenticatedUser};

/// List all books
#[utoipa::path(
    get,
    path = "/api/BookStore/GetBooks",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list_books().await?;
    Ok(Json(books))
}

/// Get a book by id
#[utoipa::path(
    get,
    path = "/api/BookStore/GetBook/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Malformed id", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Book>> {
    match state.services.books.get_book(id).await? {
        Some(book) => Ok(Json(book)),
        None => {
            tracing::warn!(book_id = id, "Book was not found in the bookstore");
            Err(AppError::NotFound(format!("Book with id {} not found", id)))
        }
    }
}

/// Add a book. An id of 0 lets storage assign one.
#[utoipa::path(
    post,
    path = "/api/BookStore/PostBook",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = Book,
    responses(
        (status = 200, description = "Book added", body = Book),
        (status = 400, description = "A book with this id already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn post_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    AppJson(book): AppJson<Book>,
) -> AppResult<Json<Book>> {
    let id = book.id;
    match state.services.books.add_book(book).await? {
        BookOutcome::Ok(book) => Ok(Json(book)),
        _ => Err(AppError::BadRequest(format!("Book with id {} already exists", id))),
    }
}

/// Replace every field of a book
#[utoipa::path(
    put,
    path = "/api/BookStore/PutBook/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = Book,
    responses(
        (status = 200, description = "Book updated"),
        (status = 400, description = "Id mismatch or book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn put_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
    AppJson(book): AppJson<Book>,
) -> AppResult<StatusCode> {
    match state.services.books.update_book(id, book).await? {
        BookOutcome::Ok(()) => Ok(StatusCode::OK),
        BookOutcome::Invalid => Err(AppError::BadRequest(format!(
            "Book id {} does not match id in the request body",
            id
        ))),
        BookOutcome::NotFound | BookOutcome::Conflict => {
            Err(AppError::BadRequest(format!("Book with id {} not found", id)))
        }
    }
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/BookStore/DeleteBook/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    match state.services.books.delete_book(id).await? {
        BookOutcome::Ok(()) => Ok(StatusCode::OK),
        _ => Err(AppError::NotFound(format!("Book with id {} not found", id))),
    }
}
