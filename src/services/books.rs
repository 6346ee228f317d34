//! Book record service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookChange},
    repository::{BookStore, CommitOutcome},
};

/// Outcome of a book operation whose expected failures are values, not errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookOutcome<T = ()> {
    Ok(T),
    /// No book with the requested id
    NotFound,
    /// Duplicate on add: the caller-supplied id is already taken.
    ///
    /// A concurrent modification detected at commit is not reported here;
    /// it surfaces as `AppError::Concurrency`.
    Conflict,
    /// Path id and payload id disagree on update
    Invalid,
}

impl<T> BookOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, BookOutcome::Ok(_))
    }
}

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// List every book
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        tracing::info!("Getting all the books from the bookstore");
        self.store.list_all().await
    }

    /// Get book by id, `None` when absent
    pub async fn get_book(&self, id: i32) -> AppResult<Option<Book>> {
        tracing::info!(book_id = id, "Getting book from the bookstore");
        Ok(self.store.find_by_id(id).await?.map(|tracked| tracked.book))
    }

    /// Add a book.
    ///
    /// Only the caller-supplied id is checked for collisions; an id of 0
    /// is always accepted and replaced by the one storage assigns.
    pub async fn add_book(&self, book: Book) -> AppResult<BookOutcome<Book>> {
        if self.store.exists(book.id).await? {
            tracing::warn!(book_id = book.id, "A book with this id already exists");
            return Ok(BookOutcome::Conflict);
        }

        match self.store.commit(vec![BookChange::Add(book)]).await? {
            CommitOutcome::Committed { added } => {
                let book = added
                    .into_iter()
                    .next()
                    .ok_or_else(|| AppError::Internal("Added book was not returned by storage".to_string()))?;
                tracing::info!(
                    book_id = book.id,
                    author = %book.author,
                    title = %book.title,
                    published_year = book.published_year,
                    genre = %book.genre,
                    "Book has been added to the bookstore"
                );
                Ok(BookOutcome::Ok(book))
            }
            CommitOutcome::Conflict { id } => Err(AppError::Concurrency { id }),
        }
    }

    /// Overwrite every field of the book stored under `id`.
    ///
    /// A concurrent modification is not retried: if the book vanished the
    /// result is `NotFound`, otherwise the conflict is returned as an error.
    pub async fn update_book(&self, id: i32, book: Book) -> AppResult<BookOutcome> {
        if id != book.id {
            tracing::warn!(book_id = id, body_id = book.id, "Book id does not match id in the request body");
            return Ok(BookOutcome::Invalid);
        }

        let Some(mut tracked) = self.store.find_by_id(id).await? else {
            tracing::warn!(book_id = id, "Book to update was not found");
            return Ok(BookOutcome::NotFound);
        };
        tracked.overwrite_from(&book);

        match self.store.commit(vec![BookChange::Update(tracked)]).await? {
            CommitOutcome::Committed { .. } => {
                tracing::info!(book_id = id, "Book has been updated");
                Ok(BookOutcome::Ok(()))
            }
            CommitOutcome::Conflict { id } => self.resolve_conflict(id, "updating").await,
        }
    }

    /// Remove the book stored under `id`
    pub async fn delete_book(&self, id: i32) -> AppResult<BookOutcome> {
        tracing::info!(book_id = id, "Deleting book from the bookstore");

        let Some(tracked) = self.store.find_by_id(id).await? else {
            tracing::warn!(book_id = id, "Book to delete was not found");
            return Ok(BookOutcome::NotFound);
        };

        match self.store.commit(vec![BookChange::Remove(tracked)]).await? {
            CommitOutcome::Committed { .. } => {
                tracing::info!(book_id = id, "Book has been removed");
                Ok(BookOutcome::Ok(()))
            }
            CommitOutcome::Conflict { id } => self.resolve_conflict(id, "deleting").await,
        }
    }

    /// Check storage connectivity
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }

    async fn resolve_conflict(&self, id: i32, action: &str) -> AppResult<BookOutcome> {
        if !self.store.exists(id).await? {
            tracing::warn!(book_id = id, "Book was removed concurrently");
            return Ok(BookOutcome::NotFound);
        }

        tracing::error!(book_id = id, "Concurrency conflict occurred while {} book", action);
        Err(AppError::Concurrency { id })
    }
}
