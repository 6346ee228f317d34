//! Books repository: the persistence gateway for catalog entries

use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookChange, TrackedBook},
};

/// Result of committing a batch of staged changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every change was applied. `added` holds inserted books with their final ids.
    Committed { added: Vec<Book> },
    /// The book with `id` changed since it was read; nothing was applied.
    Conflict { id: i32 },
}

/// Record store for books
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Get a book and its version marker, `None` when absent
    async fn find_by_id(&self, id: i32) -> AppResult<Option<TrackedBook>>;

    /// Check whether a book with `id` is stored
    async fn exists(&self, id: i32) -> AppResult<bool>;

    /// Full scan in insertion order
    async fn list_all(&self) -> AppResult<Vec<Book>>;

    /// Apply staged changes atomically
    async fn commit(&self, changes: Vec<BookChange>) -> AppResult<CommitOutcome>;

    /// Check storage connectivity
    async fn ping(&self) -> AppResult<()>;
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<TrackedBook>> {
        let book = sqlx::query_as::<_, TrackedBook>(
            r#"
            SELECT id, title, author, published_year, genre, version
            FROM books
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists != 0)
    }

    async fn list_all(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, published_year, genre FROM books ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn commit(&self, changes: Vec<BookChange>) -> AppResult<CommitOutcome> {
        let mut tx = self.pool.begin().await?;
        let mut added = Vec::new();

        for change in changes {
            match change {
                BookChange::Add(mut book) => {
                    let result = if book.id == 0 {
                        sqlx::query(
                            "INSERT INTO books (title, author, published_year, genre) VALUES (?, ?, ?, ?)",
                        )
                        .bind(&book.title)
                        .bind(&book.author)
                        .bind(book.published_year)
                        .bind(&book.genre)
                        .execute(&mut *tx)
                        .await?
                    } else {
                        sqlx::query(
                            "INSERT INTO books (id, title, author, published_year, genre) VALUES (?, ?, ?, ?, ?)",
                        )
                        .bind(book.id)
                        .bind(&book.title)
                        .bind(&book.author)
                        .bind(book.published_year)
                        .bind(&book.genre)
                        .execute(&mut *tx)
                        .await?
                    };

                    book.id = i32::try_from(result.last_insert_rowid()).map_err(|_| {
                        AppError::Internal(format!(
                            "Assigned book id {} is out of range",
                            result.last_insert_rowid()
                        ))
                    })?;
                    added.push(book);
                }
                BookChange::Update(tracked) => {
                    let result = sqlx::query(
                        r#"
                        UPDATE books
                        SET title = ?, author = ?, published_year = ?, genre = ?, version = version + 1
                        WHERE id = ? AND version = ?
                        "#,
                    )
                    .bind(&tracked.book.title)
                    .bind(&tracked.book.author)
                    .bind(tracked.book.published_year)
                    .bind(&tracked.book.genre)
                    .bind(tracked.book.id)
                    .bind(tracked.version)
                    .execute(&mut *tx)
                    .await?;

                    if result.rows_affected() == 0 {
                        tx.rollback().await?;
                        return Ok(CommitOutcome::Conflict { id: tracked.book.id });
                    }
                }
                BookChange::Remove(tracked) => {
                    let result = sqlx::query("DELETE FROM books WHERE id = ? AND version = ?")
                        .bind(tracked.book.id)
                        .bind(tracked.version)
                        .execute(&mut *tx)
                        .await?;

                    if result.rows_affected() == 0 {
                        tx.rollback().await?;
                        return Ok(CommitOutcome::Conflict { id: tracked.book.id });
                    }
                }
            }
        }

        tx.commit().await?;
        Ok(CommitOutcome::Committed { added })
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
