//! Repository layer for database operations

pub mod books;
pub mod users;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;

use crate::config::DatabaseConfig;

pub use books::{BookStore, BooksRepository, CommitOutcome};
pub use users::{UserRepository, UsersRepository};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
    pub books: BooksRepository,
    pub users: UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            books: BooksRepository::new(pool.clone()),
            users: UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open a pool for the configured database
    pub async fn connect(config: &DatabaseConfig) -> Result<Pool<Sqlite>, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        let pool_options = SqlitePoolOptions::new();

        // every connection to `sqlite::memory:` opens its own database,
        // so keep exactly one and never recycle it
        let pool_options = if config.url.contains(":memory:") {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
        };

        pool_options.connect_with(options).await
    }

    /// Apply embedded schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, BookChange, User};

    async fn repository() -> Repository {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            min_connections: 1,
        };
        let pool = Repository::connect(&config).await.unwrap();
        let repository = Repository::new(pool);
        repository.migrate().await.unwrap();
        repository
    }

    fn book(id: i32, title: &str) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: "Tolkien".to_string(),
            published_year: 1954,
            genre: "Fantasy".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_assigns_id_when_zero() {
        let repo = repository().await;

        let outcome = repo
            .books
            .commit(vec![BookChange::Add(book(0, "The Hobbit"))])
            .await
            .unwrap();

        let added = match outcome {
            CommitOutcome::Committed { added } => added,
            other => panic!("expected commit, got {:?}", other),
        };
        assert_eq!(added.len(), 1);
        assert!(added[0].id > 0);

        let stored = repo.books.find_by_id(added[0].id).await.unwrap().unwrap();
        assert_eq!(stored.book, added[0]);
        assert_eq!(stored.version, 0);
    }

    #[tokio::test]
    async fn test_add_keeps_caller_id() {
        let repo = repository().await;

        repo.books
            .commit(vec![BookChange::Add(book(42, "The Hobbit"))])
            .await
            .unwrap();

        assert!(repo.books.exists(42).await.unwrap());
        assert!(!repo.books.exists(43).await.unwrap());
    }

    #[tokio::test]
    async fn test_stale_update_conflicts_and_rolls_back() {
        let repo = repository().await;
        repo.books
            .commit(vec![BookChange::Add(book(1, "Original"))])
            .await
            .unwrap();

        let mut first = repo.books.find_by_id(1).await.unwrap().unwrap();
        let mut second = first.clone();

        first.book.title = "First writer".to_string();
        let outcome = repo.books.commit(vec![BookChange::Update(first)]).await.unwrap();
        assert_eq!(outcome, CommitOutcome::Committed { added: vec![] });

        second.book.title = "Second writer".to_string();
        let outcome = repo
            .books
            .commit(vec![
                BookChange::Add(book(2, "Staged alongside")),
                BookChange::Update(second),
            ])
            .await
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Conflict { id: 1 });

        let stored = repo.books.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.book.title, "First writer");
        assert_eq!(stored.version, 1);
        assert!(!repo.books.exists(2).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_vanished_book_conflicts() {
        let repo = repository().await;
        repo.books
            .commit(vec![BookChange::Add(book(7, "Gone"))])
            .await
            .unwrap();
        let tracked = repo.books.find_by_id(7).await.unwrap().unwrap();

        repo.books
            .commit(vec![BookChange::Remove(tracked.clone())])
            .await
            .unwrap();
        let outcome = repo.books.commit(vec![BookChange::Remove(tracked)]).await.unwrap();

        assert_eq!(outcome, CommitOutcome::Conflict { id: 7 });
    }

    #[tokio::test]
    async fn test_list_all_is_stable() {
        let repo = repository().await;
        repo.books
            .commit(vec![
                BookChange::Add(book(0, "One")),
                BookChange::Add(book(0, "Two")),
            ])
            .await
            .unwrap();

        let first = repo.books.list_all().await.unwrap();
        let second = repo.books.list_all().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(first[0].title, "One");
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected_by_storage() {
        let repo = repository().await;
        let user = User {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
        };

        repo.users.add(&user).await.unwrap();
        let err = repo.users.add(&user).await.unwrap_err();

        assert!(matches!(err, crate::error::AppError::AlreadyExists(_)));
        assert_eq!(repo.users.find_by_username("alice").await.unwrap(), Some(user));
        assert_eq!(repo.users.find_by_username("bob").await.unwrap(), None);
    }
}
