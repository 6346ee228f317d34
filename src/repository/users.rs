//! Users repository for credential storage

use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

/// Credential store keyed by username
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get user by username, `None` when absent
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert and commit a user. Fails with `AlreadyExists` if the username is taken.
    async fn add(&self, user: &User) -> AppResult<()>;
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Sqlite>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for UsersRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn add(&self, user: &User) -> AppResult<()> {
        sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(&user.username)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    AppError::AlreadyExists(format!("Username '{}' already exists", user.username))
                }
                other => AppError::Database(other),
            })?;

        Ok(())
    }
}
