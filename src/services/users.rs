//! User record service

use std::sync::Arc;

use crate::{error::AppResult, models::user::User, repository::UserRepository};

#[derive(Clone)]
pub struct UsersService {
    repository: Arc<dyn UserRepository>,
}

impl UsersService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.repository.find_by_username(username).await
    }

    /// Persist a new user. Callers check for an existing username first.
    pub async fn add_user(&self, user: &User) -> AppResult<()> {
        self.repository.add(user).await?;
        tracing::debug!(username = %user.username, "User stored");
        Ok(())
    }
}
