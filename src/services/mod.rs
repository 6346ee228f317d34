//! Business logic services

pub mod auth;
pub mod books;
pub mod password;
pub mod users;

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    repository::{BookStore, Repository, UserRepository},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub users: users::UsersService,
    pub auth: auth::AuthService,
}

impl Services {
    /// Create all services backed by the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self::with_stores(
            Arc::new(repository.books),
            Arc::new(repository.users),
            Arc::new(password::Argon2Hasher),
            auth_config,
        )
    }

    /// Create all services from explicit storage and hashing capabilities
    pub fn with_stores(
        books: Arc<dyn BookStore>,
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn password::CredentialHasher>,
        auth_config: AuthConfig,
    ) -> Self {
        let users = users::UsersService::new(users);
        Self {
            books: books::BooksService::new(books),
            auth: auth::AuthService::new(users.clone(), hasher, auth_config),
            users,
        }
    }
}
