//! Registration and login, issuing signed bearer tokens

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{TokenClaims, TokenResponse, User},
    services::{password::CredentialHasher, users::UsersService},
};

#[derive(Clone)]
pub struct AuthService {
    users: UsersService,
    hasher: Arc<dyn CredentialHasher>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(users: UsersService, hasher: Arc<dyn CredentialHasher>, config: AuthConfig) -> Self {
        Self { users, hasher, config }
    }

    /// Register a user and return a token.
    ///
    /// `None` when the username is already taken.
    pub async fn register(&self, username: &str, password: &str) -> AppResult<Option<TokenResponse>> {
        if self.users.get_by_username(username).await?.is_some() {
            tracing::warn!(username = %username, "Registration rejected, username already exists");
            return Ok(None);
        }

        let user = User {
            username: username.to_string(),
            password_hash: self.hasher.hash(password)?,
        };

        match self.users.add_user(&user).await {
            Ok(()) => {}
            // lost a race with a concurrent registration of the same name
            Err(AppError::AlreadyExists(_)) => {
                tracing::warn!(username = %username, "Registration rejected, username already exists");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        tracing::info!(username = %username, "User registered");
        self.issue_token(username).map(Some)
    }

    /// Verify credentials and return a token.
    ///
    /// `None` when the user is unknown or the password does not match.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<Option<TokenResponse>> {
        let Some(user) = self.users.get_by_username(username).await? else {
            tracing::warn!(username = %username, "Login rejected, unknown user");
            return Ok(None);
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::warn!(username = %username, "Login rejected, wrong password");
            return Ok(None);
        }

        tracing::info!(username = %username, "User logged in");
        self.issue_token(username).map(Some)
    }

    fn issue_token(&self, username: &str) -> AppResult<TokenResponse> {
        let claims = TokenClaims::new(&self.config, username);
        let token = claims.create_token(&self.config.jwt_secret)?;

        Ok(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: claims.exp - claims.iat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repository::users::MockUserRepository,
        services::password::{Argon2Hasher, MockCredentialHasher},
    };
    use mockall::predicate::eq;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "unit-secret".to_string(),
            jwt_issuer: "bookstore".to_string(),
            jwt_audience: "clients".to_string(),
            token_lifetime_minutes: 90,
        }
    }

    fn service(repository: MockUserRepository, hasher: Arc<dyn CredentialHasher>) -> AuthService {
        AuthService::new(UsersService::new(Arc::new(repository)), hasher, config())
    }

    fn stored(username: &str, password: &str) -> User {
        User {
            username: username.to_string(),
            password_hash: Argon2Hasher.hash(password).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_register_new_user_issues_valid_token() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_username()
            .with(eq("alice"))
            .returning(|_| Ok(None));
        repository
            .expect_add()
            .withf(|user| user.username == "alice" && user.password_hash != "pw1")
            .times(1)
            .returning(|_| Ok(()));

        let token = service(repository, Arc::new(Argon2Hasher))
            .register("alice", "pw1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 90 * 60);
        let claims = TokenClaims::from_token(&token.token, &config()).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[tokio::test]
    async fn test_register_existing_user_returns_none_without_hashing() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_username()
            .returning(|_| Ok(Some(stored("alice", "pw1"))));
        repository.expect_add().never();
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().never();

        let token = service(repository, Arc::new(hasher))
            .register("alice", "pw2")
            .await
            .unwrap();
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn test_register_losing_insert_race_returns_none() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_username().returning(|_| Ok(None));
        repository
            .expect_add()
            .returning(|_| Err(AppError::AlreadyExists("alice".to_string())));
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().returning(|_| Ok("hashed".to_string()));

        let token = service(repository, Arc::new(hasher))
            .register("alice", "pw1")
            .await
            .unwrap();
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn test_login_checks_password() {
        let mut repository = MockUserRepository::new();
        let user = stored("alice", "pw1");
        repository
            .expect_find_by_username()
            .with(eq("alice"))
            .returning(move |_| Ok(Some(user.clone())));
        let service = service(repository, Arc::new(Argon2Hasher));

        assert!(service.login("alice", "wrongpw").await.unwrap().is_none());

        let token = service.login("alice", "pw1").await.unwrap().unwrap();
        let claims = TokenClaims::from_token(&token.token, &config()).unwrap();
        assert_eq!(claims.iss, "bookstore");
        assert_eq!(claims.aud, "clients");
    }

    #[tokio::test]
    async fn test_login_unknown_user_returns_none() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_username().returning(|_| Ok(None));
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_verify().never();

        let token = service(repository, Arc::new(hasher))
            .login("nobody", "pw")
            .await
            .unwrap();
        assert!(token.is_none());
    }
}
