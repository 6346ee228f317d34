//! User account model, credential requests and token claims

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::config::AuthConfig;

/// Stored account credential. Never serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub username: String,
    /// Argon2 PHC string, never the raw password
    pub password_hash: String,
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// JWT claims for authenticated callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    /// Claims for `username`, valid for the configured lifetime starting now
    pub fn new(config: &AuthConfig, username: &str) -> Self {
        let now = Utc::now();
        Self {
            iss: config.jwt_issuer.clone(),
            aud: config.jwt_audience.clone(),
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(config.token_lifetime_minutes)).timestamp(),
        }
    }

    /// Sign the claims with HMAC-SHA-256
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse a token, checking signature, issuer, audience and lifetime
    pub fn from_token(token: &str, config: &AuthConfig) -> Result<Self, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: "issuer".to_string(),
            jwt_audience: "audience".to_string(),
            token_lifetime_minutes: 90,
        }
    }

    #[test]
    fn test_token_lifetime_is_ninety_minutes() {
        let claims = TokenClaims::new(&config(), "alice");
        assert_eq!(claims.exp - claims.iat, 90 * 60);
    }

    #[test]
    fn test_token_parses_back() {
        let config = config();
        let claims = TokenClaims::new(&config, "alice");
        let token = claims.create_token(&config.jwt_secret).unwrap();

        let parsed = TokenClaims::from_token(&token, &config).unwrap();
        assert_eq!(parsed, claims);
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let config = config();
        let token = TokenClaims::new(&config, "alice").create_token("other").unwrap();

        let err = TokenClaims::from_token(&token, &config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn test_token_rejects_wrong_audience() {
        let config = config();
        let mut claims = TokenClaims::new(&config, "alice");
        claims.aud = "someone-else".to_string();
        let token = claims.create_token(&config.jwt_secret).unwrap();

        let err = TokenClaims::from_token(&token, &config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidAudience));
    }

    #[test]
    fn test_token_rejects_wrong_issuer() {
        let config = config();
        let mut claims = TokenClaims::new(&config, "alice");
        claims.iss = "someone-else".to_string();
        let token = claims.create_token(&config.jwt_secret).unwrap();

        let err = TokenClaims::from_token(&token, &config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidIssuer));
    }

    #[test]
    fn test_token_rejects_expired() {
        let config = config();
        let mut claims = TokenClaims::new(&config, "alice");
        claims.iat -= 3 * 3600;
        claims.exp = claims.iat + 3600;
        let token = claims.create_token(&config.jwt_secret).unwrap();

        let err = TokenClaims::from_token(&token, &config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn test_register_request_requires_fields() {
        let request = RegisterRequest {
            username: String::new(),
            password: "pw".to_string(),
        };
        assert!(request.validate().is_err());

        let request = RegisterRequest {
            username: "alice".to_string(),
            password: "pw".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
