//! Signed session tokens identifying the signed-in owner

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::user::User;
use crate::domain::DomainError;

/// Session claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email the session resolves to
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(user: &User, ttl_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(ttl_hours as i64);

        Self {
            sub: user.id().as_str().to_string(),
            email: user.email().to_string(),
            name: user.name().map(str::to_string),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

/// Configuration for session tokens
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_hours: u64,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>, ttl_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours,
        }
    }
}

/// Issues and checks session tokens
pub trait SessionTokens: Send + Sync + Debug {
    fn issue(&self, user: &User) -> Result<String, DomainError>;

    fn validate(&self, token: &str) -> Result<SessionClaims, DomainError>;
}

/// HS256 session token service
#[derive(Clone)]
pub struct SessionTokenService {
    config: SessionConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for SessionTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("ttl_hours", &self.config.ttl_hours)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl SessionTokenService {
    pub fn new(config: SessionConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }
}

impl SessionTokens for SessionTokenService {
    fn issue(&self, user: &User) -> Result<String, DomainError> {
        let claims = SessionClaims::new(user, self.config.ttl_hours);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign session: {}", e)))
    }

    fn validate(&self, token: &str) -> Result<SessionClaims, DomainError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::unauthorized(format!("Invalid session: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;

    fn create_test_user() -> User {
        User::new(UserId::new("user-1").unwrap(), "dev@example.com")
            .unwrap()
            .with_name("Dev")
    }

    fn create_service(secret: &str) -> SessionTokenService {
        SessionTokenService::new(SessionConfig::new(secret, 24))
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_service("test-secret");
        let token = service.issue(&create_test_user()).unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "dev@example.com");
        assert_eq!(claims.name.as_deref(), Some("Dev"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_service("one").issue(&create_test_user()).unwrap();

        let result = create_service("two").validate(&token);
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_service("test-secret");
        let mut claims = SessionClaims::new(&create_test_user(), 1);
        claims.iat -= 7200;
        claims.exp = Utc::now().timestamp() - 3600;

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(create_service("s").validate("not.a.token").is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", create_service("super-secret"));
        assert!(!debug.contains("super-secret"));
    }
}
