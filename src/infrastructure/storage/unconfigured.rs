//! Stand-ins used when no database is configured.
//!
//! Every call fails immediately with `NotConfigured`; nothing touches the network.

use async_trait::async_trait;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

pub const DATABASE_NOT_CONFIGURED: &str =
    "Database not configured. Please check your environment variables.";

fn not_configured() -> DomainError {
    DomainError::not_configured(DATABASE_NOT_CONFIGURED)
}

#[derive(Debug, Default)]
pub struct UnconfiguredApiKeyRepository;

#[async_trait]
impl ApiKeyRepository for UnconfiguredApiKeyRepository {
    async fn get(&self, _id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        Err(not_configured())
    }

    async fn get_by_secret(&self, _secret: &str) -> Result<Option<ApiKey>, DomainError> {
        Err(not_configured())
    }

    async fn create(&self, _api_key: ApiKey) -> Result<ApiKey, DomainError> {
        Err(not_configured())
    }

    async fn update(&self, _owner: Option<&UserId>, _api_key: &ApiKey) -> Result<ApiKey, DomainError> {
        Err(not_configured())
    }

    async fn delete(&self, _owner: Option<&UserId>, _id: &ApiKeyId) -> Result<bool, DomainError> {
        Err(not_configured())
    }

    async fn list(&self, _owner: Option<&UserId>) -> Result<Vec<ApiKey>, DomainError> {
        Err(not_configured())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Err(not_configured())
    }

    async fn increment_usage(&self, _id: &ApiKeyId) -> Result<u64, DomainError> {
        Err(not_configured())
    }

    async fn set_usage(&self, _id: &ApiKeyId, _usage: u64) -> Result<(), DomainError> {
        Err(not_configured())
    }
}

#[derive(Debug, Default)]
pub struct UnconfiguredUserRepository;

#[async_trait]
impl UserRepository for UnconfiguredUserRepository {
    async fn get(&self, _id: &UserId) -> Result<Option<User>, DomainError> {
        Err(not_configured())
    }

    async fn get_by_email(&self, _email: &str) -> Result<Option<User>, DomainError> {
        Err(not_configured())
    }

    async fn upsert(&self, _user: User) -> Result<User, DomainError> {
        Err(not_configured())
    }
}
