//! API Key repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ApiKey, ApiKeyId};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository trait for API key storage
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Get an API key by its ID
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError>;

    /// Exact-match lookup of the bearer secret
    async fn get_by_secret(&self, secret: &str) -> Result<Option<ApiKey>, DomainError>;

    /// Create a new API key. Fails with a conflict if the secret is taken.
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError>;

    /// Persist name, kind and limit. Usage is never written through here.
    ///
    /// With `owner` set, a key owned by anyone else is reported as not found.
    async fn update(&self, owner: Option<&UserId>, api_key: &ApiKey) -> Result<ApiKey, DomainError>;

    /// Delete an API key. With `owner` set, only that owner's key is removed.
    async fn delete(&self, owner: Option<&UserId>, id: &ApiKeyId) -> Result<bool, DomainError>;

    /// List keys newest first. `None` lists every key in the store.
    async fn list(&self, owner: Option<&UserId>) -> Result<Vec<ApiKey>, DomainError>;

    /// Count all keys
    async fn count(&self) -> Result<usize, DomainError>;

    /// Add one to usage in a single step and return the new value
    async fn increment_usage(&self, id: &ApiKeyId) -> Result<u64, DomainError>;

    /// Overwrite the usage counter
    async fn set_usage(&self, id: &ApiKeyId, usage: u64) -> Result<(), DomainError>;

    /// Whether `increment_usage` is a true single-step operation in this backend
    fn supports_atomic_increment(&self) -> bool {
        true
    }
}
