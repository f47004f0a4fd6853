//! In-memory API key repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// In-memory implementation of ApiKeyRepository
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    keys: Arc<RwLock<HashMap<ApiKeyId, ApiKey>>>,
    /// Index for secret -> key ID lookup
    secret_index: Arc<RwLock<HashMap<String, ApiKeyId>>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys.get(id).cloned())
    }

    async fn get_by_secret(&self, secret: &str) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        let secret_index = self.secret_index.read().await;

        Ok(secret_index.get(secret).and_then(|id| keys.get(id)).cloned())
    }

    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        let mut keys = self.keys.write().await;
        let mut secret_index = self.secret_index.write().await;

        if keys.contains_key(api_key.id()) {
            return Err(DomainError::conflict(format!(
                "API key with ID '{}' already exists",
                api_key.id()
            )));
        }

        if secret_index.contains_key(api_key.secret()) {
            return Err(DomainError::conflict("API key secret already exists"));
        }

        secret_index.insert(api_key.secret().to_string(), *api_key.id());
        keys.insert(*api_key.id(), api_key.clone());

        Ok(api_key)
    }

    async fn update(&self, owner: Option<&UserId>, api_key: &ApiKey) -> Result<ApiKey, DomainError> {
        let mut keys = self.keys.write().await;

        let stored = keys
            .get_mut(api_key.id())
            .filter(|k| owner.is_none_or(|o| k.is_owned_by(o)))
            .ok_or_else(|| DomainError::not_found("API key not found"))?;

        stored.set_name(api_key.name());
        stored.set_kind(api_key.kind());
        stored.set_limit(api_key.limit());

        Ok(stored.clone())
    }

    async fn delete(&self, owner: Option<&UserId>, id: &ApiKeyId) -> Result<bool, DomainError> {
        let mut keys = self.keys.write().await;
        let mut secret_index = self.secret_index.write().await;

        if !keys.get(id).is_some_and(|k| owner.is_none_or(|o| k.is_owned_by(o))) {
            return Ok(false);
        }

        match keys.remove(id) {
            Some(removed) => {
                secret_index.remove(removed.secret());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self, owner: Option<&UserId>) -> Result<Vec<ApiKey>, DomainError> {
        let keys = self.keys.read().await;

        let mut result: Vec<ApiKey> = keys
            .values()
            .filter(|k| owner.is_none_or(|o| k.is_owned_by(o)))
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        Ok(result)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.keys.read().await.len())
    }

    async fn increment_usage(&self, id: &ApiKeyId) -> Result<u64, DomainError> {
        let mut keys = self.keys.write().await;

        let key = keys
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("API key not found"))?;
        let usage = key.usage().saturating_add(1);
        key.set_usage(usage);

        Ok(usage)
    }

    async fn set_usage(&self, id: &ApiKeyId, usage: u64) -> Result<(), DomainError> {
        let mut keys = self.keys.write().await;

        let key = keys
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("API key not found"))?;
        key.set_usage(usage);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::ApiKeyKind;
    use std::time::Duration;

    fn create_test_key(owner: &str, secret: &str) -> ApiKey {
        ApiKey::new(
            ApiKeyId::generate(),
            Some(UserId::new(owner).unwrap()),
            "Test Key",
            secret,
            ApiKeyKind::Development,
            1000,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_by_secret() {
        let repo = InMemoryApiKeyRepository::new();
        let key = repo.create(create_test_key("u1", "dk_dev_one")).await.unwrap();

        let found = repo.get_by_secret("dk_dev_one").await.unwrap().unwrap();
        assert_eq!(found.id(), key.id());
        assert!(repo.get_by_secret("dk_dev_two").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_secret_rejected() {
        let repo = InMemoryApiKeyRepository::new();
        repo.create(create_test_key("u1", "dk_dev_one")).await.unwrap();

        let result = repo.create(create_test_key("u2", "dk_dev_one")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_preserves_usage() {
        let repo = InMemoryApiKeyRepository::new();
        let key = repo.create(create_test_key("u1", "dk_dev_one")).await.unwrap();
        repo.increment_usage(key.id()).await.unwrap();

        let mut stale = key.clone();
        stale.set_name("Renamed");
        stale.set_limit(5);
        let updated = repo.update(None, &stale).await.unwrap();

        assert_eq!(updated.name(), "Renamed");
        assert_eq!(updated.limit(), 5);
        assert_eq!(updated.usage(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_secret_index() {
        let repo = InMemoryApiKeyRepository::new();
        let key = repo.create(create_test_key("u1", "dk_dev_one")).await.unwrap();

        assert!(repo.delete(None, key.id()).await.unwrap());
        assert!(repo.get_by_secret("dk_dev_one").await.unwrap().is_none());
        assert!(!repo.delete(None, key.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_owner_scoped_mutations_ignore_foreign_keys() {
        let repo = InMemoryApiKeyRepository::new();
        let key = repo.create(create_test_key("u1", "dk_dev_one")).await.unwrap();
        let owner = UserId::new("u1").unwrap();
        let intruder = UserId::new("u2").unwrap();

        let mut renamed = key.clone();
        renamed.set_name("Hijacked");
        let result = repo.update(Some(&intruder), &renamed).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert!(!repo.delete(Some(&intruder), key.id()).await.unwrap());

        let stored = repo.get(key.id()).await.unwrap().unwrap();
        assert_eq!(stored.name(), key.name());

        renamed.set_name("Renamed");
        assert_eq!(repo.update(Some(&owner), &renamed).await.unwrap().name(), "Renamed");
        assert!(repo.delete(Some(&owner), key.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_newest_first_and_owner_scoped() {
        let repo = InMemoryApiKeyRepository::new();
        let first = repo.create(create_test_key("u1", "dk_dev_1")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = repo.create(create_test_key("u1", "dk_dev_2")).await.unwrap();
        repo.create(create_test_key("u2", "dk_dev_3")).await.unwrap();

        let owner = UserId::new("u1").unwrap();
        let listed = repo.list(Some(&owner)).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id(), second.id());
        assert_eq!(listed[1].id(), first.id());
        assert_eq!(repo.list(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let repo = Arc::new(InMemoryApiKeyRepository::new());
        let key = repo.create(create_test_key("u1", "dk_dev_1")).await.unwrap();

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let repo = repo.clone();
                let id = *key.id();
                tokio::spawn(async move { repo.increment_usage(&id).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = repo.get(key.id()).await.unwrap().unwrap();
        assert_eq!(stored.usage(), 50);
    }

    #[tokio::test]
    async fn test_increment_missing_key() {
        let repo = InMemoryApiKeyRepository::new();
        let result = repo.increment_usage(&ApiKeyId::generate()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
