//! Owner-scoped API key management

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::api_key::{
    mask_secret, validate_key_name, validate_limit, ApiKey, ApiKeyId, ApiKeyKind, ApiKeyPatch,
    ApiKeyRepository, DEFAULT_USAGE_LIMIT,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

use super::generator::SecretGenerator;

const KEY_NOT_FOUND: &str = "API key not found";

/// Attempts at drawing an unused secret before giving up
const MAX_SECRET_ATTEMPTS: usize = 3;

/// Creates, reads, updates and deletes keys on behalf of one owner at a time.
///
/// A key that exists but belongs to someone else is indistinguishable from a
/// missing one.
#[derive(Debug)]
pub struct KeyLifecycleManager<R>
where
    R: ApiKeyRepository + ?Sized,
{
    repository: Arc<R>,
    generator: SecretGenerator,
    default_limit: u64,
}

impl<R: ApiKeyRepository + ?Sized> KeyLifecycleManager<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            generator: SecretGenerator::new(),
            default_limit: DEFAULT_USAGE_LIMIT,
        }
    }

    /// Quota applied when `create` receives no limit
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Issue a new key. The returned entity carries the full secret.
    pub async fn create(
        &self,
        owner: &UserId,
        name: &str,
        kind: ApiKeyKind,
        limit: Option<i64>,
    ) -> Result<ApiKey, DomainError> {
        let name = validate_key_name(name).map_err(|e| DomainError::validation(e.to_string()))?;
        let limit = match limit {
            Some(limit) => validate_limit(limit).map_err(|e| DomainError::validation(e.to_string()))?,
            None => self.default_limit,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let secret = self.generator.generate(kind);
            let api_key = ApiKey::new(
                ApiKeyId::generate(),
                Some(owner.clone()),
                name.clone(),
                secret,
                kind,
                limit,
            );

            match self.repository.create(api_key).await {
                Ok(created) => {
                    info!(
                        key_id = %created.id(),
                        owner = %owner,
                        kind = %kind,
                        limit,
                        "API key created"
                    );
                    return Ok(created);
                }
                Err(DomainError::Conflict { .. }) if attempt < MAX_SECRET_ATTEMPTS => {
                    warn!(attempt, "Generated secret collided, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Keys of `owner`, newest first
    pub async fn list(&self, owner: &UserId) -> Result<Vec<ApiKey>, DomainError> {
        let keys = self.repository.list(Some(owner)).await?;
        debug!(owner = %owner, count = keys.len(), "Listed API keys");
        Ok(keys)
    }

    pub async fn get_one(&self, owner: &UserId, id: &ApiKeyId) -> Result<ApiKey, DomainError> {
        self.repository
            .get(id)
            .await?
            .filter(|key| key.is_owned_by(owner))
            .ok_or_else(|| DomainError::not_found(KEY_NOT_FOUND))
    }

    /// Apply the fields present in `patch`. Input is validated before the
    /// stored key is touched.
    pub async fn update(
        &self,
        owner: &UserId,
        id: &ApiKeyId,
        patch: ApiKeyPatch,
    ) -> Result<ApiKey, DomainError> {
        if patch.is_empty() {
            return Err(DomainError::validation("No valid fields to update"));
        }

        let name = patch
            .name
            .as_deref()
            .map(validate_key_name)
            .transpose()
            .map_err(|e| DomainError::validation(e.to_string()))?;
        let limit = patch
            .limit
            .map(validate_limit)
            .transpose()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let mut api_key = self.get_one(owner, id).await?;

        if let Some(name) = name {
            api_key.set_name(name);
        }
        if let Some(kind) = patch.kind {
            api_key.set_kind(kind);
        }
        if let Some(limit) = limit {
            api_key.set_limit(limit);
        }

        let updated = self.repository.update(Some(owner), &api_key).await?;
        info!(key_id = %id, owner = %owner, "API key updated");

        Ok(updated)
    }

    /// Delete a key. Deleting a missing or foreign key is an error.
    pub async fn delete(&self, owner: &UserId, id: &ApiKeyId) -> Result<(), DomainError> {
        let api_key = self.get_one(owner, id).await?;

        if !self.repository.delete(Some(owner), id).await? {
            return Err(DomainError::not_found(KEY_NOT_FOUND));
        }

        info!(
            key_id = %id,
            owner = %owner,
            key = %mask_secret(api_key.secret()),
            "API key deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::MockApiKeyRepository;
    use crate::infrastructure::api_key::InMemoryApiKeyRepository;

    fn owner(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn create_manager() -> KeyLifecycleManager<InMemoryApiKeyRepository> {
        KeyLifecycleManager::new(Arc::new(InMemoryApiKeyRepository::new()))
    }

    #[tokio::test]
    async fn test_create_then_get_one() {
        let manager = create_manager();
        let alice = owner("alice");

        let created = manager
            .create(&alice, "Default", ApiKeyKind::Development, None)
            .await
            .unwrap();
        let fetched = manager.get_one(&alice, created.id()).await.unwrap();

        assert_eq!(fetched.usage(), 0);
        assert_eq!(fetched.limit(), 1000);
        assert!(fetched.secret().starts_with("dk_dev_"));
        assert_eq!(fetched.secret(), created.secret());
    }

    #[tokio::test]
    async fn test_create_with_explicit_limit() {
        let manager = create_manager();
        let created = manager
            .create(&owner("alice"), "Prod", ApiKeyKind::Production, Some(25))
            .await
            .unwrap();

        assert_eq!(created.limit(), 25);
        assert!(created.secret().starts_with("dk_"));
    }

    #[tokio::test]
    async fn test_custom_default_limit() {
        let manager = create_manager().with_default_limit(50);
        let created = manager
            .create(&owner("alice"), "Key", ApiKeyKind::Development, None)
            .await
            .unwrap();

        assert_eq!(created.limit(), 50);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let manager = create_manager();
        let alice = owner("alice");

        let result = manager.create(&alice, "  ", ApiKeyKind::Development, None).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        let result = manager
            .create(&alice, "Key", ApiKeyKind::Development, Some(-1))
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        assert!(manager.list(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cross_owner_access_is_not_found() {
        let manager = create_manager();
        let alice = owner("alice");
        let bob = owner("bob");

        let key = manager
            .create(&bob, "Bob's", ApiKeyKind::Development, None)
            .await
            .unwrap();

        assert!(manager.list(&alice).await.unwrap().is_empty());
        assert!(matches!(
            manager.get_one(&alice, key.id()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            manager
                .update(
                    &alice,
                    key.id(),
                    ApiKeyPatch {
                        name: Some("stolen".into()),
                        ..Default::default()
                    }
                )
                .await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            manager.delete(&alice, key.id()).await,
            Err(DomainError::NotFound { .. })
        ));

        let untouched = manager.get_one(&bob, key.id()).await.unwrap();
        assert_eq!(untouched.name(), "Bob's");
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let manager = create_manager();
        let alice = owner("alice");
        let key = manager
            .create(&alice, "Original", ApiKeyKind::Development, Some(10))
            .await
            .unwrap();

        let updated = manager
            .update(
                &alice,
                key.id(),
                ApiKeyPatch {
                    kind: Some(ApiKeyKind::Production),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name(), "Original");
        assert_eq!(updated.kind(), ApiKeyKind::Production);
        assert_eq!(updated.limit(), 10);
        assert_eq!(updated.secret(), key.secret());
    }

    #[tokio::test]
    async fn test_update_negative_limit_leaves_key_unchanged() {
        let manager = create_manager();
        let alice = owner("alice");
        let key = manager
            .create(&alice, "Key", ApiKeyKind::Development, Some(10))
            .await
            .unwrap();

        let result = manager
            .update(
                &alice,
                key.id(),
                ApiKeyPatch {
                    name: Some("Renamed".into()),
                    limit: Some(-1),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        let stored = manager.get_one(&alice, key.id()).await.unwrap();
        assert_eq!(stored.limit(), 10);
        assert_eq!(stored.name(), "Key");
    }

    #[tokio::test]
    async fn test_empty_patch_rejected() {
        let manager = create_manager();
        let alice = owner("alice");
        let key = manager
            .create(&alice, "Key", ApiKeyKind::Development, None)
            .await
            .unwrap();

        let err = manager
            .update(&alice, key.id(), ApiKeyPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "No valid fields to update");
    }

    #[tokio::test]
    async fn test_delete_is_not_idempotent() {
        let manager = create_manager();
        let alice = owner("alice");
        let key = manager
            .create(&alice, "Key", ApiKeyKind::Development, None)
            .await
            .unwrap();

        manager.delete(&alice, key.id()).await.unwrap();

        assert!(matches!(
            manager.get_one(&alice, key.id()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            manager.delete(&alice, key.id()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let manager = create_manager();
        let alice = owner("alice");

        let first = manager
            .create(&alice, "First", ApiKeyKind::Development, None)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = manager
            .create(&alice, "Second", ApiKeyKind::Production, None)
            .await
            .unwrap();

        let keys = manager.list(&alice).await.unwrap();
        let ids: Vec<_> = keys.iter().map(|k| *k.id()).collect();
        assert_eq!(ids, vec![*second.id(), *first.id()]);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let repo = Arc::new(MockApiKeyRepository::new());
        repo.set_should_fail(true).await;
        let manager = KeyLifecycleManager::new(repo);

        let result = manager.list(&owner("alice")).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
