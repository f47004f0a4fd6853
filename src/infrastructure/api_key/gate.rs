//! Admission of requests carrying an API key

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::api_key::{
    mask_secret, AdmissionResult, AdmittedKey, ApiKeyRepository, Denial,
};
use crate::domain::user::UserId;

/// Decides whether a presented secret may reach the protected operation.
///
/// Read-only: admission never touches the usage counter.
#[derive(Debug)]
pub struct AccessGate<R>
where
    R: ApiKeyRepository + ?Sized,
{
    repository: Arc<R>,
}

impl<R: ApiKeyRepository + ?Sized> AccessGate<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Check `secret` for existence, ownership and quota.
    ///
    /// With `owner` absent every key is accepted regardless of who owns it.
    pub async fn admit(&self, secret: &str, owner: Option<&UserId>) -> AdmissionResult {
        let secret = secret.trim();
        if secret.is_empty() {
            return AdmissionResult::Unauthorized(Denial::MissingKey);
        }

        let api_key = match self.repository.get_by_secret(secret).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                debug!(key = %mask_secret(secret), "Unknown API key");
                return AdmissionResult::Unauthorized(Denial::UnknownKey);
            }
            Err(e) => {
                warn!(error = %e, "Key store unavailable during admission");
                return AdmissionResult::ServiceUnavailable {
                    reason: e.message(),
                };
            }
        };

        if let Some(owner) = owner {
            if !api_key.is_owned_by(owner) {
                debug!(key_id = %api_key.id(), owner = %owner, "API key owned by another principal");
                return AdmissionResult::Unauthorized(Denial::ForeignKey);
            }
        }

        let key = AdmittedKey::from(&api_key);

        if !api_key.has_quota() {
            debug!(
                key_id = %api_key.id(),
                usage = api_key.usage(),
                limit = api_key.limit(),
                "API key quota exhausted"
            );
            return AdmissionResult::QuotaExceeded {
                key,
                usage: api_key.usage(),
                limit: api_key.limit(),
            };
        }

        AdmissionResult::Admitted {
            key,
            remaining: api_key.remaining(),
            limit: api_key.limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyKind, MockApiKeyRepository};
    use crate::infrastructure::storage::UnconfiguredApiKeyRepository;

    fn key_with(owner: Option<&str>, secret: &str, usage: u64, limit: u64) -> ApiKey {
        ApiKey::new(
            ApiKeyId::generate(),
            owner.map(|o| UserId::new(o).unwrap()),
            "Key",
            secret,
            ApiKeyKind::Production,
            limit,
        )
        .with_usage(usage)
    }

    async fn gate_with(keys: Vec<ApiKey>) -> (AccessGate<MockApiKeyRepository>, Arc<MockApiKeyRepository>) {
        let repo = Arc::new(MockApiKeyRepository::new());
        for key in keys {
            repo.insert(key).await;
        }
        (AccessGate::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_admits_key_under_quota() {
        let key = key_with(Some("alice"), "dk_a", 3, 10);
        let (gate, _) = gate_with(vec![key.clone()]).await;

        match gate.admit("dk_a", None).await {
            AdmissionResult::Admitted { key: admitted, remaining, limit } => {
                assert_eq!(admitted.id, *key.id());
                assert_eq!(remaining, 7);
                assert_eq!(limit, 10);
            }
            other => panic!("expected admission, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quota_exceeded_at_limit() {
        let (gate, _) = gate_with(vec![key_with(Some("alice"), "dk_a", 2, 2)]).await;

        match gate.admit("dk_a", None).await {
            AdmissionResult::QuotaExceeded { usage, limit, .. } => {
                assert_eq!(usage, 2);
                assert_eq!(limit, 2);
            }
            other => panic!("expected quota exceeded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_limit_never_admits() {
        let (gate, _) = gate_with(vec![key_with(None, "dk_zero", 0, 0)]).await;
        assert!(matches!(
            gate.admit("dk_zero", None).await,
            AdmissionResult::QuotaExceeded { .. }
        ));
    }

    #[tokio::test]
    async fn test_unknown_key_is_unauthorized() {
        let (gate, _) = gate_with(vec![key_with(Some("alice"), "dk_a", 100, 10)]).await;

        assert_eq!(
            gate.admit("dk_unknown", None).await,
            AdmissionResult::Unauthorized(Denial::UnknownKey)
        );
    }

    #[tokio::test]
    async fn test_empty_secret_skips_lookup() {
        let (gate, repo) = gate_with(vec![]).await;

        assert_eq!(
            gate.admit("", None).await,
            AdmissionResult::Unauthorized(Denial::MissingKey)
        );
        assert_eq!(
            gate.admit("   ", None).await,
            AdmissionResult::Unauthorized(Denial::MissingKey)
        );
        assert_eq!(repo.secret_lookups(), 0);
    }

    #[tokio::test]
    async fn test_owner_scoped_admission() {
        let (gate, _) = gate_with(vec![
            key_with(Some("bob"), "dk_bob", 0, 10),
            key_with(None, "dk_global", 0, 10),
        ])
        .await;
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();

        assert_eq!(
            gate.admit("dk_bob", Some(&alice)).await,
            AdmissionResult::Unauthorized(Denial::ForeignKey)
        );
        assert!(gate.admit("dk_bob", Some(&bob)).await.is_admitted());
        assert!(gate.admit("dk_bob", None).await.is_admitted());
        assert_eq!(
            gate.admit("dk_global", Some(&alice)).await,
            AdmissionResult::Unauthorized(Denial::ForeignKey)
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_service_unavailable() {
        let (gate, repo) = gate_with(vec![key_with(None, "dk_a", 0, 10)]).await;
        repo.set_should_fail(true).await;

        assert!(matches!(
            gate.admit("dk_a", None).await,
            AdmissionResult::ServiceUnavailable { .. }
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_store_is_service_unavailable() {
        let gate = AccessGate::new(Arc::new(UnconfiguredApiKeyRepository));

        match gate.admit("dk_a", None).await {
            AdmissionResult::ServiceUnavailable { reason } => {
                assert_eq!(
                    reason,
                    "Database not configured. Please check your environment variables."
                );
            }
            other => panic!("expected unavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_admission_does_not_touch_usage() {
        let key = key_with(None, "dk_a", 1, 10);
        let (gate, repo) = gate_with(vec![key.clone()]).await;

        for _ in 0..3 {
            gate.admit("dk_a", None).await;
        }

        let stored = repo.get(key.id()).await.unwrap().unwrap();
        assert_eq!(stored.usage(), 1);
    }
}
