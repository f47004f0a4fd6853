//! Storage factory for runtime backend selection

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::api_key::ApiKeyRepository;
use crate::domain::user::UserRepository;
use crate::domain::DomainError;
use crate::infrastructure::api_key::{InMemoryApiKeyRepository, PostgresApiKeyRepository};
use crate::infrastructure::user::{InMemoryUserRepository, PostgresUserRepository};

use super::migrations::run_migrations;
use super::postgres::{connect_pool, PostgresConfig};
use super::unconfigured::{UnconfiguredApiKeyRepository, UnconfiguredUserRepository};

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-memory storage (for testing/development)
    #[default]
    Memory,
    /// PostgreSQL storage
    Postgres,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres {
        config: PostgresConfig,
        run_migrations: bool,
    },
    /// Postgres was requested without connection details
    Unconfigured,
}

impl StorageConfig {
    /// Resolve the backend choice against the available connection URL
    pub fn resolve(
        backend: StorageBackend,
        url: Option<String>,
        max_connections: u32,
        run_migrations: bool,
    ) -> Self {
        match (backend, url) {
            (StorageBackend::Memory, _) => Self::InMemory,
            (StorageBackend::Postgres, Some(url)) if !url.trim().is_empty() => Self::Postgres {
                config: PostgresConfig::new(url).with_max_connections(max_connections),
                run_migrations,
            },
            (StorageBackend::Postgres, _) => Self::Unconfigured,
        }
    }
}

/// Repositories backing one running service
#[derive(Debug, Clone)]
pub struct Repositories {
    pub api_keys: Arc<dyn ApiKeyRepository>,
    pub users: Arc<dyn UserRepository>,
}

/// Factory for creating repository instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StorageConfig) -> Result<Repositories, DomainError> {
        match config {
            StorageConfig::InMemory => {
                info!("Using in-memory storage");
                Ok(Self::in_memory())
            }
            StorageConfig::Postgres {
                config,
                run_migrations: migrate,
            } => {
                let pool = connect_pool(config).await?;

                if *migrate {
                    let applied = run_migrations(&pool).await?;
                    info!(applied, "Database migrations complete");
                }

                let api_keys = PostgresApiKeyRepository::new(pool.clone());
                let atomic = atomic_support(api_keys.detect_atomic_increment().await);

                Ok(Repositories {
                    api_keys: Arc::new(api_keys.with_atomic_increment(atomic)),
                    users: Arc::new(PostgresUserRepository::new(pool)),
                })
            }
            StorageConfig::Unconfigured => {
                warn!("PostgreSQL selected but no database URL configured; key operations will fail with 503");
                Ok(Repositories {
                    api_keys: Arc::new(UnconfiguredApiKeyRepository),
                    users: Arc::new(UnconfiguredUserRepository),
                })
            }
        }
    }

    pub fn in_memory() -> Repositories {
        Repositories {
            api_keys: Arc::new(InMemoryApiKeyRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }
}

/// Whether `increment_api_key_usage` was detected; errors count as absent
fn atomic_support(detected: Result<bool, DomainError>) -> bool {
    detected.unwrap_or_else(|e| {
        warn!(error = %e, "Could not detect atomic usage increment; assuming unavailable");
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_support_treats_detection_error_as_unavailable() {
        assert!(atomic_support(Ok(true)));
        assert!(!atomic_support(Ok(false)));
        assert!(!atomic_support(Err(DomainError::storage("permission denied for pg_proc"))));
    }

    #[test]
    fn test_resolve_backend() {
        assert!(matches!(
            StorageConfig::resolve(StorageBackend::Memory, Some("postgres://x".into()), 5, true),
            StorageConfig::InMemory
        ));
        assert!(matches!(
            StorageConfig::resolve(StorageBackend::Postgres, None, 5, true),
            StorageConfig::Unconfigured
        ));
        assert!(matches!(
            StorageConfig::resolve(StorageBackend::Postgres, Some("  ".into()), 5, true),
            StorageConfig::Unconfigured
        ));

        match StorageConfig::resolve(StorageBackend::Postgres, Some("postgres://db".into()), 7, false) {
            StorageConfig::Postgres { config, run_migrations } => {
                assert_eq!(config.url, "postgres://db");
                assert_eq!(config.max_connections, 7);
                assert!(!run_migrations);
            }
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_storage_fails_fast() {
        let repos = StorageFactory::create(&StorageConfig::Unconfigured).await.unwrap();

        let result = repos.api_keys.count().await;
        assert!(matches!(result, Err(DomainError::NotConfigured { .. })));
    }

    #[tokio::test]
    async fn test_in_memory_storage() {
        let repos = StorageFactory::create(&StorageConfig::InMemory).await.unwrap();

        assert_eq!(repos.api_keys.count().await.unwrap(), 0);
        assert!(repos.api_keys.supports_atomic_increment());
    }
}
