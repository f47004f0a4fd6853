//! Usage metering for serviced requests

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::api_key::{ApiKeyId, ApiKeyRepository};
use crate::domain::DomainError;

/// How usage counters are incremented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeteringStrategy {
    /// Single-step increment executed by the store
    #[default]
    Atomic,
    /// Read the counter, then write it back plus one.
    ///
    /// Concurrent requests on the same key may under-count.
    ReadModifyWrite,
}

/// Adds one to a key's usage counter
#[async_trait]
pub trait UsageIncrementer: Send + Sync + std::fmt::Debug {
    /// Returns the usage after the increment
    async fn increment(&self, id: &ApiKeyId) -> Result<u64, DomainError>;

    fn strategy(&self) -> MeteringStrategy;
}

#[derive(Debug)]
pub struct AtomicUsageIncrementer {
    repository: Arc<dyn ApiKeyRepository>,
}

impl AtomicUsageIncrementer {
    pub fn new(repository: Arc<dyn ApiKeyRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl UsageIncrementer for AtomicUsageIncrementer {
    async fn increment(&self, id: &ApiKeyId) -> Result<u64, DomainError> {
        self.repository.increment_usage(id).await
    }

    fn strategy(&self) -> MeteringStrategy {
        MeteringStrategy::Atomic
    }
}

#[derive(Debug)]
pub struct ReadModifyWriteIncrementer {
    repository: Arc<dyn ApiKeyRepository>,
}

impl ReadModifyWriteIncrementer {
    pub fn new(repository: Arc<dyn ApiKeyRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl UsageIncrementer for ReadModifyWriteIncrementer {
    async fn increment(&self, id: &ApiKeyId) -> Result<u64, DomainError> {
        let current = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("API key not found"))?;

        let usage = current.usage().saturating_add(1);
        self.repository.set_usage(id, usage).await?;

        Ok(usage)
    }

    fn strategy(&self) -> MeteringStrategy {
        MeteringStrategy::ReadModifyWrite
    }
}

/// Build the incrementer for `requested`, downgrading to read-modify-write
/// when the repository has no atomic primitive
pub fn select_incrementer(
    requested: MeteringStrategy,
    repository: Arc<dyn ApiKeyRepository>,
) -> Arc<dyn UsageIncrementer> {
    match requested {
        MeteringStrategy::Atomic if repository.supports_atomic_increment() => {
            Arc::new(AtomicUsageIncrementer::new(repository))
        }
        MeteringStrategy::Atomic => {
            warn!("Atomic usage increment unavailable; falling back to read-modify-write");
            Arc::new(ReadModifyWriteIncrementer::new(repository))
        }
        MeteringStrategy::ReadModifyWrite => Arc::new(ReadModifyWriteIncrementer::new(repository)),
    }
}

/// Records completed requests against their key.
///
/// Failures are logged and swallowed: the caller already has its result.
#[derive(Debug)]
pub struct UsageMeter {
    incrementer: Arc<dyn UsageIncrementer>,
}

impl UsageMeter {
    pub fn new(incrementer: Arc<dyn UsageIncrementer>) -> Self {
        Self { incrementer }
    }

    pub fn strategy(&self) -> MeteringStrategy {
        self.incrementer.strategy()
    }

    /// Returns the new usage, or `None` when recording failed
    pub async fn record_usage(&self, id: &ApiKeyId) -> Option<u64> {
        match self.incrementer.increment(id).await {
            Ok(usage) => {
                debug!(key_id = %id, usage, "Usage recorded");
                Some(usage)
            }
            Err(e) => {
                warn!(key_id = %id, error = %e, "Failed to record API key usage");
                None
            }
        }
    }
}
