//! Per-caller request throttling for the unauthenticated demo endpoint

use async_trait::async_trait;
use std::fmt::Debug;

/// Outcome of a throttling check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the current window after this one
    pub remaining: u32,
    pub limit: u32,
    /// Seconds until the caller's window resets
    pub reset_in_seconds: u64,
}

/// Process-scoped limiter keyed by caller identity.
///
/// Implementations own their eviction policy. Swapping in a distributed
/// limiter only requires another implementation of this trait.
#[async_trait]
pub trait DemoRateLimiter: Send + Sync + Debug {
    /// Count one request for `caller` if it fits in the current window
    async fn check_and_record(&self, caller: &str) -> RateLimitDecision;

    /// Requests allowed per window
    fn limit(&self) -> u32;
}
