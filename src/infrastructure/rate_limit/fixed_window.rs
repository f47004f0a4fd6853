//! Fixed-window request limiter
//!
//! Counts requests per caller within a window that starts at the caller's
//! first request and resets lazily once it has elapsed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::rate_limit::{DemoRateLimiter, RateLimitDecision};

/// Request window for one caller
#[derive(Debug, Clone)]
struct WindowRecord {
    count: u32,
    resets_at: Instant,
}

/// In-process limiter; state is lost on restart
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    limit: u32,
    window: Duration,
    /// Per-caller windows
    records: Arc<RwLock<HashMap<String, WindowRecord>>>,
    /// How often expired windows are swept
    cleanup_interval: Duration,
    last_cleanup: Arc<RwLock<Instant>>,
}

impl FixedWindowRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            records: Arc::new(RwLock::new(HashMap::new())),
            cleanup_interval: Duration::from_secs(300),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Number of callers currently tracked
    pub async fn tracked_callers(&self) -> usize {
        self.records.read().await.len()
    }

    async fn maybe_cleanup(&self, now: Instant) {
        let should_cleanup = {
            let last = self.last_cleanup.read().await;
            now.duration_since(*last) >= self.cleanup_interval
        };

        if should_cleanup {
            *self.last_cleanup.write().await = now;

            let mut records = self.records.write().await;
            let before = records.len();
            records.retain(|_, record| record.resets_at > now);

            debug!(evicted = before - records.len(), "Swept expired rate limit windows");
        }
    }
}

#[async_trait]
impl DemoRateLimiter for FixedWindowRateLimiter {
    async fn check_and_record(&self, caller: &str) -> RateLimitDecision {
        let now = Instant::now();
        self.maybe_cleanup(now).await;

        let mut records = self.records.write().await;
        let record = records
            .entry(caller.to_string())
            .or_insert_with(|| WindowRecord {
                count: 0,
                resets_at: now + self.window,
            });

        if now >= record.resets_at {
            record.count = 0;
            record.resets_at = now + self.window;
        }

        let reset_in_seconds = record.resets_at.saturating_duration_since(now).as_secs();

        if record.count >= self.limit {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                limit: self.limit,
                reset_in_seconds,
            };
        }

        record.count += 1;

        RateLimitDecision {
            allowed: true,
            remaining: self.limit - record.count,
            limit: self.limit,
            reset_in_seconds,
        }
    }

    fn limit(&self) -> u32 {
        self.limit
    }
}
