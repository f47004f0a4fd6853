//! Application state for shared services

use std::sync::Arc;

use crate::domain::{ApiKeyRepository, DemoRateLimiter, UserRepository};
use crate::infrastructure::api_key::{AccessGate, KeyLifecycleManager};
use crate::infrastructure::auth::SessionTokens;
use crate::infrastructure::summarizer::{DemoSummaryService, SummaryPipeline};

/// Application state shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub api_keys: Arc<dyn ApiKeyRepository>,
    pub users: Arc<dyn UserRepository>,
    pub key_manager: Arc<KeyLifecycleManager<dyn ApiKeyRepository>>,
    pub gate: Arc<AccessGate<dyn ApiKeyRepository>>,
    /// `None` when no session secret is configured
    pub sessions: Option<Arc<dyn SessionTokens>>,
    pub session_cookie: String,
    pub pipeline: Arc<SummaryPipeline>,
    pub demo: Arc<DemoSummaryService>,
    pub demo_limiter: Arc<dyn DemoRateLimiter>,
}

impl AppState {
    pub fn new(
        api_keys: Arc<dyn ApiKeyRepository>,
        users: Arc<dyn UserRepository>,
        pipeline: Arc<SummaryPipeline>,
        demo: Arc<DemoSummaryService>,
        demo_limiter: Arc<dyn DemoRateLimiter>,
    ) -> Self {
        Self {
            key_manager: Arc::new(KeyLifecycleManager::new(api_keys.clone())),
            gate: Arc::new(AccessGate::new(api_keys.clone())),
            api_keys,
            users,
            sessions: None,
            session_cookie: "session".to_string(),
            pipeline,
            demo,
            demo_limiter,
        }
    }

    pub fn with_key_manager(mut self, key_manager: KeyLifecycleManager<dyn ApiKeyRepository>) -> Self {
        self.key_manager = Arc::new(key_manager);
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionTokens>, cookie: impl Into<String>) -> Self {
        self.sessions = Some(sessions);
        self.session_cookie = cookie.into();
        self
    }
}
