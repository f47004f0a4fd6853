//! Repository Summarizer Gateway
//!
//! Issues owner-scoped API keys, admits requests against each key's usage
//! quota and meters successful summaries of public GitHub repositories.
//! A throttled, keyless demo endpoint sits alongside the metered one.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::{RepositorySource, RepositorySummarizer, User, UserId, UserRepository};
use infrastructure::{
    api_key::{select_incrementer, KeyLifecycleManager, UsageMeter},
    auth::{SessionConfig, SessionTokenService},
    github::{GitHubClient, GitHubConfig},
    llm::{HttpClient, OpenAiProvider},
    rate_limit::FixedWindowRateLimiter,
    storage::{StorageConfig, StorageFactory},
    summarizer::{DemoSummaryService, LlmRepositorySummarizer, SummaryPipeline},
};
use tracing::{info, warn};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_config = StorageConfig::resolve(
        config.storage.backend,
        config.storage.database_url.clone(),
        config.storage.max_connections,
        config.storage.run_migrations,
    );
    let repositories = StorageFactory::create(&storage_config).await?;

    let incrementer = select_incrementer(config.metering.strategy, repositories.api_keys.clone());
    let meter = Arc::new(UsageMeter::new(incrementer));
    info!(strategy = ?meter.strategy(), "Usage metering ready");

    let source: Arc<dyn RepositorySource> = Arc::new(GitHubClient::new(
        GitHubConfig::new(&config.github.base_url)
            .with_token(config.github.token.clone())
            .with_user_agent(&config.github.user_agent)
            .with_readme_max_chars(config.github.readme_max_chars),
    ));

    let timeout = Duration::from_secs(config.summarizer.timeout_secs);
    let summarizer = create_summarizer(config, timeout)?;

    let pipeline = Arc::new(
        SummaryPipeline::new(source.clone(), summarizer.clone(), meter).with_timeout(timeout),
    );
    let demo = Arc::new(DemoSummaryService::new(source, summarizer).with_timeout(timeout));
    let demo_limiter = Arc::new(FixedWindowRateLimiter::new(
        config.demo.limit,
        Duration::from_secs(config.demo.window_secs),
    ));

    let key_manager = KeyLifecycleManager::new(repositories.api_keys.clone())
        .with_default_limit(config.keys.default_limit);

    let mut state = AppState::new(
        repositories.api_keys,
        repositories.users.clone(),
        pipeline,
        demo,
        demo_limiter,
    )
    .with_key_manager(key_manager);

    match config.auth.session_secret.as_deref() {
        Some(secret) => {
            let sessions = SessionTokenService::new(SessionConfig::new(
                secret,
                config.auth.session_ttl_hours,
            ));
            state = state.with_sessions(Arc::new(sessions), &config.auth.session_cookie);
        }
        None => warn!("No session secret configured; key management endpoints will return 503"),
    }

    if let Some(email) = config.auth.dev_user_email.as_deref() {
        seed_user(repositories.users.as_ref(), email).await?;
    }

    Ok(state)
}

fn create_summarizer(
    config: &AppConfig,
    timeout: Duration,
) -> anyhow::Result<Option<Arc<dyn RepositorySummarizer>>> {
    let Some(api_key) = config.summarizer.openai_api_key.as_deref() else {
        warn!("No OpenAI API key configured; protected summaries will return 503 and the demo will use fallback summaries");
        return Ok(None);
    };

    let provider = OpenAiProvider::with_base_url(
        HttpClient::with_timeout(timeout)?,
        api_key,
        &config.summarizer.openai_base_url,
    );
    let summarizer = LlmRepositorySummarizer::new(Arc::new(provider))
        .with_model(&config.summarizer.model)
        .with_temperature(config.summarizer.temperature);

    info!(model = %config.summarizer.model, "LLM summarizer configured");
    Ok(Some(Arc::new(summarizer)))
}

/// Make sure a user with `email` exists, returning the stored record
pub async fn seed_user(users: &dyn UserRepository, email: &str) -> anyhow::Result<User> {
    if let Some(existing) = users.get_by_email(email).await? {
        return Ok(existing);
    }

    let user = users.upsert(User::new(UserId::generate(), email)?).await?;
    info!(user_id = %user.id(), email = %user.email(), "Seeded user");

    Ok(user)
}
