use serde::Deserialize;

use crate::infrastructure::api_key::MeteringStrategy;
use crate::infrastructure::storage::StorageBackend;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
    pub auth: AuthConfig,
    pub metering: MeteringConfig,
    pub keys: KeysConfig,
    pub summarizer: SummarizerConfig,
    pub github: GitHubSettings,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret for session tokens; sessions are refused without it
    pub session_secret: Option<String>,
    pub session_cookie: String,
    pub session_ttl_hours: u64,
    /// Seeded into the user store at startup for local development
    pub dev_user_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct MeteringConfig {
    pub strategy: MeteringStrategy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    pub default_limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub base_url: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub readme_max_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Requests per caller per window
    pub limit: u32,
    pub window_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 10,
            run_migrations: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: None,
            session_cookie: "session".to_string(),
            session_ttl_hours: 24,
            dev_user_email: None,
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            default_limit: crate::domain::DEFAULT_USAGE_LIMIT,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            token: None,
            user_agent: "GitHub-Summarizer-API".to_string(),
            readme_max_chars: 10_000,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            limit: 3,
            window_secs: 24 * 60 * 60,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = config.try_deserialize()?;
        config.apply_env_fallbacks(|name| std::env::var(name).ok());

        Ok(config)
    }

    /// Fill unset values from the conventional plain variables
    /// (`DATABASE_URL`, `OPENAI_API_KEY`, `GITHUB_TOKEN`, `SESSION_SECRET`)
    pub fn apply_env_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.storage.database_url.is_none() {
            self.storage.database_url = lookup("DATABASE_URL");
        }
        if self.summarizer.openai_api_key.is_none() {
            self.summarizer.openai_api_key = lookup("OPENAI_API_KEY");
        }
        if self.github.token.is_none() {
            self.github.token = lookup("GITHUB_TOKEN");
        }
        if self.auth.session_secret.is_none() {
            self.auth.session_secret = lookup("SESSION_SECRET");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.metering.strategy, MeteringStrategy::Atomic);
        assert_eq!(config.keys.default_limit, 1000);
        assert_eq!(config.summarizer.model, "gpt-4o-mini");
        assert_eq!(config.github.user_agent, "GitHub-Summarizer-API");
        assert_eq!(config.demo.limit, 3);
        assert_eq!(config.demo.window_secs, 86_400);
    }

    #[test]
    fn test_env_fallbacks_fill_only_unset_values() {
        let env = HashMap::from([
            ("DATABASE_URL", "postgres://env/db"),
            ("OPENAI_API_KEY", "sk-env"),
            ("GITHUB_TOKEN", ""),
            ("SESSION_SECRET", "env-secret"),
        ]);

        let mut config = AppConfig::default();
        config.auth.session_secret = Some("configured".to_string());
        config.apply_env_fallbacks(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage.database_url.as_deref(), Some("postgres://env/db"));
        assert_eq!(config.summarizer.openai_api_key.as_deref(), Some("sk-env"));
        assert!(config.github.token.is_none());
        assert_eq!(config.auth.session_secret.as_deref(), Some("configured"));
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [storage]
                backend = "postgres"

                [metering]
                strategy = "read_modify_write"

                [logging]
                format = "json"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.storage.max_connections, 10);
        assert_eq!(config.metering.strategy, MeteringStrategy::ReadModifyWrite);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.port, 8080);
    }
}
