//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, DemoConfig, GitHubSettings, KeysConfig, LogFormat, LoggingConfig,
    MeteringConfig, ServerConfig, StorageSettings, SummarizerConfig,
};
