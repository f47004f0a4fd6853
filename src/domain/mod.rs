//! Domain layer - Core business logic and entities

pub mod api_key;
pub mod error;
pub mod llm;
pub mod rate_limit;
pub mod summary;
pub mod user;

pub use api_key::{
    mask_secret, AdmissionResult, AdmittedKey, ApiKey, ApiKeyId, ApiKeyKind, ApiKeyPatch,
    ApiKeyRepository, ApiKeyValidationError, Denial, DEFAULT_USAGE_LIMIT,
};
pub use error::DomainError;
pub use llm::{LlmProvider, LlmRequest, LlmResponse, Message, MessageRole};
pub use rate_limit::{DemoRateLimiter, RateLimitDecision};
pub use summary::{
    parse_github_url, RepositoryAnalysis, RepositoryCoordinates, RepositoryDigest,
    RepositorySource, RepositorySummarizer,
};
pub use user::{User, UserId, UserRepository};
