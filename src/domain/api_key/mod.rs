//! API key domain: owner-scoped credentials with a usage quota

mod admission;
mod entity;
mod repository;
mod validation;

pub use admission::{AdmissionResult, AdmittedKey, Denial};
pub use entity::{
    mask_secret, ApiKey, ApiKeyId, ApiKeyKind, ApiKeyPatch, DEFAULT_USAGE_LIMIT,
    SECRET_SUFFIX_LENGTH,
};
pub use repository::ApiKeyRepository;
pub use validation::{validate_key_name, validate_limit, ApiKeyValidationError, MAX_KEY_NAME_LENGTH};

#[cfg(test)]
pub use repository::mock::MockApiKeyRepository;
