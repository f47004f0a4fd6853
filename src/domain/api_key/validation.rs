//! API key validation utilities

use thiserror::Error;

/// Errors that can occur during API key validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Limit must be a non-negative integer, got {0}")]
    NegativeLimit(i64),

    #[error("Invalid API key ID: '{0}'")]
    InvalidId(String),

    #[error("Unknown key type '{0}'. Expected 'dev' or 'prod'")]
    UnknownKind(String),
}

pub const MAX_KEY_NAME_LENGTH: usize = 100;

/// Validate a key name, returning the trimmed value
pub fn validate_key_name(name: &str) -> Result<String, ApiKeyValidationError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ApiKeyValidationError::EmptyName);
    }

    if name.chars().count() > MAX_KEY_NAME_LENGTH {
        return Err(ApiKeyValidationError::NameTooLong(MAX_KEY_NAME_LENGTH));
    }

    Ok(name.to_string())
}

/// Validate a quota limit as received from callers
pub fn validate_limit(limit: i64) -> Result<u64, ApiKeyValidationError> {
    u64::try_from(limit).map_err(|_| ApiKeyValidationError::NegativeLimit(limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert_eq!(validate_key_name("Production").unwrap(), "Production");
        assert_eq!(validate_key_name("  padded  ").unwrap(), "padded");
        assert!(validate_key_name(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(validate_key_name(""), Err(ApiKeyValidationError::EmptyName));
        assert_eq!(validate_key_name("   "), Err(ApiKeyValidationError::EmptyName));
    }

    #[test]
    fn test_name_too_long() {
        assert_eq!(
            validate_key_name(&"a".repeat(101)),
            Err(ApiKeyValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_limits() {
        assert_eq!(validate_limit(0), Ok(0));
        assert_eq!(validate_limit(1000), Ok(1000));
        assert_eq!(validate_limit(-1), Err(ApiKeyValidationError::NegativeLimit(-1)));
    }
}
