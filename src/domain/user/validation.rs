//! User validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("User ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("User ID cannot contain whitespace")]
    WhitespaceInId,

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email '{0}' is not a valid address")]
    InvalidEmail(String),
}

const MAX_USER_ID_LENGTH: usize = 128;

/// Validate a user ID
///
/// Identity providers hand out opaque subjects (UUIDs, numeric ids), so the
/// only rules are: non-empty, at most 128 characters, no whitespace.
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    if id.is_empty() {
        return Err(UserValidationError::EmptyId);
    }

    if id.len() > MAX_USER_ID_LENGTH {
        return Err(UserValidationError::IdTooLong(MAX_USER_ID_LENGTH));
    }

    if id.chars().any(char::is_whitespace) {
        return Err(UserValidationError::WhitespaceInId);
    }

    Ok(())
}

/// Validate an email address (shape only)
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(UserValidationError::InvalidEmail(email.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_ids() {
        assert!(validate_user_id("a1b2c3").is_ok());
        assert!(validate_user_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_user_id("108234567890123456789").is_ok());
    }

    #[test]
    fn test_invalid_user_ids() {
        assert_eq!(validate_user_id(""), Err(UserValidationError::EmptyId));
        assert_eq!(
            validate_user_id(&"a".repeat(129)),
            Err(UserValidationError::IdTooLong(128))
        );
        assert_eq!(
            validate_user_id("has space"),
            Err(UserValidationError::WhitespaceInId)
        );
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("dev@example.com").is_ok());
        assert_eq!(validate_email("  "), Err(UserValidationError::EmptyEmail));
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("dev@").is_err());
    }
}
