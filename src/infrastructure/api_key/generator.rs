//! API key secret generation

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::domain::api_key::{ApiKeyKind, SECRET_SUFFIX_LENGTH};

/// Generator for bearer secrets.
///
/// A secret is the kind prefix followed by a random suffix drawn uniformly
/// from `[A-Za-z0-9]`.
#[derive(Debug, Clone)]
pub struct SecretGenerator {
    suffix_length: usize,
}

impl SecretGenerator {
    pub fn new() -> Self {
        Self {
            suffix_length: SECRET_SUFFIX_LENGTH,
        }
    }

    /// Generate a fresh secret for the given kind
    pub fn generate(&self, kind: ApiKeyKind) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.suffix_length)
            .map(char::from)
            .collect();

        format!("{}{}", kind.secret_prefix(), suffix)
    }
}

impl Default for SecretGenerator {
    fn default() -> Self {
        Self::new()
    }
}
