//! API Key entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ApiKeyValidationError;
use crate::domain::user::UserId;

/// Quota assigned to keys created without an explicit limit
pub const DEFAULT_USAGE_LIMIT: u64 = 1000;

/// Number of random characters following the kind prefix of a secret
pub const SECRET_SUFFIX_LENGTH: usize = 28;

/// API Key identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyId(Uuid);

impl ApiKeyId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier received from a caller
    pub fn parse(value: &str) -> Result<Self, ApiKeyValidationError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| ApiKeyValidationError::InvalidId(value.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ApiKeyId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of credential, visible at a glance from the secret prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ApiKeyKind {
    #[default]
    #[serde(rename = "dev", alias = "development")]
    Development,
    #[serde(rename = "prod", alias = "production")]
    Production,
}

impl ApiKeyKind {
    /// Prefix every secret of this kind starts with
    pub fn secret_prefix(&self) -> &'static str {
        match self {
            Self::Development => "dk_dev_",
            Self::Production => "dk_",
        }
    }

    /// Wire and storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Production => "prod",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ApiKeyValidationError> {
        match value.trim().to_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            other => Err(ApiKeyValidationError::UnknownKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for ApiKeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-only obfuscation of a secret.
///
/// Keeps everything up to and including the last `_` and replaces the random
/// suffix with a fixed-width mask. Not a security boundary.
pub fn mask_secret(secret: &str) -> String {
    let prefix = secret
        .rfind('_')
        .map(|pos| &secret[..=pos])
        .unwrap_or_default();

    format!("{}{}", prefix, "*".repeat(SECRET_SUFFIX_LENGTH))
}

/// Partial update of the owner-mutable fields of a key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiKeyPatch {
    pub name: Option<String>,
    pub kind: Option<ApiKeyKind>,
    /// Signed so that negative input can be rejected rather than wrapped
    pub limit: Option<i64>,
}

impl ApiKeyPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.kind.is_none() && self.limit.is_none()
    }
}

/// API Key entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    id: ApiKeyId,
    /// Owning principal; `None` for global keys issued without a session
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_id: Option<UserId>,
    name: String,
    /// The bearer token itself, unique across all keys
    secret: String,
    kind: ApiKeyKind,
    usage: u64,
    limit: u64,
    created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Create a new API key with zero usage
    pub fn new(
        id: ApiKeyId,
        owner_id: Option<UserId>,
        name: impl Into<String>,
        secret: impl Into<String>,
        kind: ApiKeyKind,
        limit: u64,
    ) -> Self {
        Self {
            id,
            owner_id,
            name: name.into(),
            secret: secret.into(),
            kind,
            usage: 0,
            limit,
            created_at: Utc::now(),
        }
    }

    /// Restore the usage counter when loading from storage
    pub fn with_usage(mut self, usage: u64) -> Self {
        self.usage = usage;
        self
    }

    /// Restore the creation timestamp when loading from storage
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    // Getters

    pub fn id(&self) -> &ApiKeyId {
        &self.id
    }

    pub fn owner_id(&self) -> Option<&UserId> {
        self.owner_id.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn kind(&self) -> ApiKeyKind {
        self.kind
    }

    pub fn usage(&self) -> u64 {
        self.usage
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // Quota and ownership

    /// Requests left before the quota is exhausted
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.usage)
    }

    /// Admission precondition: `usage < limit`
    pub fn has_quota(&self) -> bool {
        self.usage < self.limit
    }

    /// Global keys belong to nobody, so they never match an owner
    pub fn is_owned_by(&self, owner: &UserId) -> bool {
        self.owner_id.as_ref() == Some(owner)
    }

    // Mutators

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_kind(&mut self, kind: ApiKeyKind) {
        self.kind = kind;
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = limit;
    }

    /// Only the metering path writes usage
    pub fn set_usage(&mut self, usage: u64) {
        self.usage = usage;
    }
}
