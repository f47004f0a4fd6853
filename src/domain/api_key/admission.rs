//! Outcome of checking a presented secret against the key store

use serde::Serialize;

use super::entity::{ApiKey, ApiKeyId, ApiKeyKind};

/// Non-secret view of an admitted key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdmittedKey {
    pub id: ApiKeyId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ApiKeyKind,
}

impl From<&ApiKey> for AdmittedKey {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: *key.id(),
            name: key.name().to_string(),
            kind: key.kind(),
        }
    }
}

/// Why a secret was turned away.
///
/// Unknown and foreign keys are reported identically so callers cannot
/// probe which secrets exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    MissingKey,
    UnknownKey,
    ForeignKey,
}

impl Denial {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingKey => "Missing API key. Please provide x-api-key header.",
            Self::UnknownKey | Self::ForeignKey => "Invalid API key",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionResult {
    Admitted {
        key: AdmittedKey,
        /// Quota left before this request is metered
        remaining: u64,
        limit: u64,
    },
    QuotaExceeded {
        key: AdmittedKey,
        usage: u64,
        limit: u64,
    },
    Unauthorized(Denial),
    ServiceUnavailable {
        reason: String,
    },
}

impl AdmissionResult {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }

    /// Human-readable message for every non-admitted outcome
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Admitted { .. } => None,
            Self::QuotaExceeded { usage, limit, .. } => Some(format!(
                "Rate limit exceeded. You have used {}/{} requests. Please upgrade your plan or wait for your limit to reset.",
                usage, limit
            )),
            Self::Unauthorized(denial) => Some(denial.message().to_string()),
            Self::ServiceUnavailable { reason } => Some(reason.clone()),
        }
    }
}
