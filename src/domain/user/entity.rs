//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_email, validate_user_id, UserValidationError};

/// User identifier as issued by the user store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An authenticated principal.
///
/// Users are written by the sign-in collaborator and only read by the key
/// management paths, which use `id` for ownership checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    /// Identity provider name (e.g. "google")
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
    /// Subject assigned by the identity provider
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new user; the email is normalised to lowercase
    pub fn new(id: UserId, email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into().trim().to_lowercase();
        validate_email(&email)?;

        let now = Utc::now();

        Ok(Self {
            id,
            email,
            name: None,
            image: None,
            provider: None,
            provider_id: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_provider(
        mut self,
        provider: impl Into<String>,
        provider_id: impl Into<String>,
    ) -> Self {
        self.provider = Some(provider.into());
        self.provider_id = Some(provider_id.into());
        self
    }

    /// Restore timestamps when loading from persistent storage
    pub fn with_timestamps(
        mut self,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        last_login_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self.last_login_at = last_login_at;
        self
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn provider_id(&self) -> Option<&str> {
        self.provider_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    // Mutators

    /// Refresh profile data delivered by the identity provider on sign-in
    pub fn record_sign_in(&mut self, name: Option<String>, image: Option<String>) {
        if name.is_some() {
            self.name = name;
        }

        if image.is_some() {
            self.image = image;
        }

        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }
}
