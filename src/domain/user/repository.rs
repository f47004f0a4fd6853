//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by email (session resolution)
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Insert the user, or refresh profile and login time when the email exists
    async fn upsert(&self, user: User) -> Result<User, DomainError>;
}
