//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
    /// Index for email -> user ID lookup
    email_index: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(id.as_str()).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email_index = self.email_index.read().await;

        if let Some(user_id) = email_index.get(&email.trim().to_lowercase()) {
            let users = self.users.read().await;
            return Ok(users.get(user_id).cloned());
        }

        Ok(None)
    }

    async fn upsert(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        if let Some(existing_id) = email_index.get(user.email()) {
            let existing = users
                .get_mut(existing_id)
                .ok_or_else(|| DomainError::internal("User email index out of sync"))?;

            existing.record_sign_in(
                user.name().map(str::to_string),
                user.image().map(str::to_string),
            );
            return Ok(existing.clone());
        }

        let id = user.id().as_str().to_string();
        if users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        email_index.insert(user.email().to_string(), id.clone());
        users.insert(id, user.clone());

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user(id: &str, email: &str) -> User {
        User::new(UserId::new(id).unwrap(), email).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_creates_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1", "dev@example.com");

        repo.upsert(user.clone()).await.unwrap();

        let fetched = repo.get(user.id()).await.unwrap().unwrap();
        assert_eq!(fetched.email(), "dev@example.com");
    }

    #[tokio::test]
    async fn test_upsert_existing_email_keeps_identity() {
        let repo = InMemoryUserRepository::new();
        let original = repo
            .upsert(create_test_user("user-1", "dev@example.com"))
            .await
            .unwrap();

        let again = repo
            .upsert(create_test_user("user-2", "DEV@example.com").with_name("Dev"))
            .await
            .unwrap();

        assert_eq!(again.id(), original.id());
        assert_eq!(again.name(), Some("Dev"));
        assert!(again.last_login_at().is_some());
        assert!(repo.get(&UserId::new("user-2").unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_email_is_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        repo.upsert(create_test_user("user-1", "dev@example.com"))
            .await
            .unwrap();

        assert!(repo.get_by_email("Dev@Example.com").await.unwrap().is_some());
        assert!(repo.get_by_email("other@example.com").await.unwrap().is_none());
    }
}
