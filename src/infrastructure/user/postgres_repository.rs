//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

const USER_COLUMNS: &str = "id, email, name, image, provider, provider_id, \
                            created_at, updated_at, last_login_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn upsert(&self, user: User) -> Result<User, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, name, image, provider, provider_id,
                               created_at, updated_at, last_login_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (email) DO UPDATE
            SET name = COALESCE(EXCLUDED.name, users.name),
                image = COALESCE(EXCLUDED.image, users.image),
                provider = COALESCE(EXCLUDED.provider, users.provider),
                provider_id = COALESCE(EXCLUDED.provider_id, users.provider_id),
                updated_at = NOW(),
                last_login_at = NOW()
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id().as_str())
        .bind(user.email())
        .bind(user.name())
        .bind(user.image())
        .bind(user.provider())
        .bind(user.provider_id())
        .bind(user.created_at())
        .bind(user.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to upsert user: {}", e)))?;

        row_to_user(&row)
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: String = row.get("id");
    let email: String = row.get("email");
    let name: Option<String> = row.get("name");
    let image: Option<String> = row.get("image");
    let provider: Option<String> = row.get("provider");
    let provider_id: Option<String> = row.get("provider_id");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");
    let last_login_at: Option<chrono::DateTime<chrono::Utc>> = row.get("last_login_at");

    let user_id = UserId::new(&id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    let mut user = User::new(user_id, email)
        .map_err(|e| DomainError::storage(format!("Invalid user in database: {}", e)))?
        .with_timestamps(created_at, updated_at, last_login_at);

    if let Some(name) = name {
        user = user.with_name(name);
    }
    if let Some(image) = image {
        user = user.with_image(image);
    }
    if let (Some(provider), Some(provider_id)) = (provider, provider_id) {
        user = user.with_provider(provider, provider_id);
    }

    Ok(user)
}
