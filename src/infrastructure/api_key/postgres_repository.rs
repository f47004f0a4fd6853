//! PostgreSQL API key repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyKind, ApiKeyRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const KEY_COLUMNS: &str = r#"id, owner_id, name, key, type, usage, "limit", created_at"#;

/// Matches every row when the bound owner is NULL
const OWNER_SCOPE_UPDATE: &str = "($5::VARCHAR IS NULL OR owner_id = $5)";
const OWNER_SCOPE_DELETE: &str = "($2::VARCHAR IS NULL OR owner_id = $2)";

/// PostgreSQL implementation of ApiKeyRepository
#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
    atomic_increment: bool,
}

impl PostgresApiKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            atomic_increment: true,
        }
    }

    /// Whether the `increment_api_key_usage` function is installed
    pub fn with_atomic_increment(mut self, available: bool) -> Self {
        self.atomic_increment = available;
        self
    }

    /// Check the catalog for the increment function
    pub async fn detect_atomic_increment(&self) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM pg_proc WHERE proname = 'increment_api_key_usage')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to inspect functions: {}", e)))
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM api_keys WHERE id = $1", KEY_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        row.map(|row| row_to_api_key(&row)).transpose()
    }

    async fn get_by_secret(&self, secret: &str) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM api_keys WHERE key = $1", KEY_COLUMNS))
            .bind(secret)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to look up API key: {}", e)))?;

        row.map(|row| row_to_api_key(&row)).transpose()
    }

    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO api_keys (id, owner_id, name, key, type, usage, "limit", created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(api_key.id().as_uuid())
        .bind(api_key.owner_id().map(|o| o.as_str()))
        .bind(api_key.name())
        .bind(api_key.secret())
        .bind(api_key.kind().as_str())
        .bind(to_db_count(api_key.usage())?)
        .bind(to_db_count(api_key.limit())?)
        .bind(api_key.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict("API key secret already exists")
            } else {
                DomainError::storage(format!("Failed to create API key: {}", e))
            }
        })?;

        Ok(api_key)
    }

    async fn update(&self, owner: Option<&UserId>, api_key: &ApiKey) -> Result<ApiKey, DomainError> {
        let row = sqlx::query(&update_statement())
            .bind(api_key.id().as_uuid())
            .bind(api_key.name())
            .bind(api_key.kind().as_str())
            .bind(to_db_count(api_key.limit())?)
            .bind(owner.map(UserId::as_str))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update API key: {}", e)))?;

        match row {
            Some(row) => row_to_api_key(&row),
            None => Err(DomainError::not_found("API key not found")),
        }
    }

    async fn delete(&self, owner: Option<&UserId>, id: &ApiKeyId) -> Result<bool, DomainError> {
        let result = sqlx::query(&delete_statement())
            .bind(id.as_uuid())
            .bind(owner.map(UserId::as_str))
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete API key: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, owner: Option<&UserId>) -> Result<Vec<ApiKey>, DomainError> {
        let rows = match owner {
            Some(owner) => {
                sqlx::query(&format!(
                    "SELECT {} FROM api_keys WHERE owner_id = $1 ORDER BY created_at DESC",
                    KEY_COLUMNS
                ))
                .bind(owner.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM api_keys ORDER BY created_at DESC",
                    KEY_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        rows.iter().map(row_to_api_key).collect()
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_keys")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count API keys: {}", e)))?;

        Ok(count as usize)
    }

    async fn increment_usage(&self, id: &ApiKeyId) -> Result<u64, DomainError> {
        let usage: Option<i64> = sqlx::query_scalar("SELECT increment_api_key_usage($1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to increment usage: {}", e)))?;

        usage
            .map(from_db_count)
            .ok_or_else(|| DomainError::not_found("API key not found"))
    }

    async fn set_usage(&self, id: &ApiKeyId, usage: u64) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE api_keys SET usage = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(to_db_count(usage)?)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to set usage: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("API key not found"));
        }

        Ok(())
    }

    fn supports_atomic_increment(&self) -> bool {
        self.atomic_increment
    }
}

fn to_db_count(value: u64) -> Result<i64, DomainError> {
    i64::try_from(value).map_err(|_| DomainError::validation(format!("Value {} is too large", value)))
}

fn from_db_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn row_to_api_key(row: &sqlx::postgres::PgRow) -> Result<ApiKey, DomainError> {
    let id: Uuid = row.get("id");
    let owner_id: Option<String> = row.get("owner_id");
    let name: String = row.get("name");
    let secret: String = row.get("key");
    let kind: String = row.get("type");
    let usage: i64 = row.get("usage");
    let limit: i64 = row.get("limit");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

    let owner_id = owner_id
        .map(UserId::new)
        .transpose()
        .map_err(|e| DomainError::storage(format!("Invalid owner ID in database: {}", e)))?;
    let kind = ApiKeyKind::parse(&kind)
        .map_err(|e| DomainError::storage(format!("Invalid key type in database: {}", e)))?;

    Ok(ApiKey::new(
        ApiKeyId::from(id),
        owner_id,
        name,
        secret,
        kind,
        from_db_count(limit),
    )
    .with_usage(from_db_count(usage))
    .with_created_at(created_at))
}

fn update_statement() -> String {
    format!(
        r#"
        UPDATE api_keys
        SET name = $2, type = $3, "limit" = $4
        WHERE id = $1 AND {}
        RETURNING {}
        "#,
        OWNER_SCOPE_UPDATE, KEY_COLUMNS
    )
}

fn delete_statement() -> String {
    format!("DELETE FROM api_keys WHERE id = $1 AND {}", OWNER_SCOPE_DELETE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutations_are_owner_scoped() {
        let update = update_statement();
        assert!(update.contains("WHERE id = $1 AND ($5::VARCHAR IS NULL OR owner_id = $5)"));
        assert!(update.contains("RETURNING id, owner_id"));

        assert_eq!(
            delete_statement(),
            "DELETE FROM api_keys WHERE id = $1 AND ($2::VARCHAR IS NULL OR owner_id = $2)"
        );
    }

    #[test]
    fn test_count_conversion() {
        assert_eq!(to_db_count(1000).unwrap(), 1000);
        assert!(to_db_count(u64::MAX).is_err());
        assert_eq!(from_db_count(-5), 0);
        assert_eq!(from_db_count(42), 42);
    }
}
