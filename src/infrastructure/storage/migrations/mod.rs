//! Database migrations infrastructure

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// PostgreSQL migrator recording applied versions in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Versions already recorded in `_migrations`
    pub async fn applied_versions(&self) -> Result<Vec<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT version FROM _migrations ORDER BY version")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read migration history: {}", e)))
    }

    /// Apply one migration and record it
    pub async fn apply(&self, migration: &Migration) -> Result<(), DomainError> {
        // Migration bodies hold several statements, so they bypass prepared statements
        sqlx::raw_sql(migration.up)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        info!(version = migration.version, description = migration.description, "Applied migration");
        Ok(())
    }
}

/// A versioned schema change
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
}

/// Schema for users, API keys and the usage increment function
pub fn gateway_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Create users table",
            up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(128) PRIMARY KEY,
                email VARCHAR(320) NOT NULL UNIQUE,
                name TEXT,
                image TEXT,
                provider VARCHAR(64),
                provider_id VARCHAR(255),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                last_login_at TIMESTAMPTZ
            );
            "#,
        },
        Migration {
            version: 2,
            description: "Create api_keys table",
            up: r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                id UUID PRIMARY KEY,
                owner_id VARCHAR(128) REFERENCES users(id) ON DELETE CASCADE,
                name VARCHAR(100) NOT NULL,
                key VARCHAR(64) NOT NULL UNIQUE,
                type VARCHAR(8) NOT NULL CHECK (type IN ('dev', 'prod')),
                usage BIGINT NOT NULL DEFAULT 0 CHECK (usage >= 0),
                "limit" BIGINT NOT NULL DEFAULT 1000 CHECK ("limit" >= 0),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_api_keys_owner_created
                ON api_keys(owner_id, created_at DESC);
            "#,
        },
        Migration {
            version: 3,
            description: "Create increment_api_key_usage function",
            up: r#"
            CREATE OR REPLACE FUNCTION increment_api_key_usage(key_id UUID)
            RETURNS BIGINT AS $$
                UPDATE api_keys SET usage = usage + 1 WHERE id = key_id RETURNING usage;
            $$ LANGUAGE sql;
            "#,
        },
    ]
}

/// Migrations not yet in `applied`, in version order
pub fn pending_migrations(applied: &[i64]) -> Vec<Migration> {
    gateway_migrations()
        .into_iter()
        .filter(|m| !applied.contains(&m.version))
        .collect()
}

/// Runs all pending migrations, returning how many were applied
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());
    let pending = pending_migrations(&migrator.applied_versions().await?);

    for migration in &pending {
        migrator.apply(migration).await?;
    }

    Ok(pending.len())
}
