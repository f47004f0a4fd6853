//! Migrate command - applies the schema and exits

use anyhow::Context;
use tracing::info;

use crate::infrastructure::storage::{connect_pool, run_migrations, PostgresConfig};

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let url = config
        .storage
        .database_url
        .filter(|url| !url.trim().is_empty())
        .context("DATABASE_URL is not set; nothing to migrate")?;

    let pool = connect_pool(
        &PostgresConfig::new(url).with_max_connections(config.storage.max_connections),
    )
    .await?;
    let applied = run_migrations(&pool).await?;

    info!(applied, "Migrations applied");
    pool.close().await;

    Ok(())
}
