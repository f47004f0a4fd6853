//! Storage infrastructure - backend selection, pooling and schema

mod factory;
pub mod migrations;
mod postgres;
mod unconfigured;

pub use factory::{Repositories, StorageBackend, StorageConfig, StorageFactory};
pub use migrations::{pending_migrations, run_migrations, Migration, PostgresMigrator};
pub use postgres::{connect_pool, PostgresConfig};
pub use unconfigured::{
    UnconfiguredApiKeyRepository, UnconfiguredUserRepository, DATABASE_NOT_CONFIGURED,
};
