//! API key infrastructure: secret generation, storage backends, admission,
//! lifecycle management and usage metering

mod gate;
mod generator;
mod lifecycle;
mod metering;
mod postgres_repository;
mod repository;

pub use gate::AccessGate;
pub use generator::SecretGenerator;
pub use lifecycle::KeyLifecycleManager;
pub use metering::{
    select_incrementer, AtomicUsageIncrementer, MeteringStrategy, ReadModifyWriteIncrementer,
    UsageIncrementer, UsageMeter,
};
pub use postgres_repository::PostgresApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
