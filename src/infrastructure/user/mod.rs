//! User infrastructure module
//!
//! Stores principals created by the sign-in flow so sessions can be resolved
//! to an owner.

mod postgres_repository;
mod repository;

pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
