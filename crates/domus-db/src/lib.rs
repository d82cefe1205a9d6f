//! Domus Database — SurrealDB connection management, schema
//! migrations and repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - SurrealDB implementations of the `domus-core` repository traits
//! - Error types ([`DbError`])

mod connection;
mod error;
mod schema;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
