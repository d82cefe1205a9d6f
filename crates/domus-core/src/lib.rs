//! Domus Core — domain models, error taxonomy, repository contracts
//! and the pure authorization engine for the property-management
//! backend.
//!
//! This crate has no I/O: repository traits are implemented by
//! `domus-db`, and the services in `domus-service` compose them with
//! the [`authz`] decision function.

pub mod authz;
pub mod clock;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{DomusError, DomusResult};
