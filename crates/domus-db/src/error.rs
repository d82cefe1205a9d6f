//! Database-specific error types and conversions.

use domus_core::error::DomusError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<DbError> for DomusError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => DomusError::NotFound { entity, id },
            other => DomusError::Database(other.to_string()),
        }
    }
}
