//! Error types for the Domus system.

use thiserror::Error;

/// The caller-facing error taxonomy.
///
/// Every variant except [`DomusError::Database`] is an expected,
/// recoverable-by-caller outcome. The kind is carried structurally —
/// callers must never infer it from the message text.
#[derive(Debug, Error)]
pub enum DomusError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl DomusError {
    /// Shorthand for a [`DomusError::NotFound`] naming an entity kind.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DomusError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`DomusError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        DomusError::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a [`DomusError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        DomusError::InvalidInput {
            message: message.into(),
        }
    }
}

pub type DomusResult<T> = Result<T, DomusError>;
