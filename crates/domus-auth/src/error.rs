//! Authentication error types.

use domus_core::error::DomusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("session has expired")]
    SessionExpired,

    #[error("invalid token")]
    TokenInvalid,

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for DomusError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::SessionExpired
            | AuthError::TokenInvalid => DomusError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::WeakPassword { .. } => DomusError::InvalidInput {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => DomusError::Crypto(msg),
        }
    }
}
