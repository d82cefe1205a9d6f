//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 hex digest of the raw bearer token. The raw token is
    /// returned to the client once and never stored.
    pub token_hash: String,
    pub ip: Option<String>,
    pub device_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub user_id: Uuid,
    pub token_hash: String,
    pub ip: Option<String>,
    pub device_info: Option<String>,
    pub expires_at: DateTime<Utc>,
}
