//! Counter change request — a pending, manager-reviewable proposal to
//! add or remove a metering device.
//!
//! Stored requests are always pending: resolution deletes the document
//! after applying the outcome, so no reviewed/approved flags exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomusError;
use crate::models::counter::CounterKind;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestKind {
    Add,
    Delete,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Add => "Add",
            RequestKind::Delete => "Delete",
        }
    }
}

impl std::str::FromStr for RequestKind {
    type Err = DomusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Add" => Ok(RequestKind::Add),
            "Delete" => Ok(RequestKind::Delete),
            other => Err(DomusError::invalid_input(format!(
                "unknown request type: {other}"
            ))),
        }
    }
}

/// Manager's verdict when resolving a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: Uuid,
    pub counter_id: Uuid,
    pub kind: RequestKind,
    pub reason: String,
    pub house_id: Uuid,
    /// Requester — receives the resolution notification.
    pub user_id: Uuid,
    // Denormalized for request listings and notification texts.
    pub counter_kind: CounterKind,
    pub counter_serial_number: String,
    pub apartment_number: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChangeRequest {
    pub counter_id: Uuid,
    pub kind: RequestKind,
    pub reason: String,
    pub house_id: Uuid,
    pub user_id: Uuid,
    pub counter_kind: CounterKind,
    pub counter_serial_number: String,
    pub apartment_number: String,
    pub created_at: DateTime<Utc>,
}
