//! Notification event domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomusError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Notification,
    News,
    System,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Notification => "notification",
            EventKind::News => "news",
            EventKind::System => "system",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = DomusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notification" => Ok(EventKind::Notification),
            "news" => Ok(EventKind::News),
            "system" => Ok(EventKind::System),
            other => Err(DomusError::invalid_input(format!(
                "unknown event type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    /// Recipient.
    pub user_id: Uuid,
    pub kind: EventKind,
    pub title: String,
    pub details: String,
    pub read: bool,
    /// Sending manager or the system sender identity.
    pub sender_id: Uuid,
    pub house_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    pub user_id: Uuid,
    pub kind: EventKind,
    pub title: String,
    pub details: String,
    pub sender_id: Uuid,
    pub house_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
