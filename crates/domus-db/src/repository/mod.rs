//! SurrealDB repository implementations.

mod apartment;
mod counter;
mod event;
mod house;
mod reading;
mod request;
mod session;
mod user;

pub use apartment::SurrealApartmentRepository;
pub use counter::SurrealCounterRepository;
pub use event::SurrealEventRepository;
pub use house::SurrealHouseRepository;
pub use reading::SurrealReadingRepository;
pub use request::SurrealChangeRequestRepository;
pub use session::SurrealSessionRepository;
pub use user::SurrealUserRepository;

use chrono::{DateTime, Utc};
use surrealdb::sql::Datetime;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct CountRow {
    pub total: u64,
}

pub(crate) fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupt(format!("invalid {what} UUID: {e}")))
}

/// Chrono timestamps cross the wire as [`surrealdb::sql::Datetime`] so
/// SCHEMAFULL `TYPE datetime` fields accept them.
pub(crate) fn to_datetime(dt: DateTime<Utc>) -> Datetime {
    dt.into()
}

pub(crate) fn from_datetime(dt: Datetime) -> DateTime<Utc> {
    dt.into()
}
