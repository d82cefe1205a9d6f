//! House domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct House {
    pub id: Uuid,
    /// Postal address, unique across houses.
    pub address: String,
    pub info: String,
    /// First day of the month residents may submit readings (1–31).
    pub start_readings_day: u8,
    /// Last day of the month residents may submit readings (1–31).
    pub end_readings_day: u8,
    pub managers: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHouse {
    pub address: String,
    pub info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateHouse {
    pub info: Option<String>,
    pub start_readings_day: Option<u8>,
    pub end_readings_day: Option<u8>,
    pub managers: Option<Vec<Uuid>>,
}

/// Filters for house listing.
#[derive(Debug, Clone, Default)]
pub struct HouseFilter {
    pub address: Option<String>,
    /// Only houses managed by this user.
    pub manager: Option<Uuid>,
}
