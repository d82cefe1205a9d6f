//! Apartment domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Apartment {
    pub id: Uuid,
    pub house_id: Uuid,
    pub owner_id: Uuid,
    pub entrance: String,
    pub floor: String,
    /// Apartment number, unique within a house. Kept as a string —
    /// addresses like "12a" exist.
    pub number: String,
    /// User ids living in the apartment. The owner is always a member.
    pub residents: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApartment {
    pub house_id: Uuid,
    pub owner_id: Uuid,
    pub entrance: String,
    pub floor: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateApartment {
    pub owner_id: Option<Uuid>,
    pub residents: Option<Vec<Uuid>>,
}
