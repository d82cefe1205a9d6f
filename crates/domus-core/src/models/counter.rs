//! Utility counter (metering device) domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomusError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    Electricity,
    HotWater,
    ColdWater,
    Gas,
}

impl CounterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKind::Electricity => "electricity",
            CounterKind::HotWater => "hot_water",
            CounterKind::ColdWater => "cold_water",
            CounterKind::Gas => "gas",
        }
    }
}

impl std::str::FromStr for CounterKind {
    type Err = DomusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electricity" => Ok(CounterKind::Electricity),
            "hot_water" => Ok(CounterKind::HotWater),
            "cold_water" => Ok(CounterKind::ColdWater),
            "gas" => Ok(CounterKind::Gas),
            other => Err(DomusError::invalid_input(format!(
                "unknown counter type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    pub id: Uuid,
    pub apartment_id: Uuid,
    pub kind: CounterKind,
    /// Globally unique device serial number.
    pub serial_number: String,
    pub name: String,
    /// False while a pending add/delete request exists.
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCounter {
    pub apartment_id: Uuid,
    pub kind: CounterKind,
    pub serial_number: String,
    pub name: String,
    pub active: bool,
}

/// Counter listing row: the counter plus whether a reading has
/// already been recorded for the current month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterStatus {
    #[serde(flatten)]
    pub counter: Counter,
    pub has_current_reading: bool,
}
