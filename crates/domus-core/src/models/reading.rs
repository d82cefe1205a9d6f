//! Meter reading domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub counter_id: Uuid,
    /// Who recorded the reading.
    pub user_id: Uuid,
    /// Cumulative counter value, one decimal place.
    pub value: f64,
    pub year: i32,
    pub month: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReading {
    pub counter_id: Uuid,
    pub user_id: Uuid,
    pub value: f64,
    pub year: i32,
    pub month: u32,
    pub created_at: DateTime<Utc>,
}

/// Inclusive (year, month) bounds for a reading listing. Open on
/// either end when `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthRange {
    pub from: Option<(i32, u32)>,
    pub to: Option<(i32, u32)>,
}

impl MonthRange {
    pub fn contains(&self, year: i32, month: u32) -> bool {
        let key = (year, month);
        self.from.is_none_or(|from| key >= from) && self.to.is_none_or(|to| key <= to)
    }
}

/// Round a counter value to one decimal place before persisting.
pub fn round_value(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The calendar month immediately before (year, month), handling the
/// December → January rollover.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round_value(12.34), 12.3);
        assert_eq!(round_value(12.35), 12.4);
        assert_eq!(round_value(12.0), 12.0);
    }

    #[test]
    fn previous_month_rolls_over_year() {
        assert_eq!(previous_month(2024, 1), (2023, 12));
        assert_eq!(previous_month(2024, 6), (2024, 5));
    }

    #[test]
    fn month_range_bounds_are_inclusive() {
        let range = MonthRange {
            from: Some((2024, 11)),
            to: Some((2025, 2)),
        };
        assert!(range.contains(2024, 11));
        assert!(range.contains(2025, 1));
        assert!(range.contains(2025, 2));
        assert!(!range.contains(2024, 10));
        assert!(!range.contains(2025, 3));
    }

    #[test]
    fn open_range_contains_everything() {
        let range = MonthRange::default();
        assert!(range.contains(1999, 1));
        assert!(range.contains(2100, 12));
    }
}
