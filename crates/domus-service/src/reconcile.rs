//! Reading reconciliation engine.
//!
//! Builds the per-kind monthly tables a manager hands to the billing
//! side: every counter of a kind across a house, joined against the
//! current and previous month's readings. Output renders to plain
//! string cells so repeated runs over the same data are
//! byte-identical.

use std::collections::HashMap;

use domus_core::authz::{ActionClass, authorize};
use domus_core::error::{DomusError, DomusResult};
use domus_core::models::apartment::Apartment;
use domus_core::models::counter::{Counter, CounterKind};
use domus_core::models::house::House;
use domus_core::models::reading::{Reading, previous_month};
use domus_core::models::user::Principal;
use domus_core::repository::{
    ApartmentRepository, CounterRepository, HouseRepository, ReadingRepository,
};
use tracing::debug;
use uuid::Uuid;

use crate::membership;

/// One row of a reconciliation table: a counter of the requested kind,
/// or a flat-rate placeholder for an apartment without one.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Apartment sequence number, present on the apartment's first row
    /// only.
    pub seq: Option<u32>,
    pub apartment_number: String,
    pub counter_name: String,
    pub serial_number: String,
    pub previous: Option<f64>,
    pub current: Option<f64>,
    /// current − previous when both are recorded, otherwise 0.
    pub delta: f64,
    /// True for apartments with no counter of the kind, billed at a
    /// flat rate.
    pub flat_rate: bool,
}

/// Placeholder text in the device column of a flat-rate row.
const FLAT_RATE_DEVICE_TAG: &str = "no metering devices";
/// Placeholder text in the consumption column of a flat-rate row.
const FLAT_RATE_BILLING_TAG: &str = "flat rate";

/// A reconciliation table for one counter kind and one calendar month.
#[derive(Debug, Clone)]
pub struct ReadingTable {
    pub kind: CounterKind,
    pub year: i32,
    pub month: u32,
    pub house_address: String,
    pub rows: Vec<TableRow>,
}

impl ReadingTable {
    /// Render to string cells for the export sink. Absent values are
    /// blank; numbers carry exactly one decimal place. Flat-rate rows
    /// carry their tags in the device and consumption columns.
    pub fn to_cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                vec![
                    row.seq.map(|s| s.to_string()).unwrap_or_default(),
                    format!("{}, apt. {}", self.house_address, row.apartment_number),
                    if row.flat_rate {
                        FLAT_RATE_DEVICE_TAG.to_string()
                    } else {
                        row.counter_name.clone()
                    },
                    row.serial_number.clone(),
                    row.previous.map(format_value).unwrap_or_default(),
                    row.current.map(format_value).unwrap_or_default(),
                    if row.flat_rate {
                        FLAT_RATE_BILLING_TAG.to_string()
                    } else {
                        format_value(row.delta)
                    },
                ]
            })
            .collect()
    }
}

/// The three per-kind tables for one house and month.
#[derive(Debug, Clone)]
pub struct MonthlyReport {
    pub electricity: ReadingTable,
    pub hot_water: ReadingTable,
    pub cold_water: ReadingTable,
}

fn format_value(value: f64) -> String {
    format!("{value:.1}")
}

/// Join apartments, counters and the two months' readings into table
/// rows. Pure; apartment order is the caller's listing order.
fn build_table(
    kind: CounterKind,
    year: i32,
    month: u32,
    house_address: &str,
    apartments: &[Apartment],
    counters: &[Counter],
    current: &HashMap<Uuid, f64>,
    previous: &HashMap<Uuid, f64>,
) -> ReadingTable {
    let mut by_apartment: HashMap<Uuid, Vec<&Counter>> = HashMap::new();
    for counter in counters {
        by_apartment
            .entry(counter.apartment_id)
            .or_default()
            .push(counter);
    }

    let mut rows = Vec::new();
    let mut seq = 0u32;
    for apartment in apartments {
        seq += 1;
        match by_apartment.get(&apartment.id) {
            Some(counters) => {
                for (i, counter) in counters.iter().enumerate() {
                    let cur = current.get(&counter.id).copied();
                    let prev = previous.get(&counter.id).copied();
                    let delta = match (cur, prev) {
                        (Some(c), Some(p)) => c - p,
                        _ => 0.0,
                    };
                    rows.push(TableRow {
                        seq: (i == 0).then_some(seq),
                        apartment_number: apartment.number.clone(),
                        counter_name: counter.name.clone(),
                        serial_number: counter.serial_number.clone(),
                        previous: prev,
                        current: cur,
                        delta,
                        flat_rate: false,
                    });
                }
            }
            None => rows.push(TableRow {
                seq: Some(seq),
                apartment_number: apartment.number.clone(),
                counter_name: String::new(),
                serial_number: String::new(),
                previous: None,
                current: None,
                delta: 0.0,
                flat_rate: true,
            }),
        }
    }

    ReadingTable {
        kind,
        year,
        month,
        house_address: house_address.to_string(),
        rows,
    }
}

pub struct ReconcileService<H, A, C, R>
where
    H: HouseRepository,
    A: ApartmentRepository,
    C: CounterRepository,
    R: ReadingRepository,
{
    houses: H,
    apartments: A,
    counters: C,
    readings: R,
}

impl<H, A, C, R> ReconcileService<H, A, C, R>
where
    H: HouseRepository,
    A: ApartmentRepository,
    C: CounterRepository,
    R: ReadingRepository,
{
    pub fn new(houses: H, apartments: A, counters: C, readings: R) -> Self {
        Self {
            houses,
            apartments,
            counters,
            readings,
        }
    }

    /// Manager-scoped reconciliation table for one counter kind.
    pub async fn reading_table(
        &self,
        principal: &Principal,
        house_id: Uuid,
        kind: CounterKind,
        year: i32,
        month: u32,
    ) -> DomusResult<ReadingTable> {
        validate_period(year, month)?;

        let (house, relations) =
            membership::house_relations(&self.houses, principal, house_id).await?;
        authorize(&relations, ActionClass::HouseScoped)?;

        self.table_for(&house, kind, year, month).await
    }

    /// Manager-scoped monthly report: the electricity, hot-water and
    /// cold-water tables built concurrently.
    pub async fn monthly_report(
        &self,
        principal: &Principal,
        house_id: Uuid,
        year: i32,
        month: u32,
    ) -> DomusResult<MonthlyReport> {
        validate_period(year, month)?;

        let (house, relations) =
            membership::house_relations(&self.houses, principal, house_id).await?;
        authorize(&relations, ActionClass::HouseScoped)?;

        let (electricity, hot_water, cold_water) = tokio::join!(
            self.table_for(&house, CounterKind::Electricity, year, month),
            self.table_for(&house, CounterKind::HotWater, year, month),
            self.table_for(&house, CounterKind::ColdWater, year, month),
        );

        Ok(MonthlyReport {
            electricity: electricity?,
            hot_water: hot_water?,
            cold_water: cold_water?,
        })
    }

    async fn table_for(
        &self,
        house: &House,
        kind: CounterKind,
        year: i32,
        month: u32,
    ) -> DomusResult<ReadingTable> {
        let apartments = self.apartments.list_by_house(house.id).await?;
        let apartment_ids: Vec<Uuid> = apartments.iter().map(|a| a.id).collect();
        let counters = self.counters.list_by_apartments(&apartment_ids, kind).await?;
        let counter_ids: Vec<Uuid> = counters.iter().map(|c| c.id).collect();

        let current = self
            .readings
            .list_for_month(&counter_ids, year, month)
            .await?;
        let (prev_year, prev_month) = previous_month(year, month);
        let previous = self
            .readings
            .list_for_month(&counter_ids, prev_year, prev_month)
            .await?;

        debug!(
            house_id = %house.id,
            kind = kind.as_str(),
            counters = counters.len(),
            "reconciliation table built"
        );
        Ok(build_table(
            kind,
            year,
            month,
            &house.address,
            &apartments,
            &counters,
            &index_by_counter(current),
            &index_by_counter(previous),
        ))
    }
}

fn index_by_counter(readings: Vec<Reading>) -> HashMap<Uuid, f64> {
    readings.into_iter().map(|r| (r.counter_id, r.value)).collect()
}

fn validate_period(year: i32, month: u32) -> DomusResult<()> {
    if !(1..=12).contains(&month) {
        return Err(DomusError::invalid_input(format!(
            "month out of range: {month}"
        )));
    }
    if !(2020..=2100).contains(&year) {
        return Err(DomusError::invalid_input(format!(
            "year out of range: {year}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apartment(number: &str) -> Apartment {
        Apartment {
            id: Uuid::new_v4(),
            house_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            entrance: "1".into(),
            floor: "1".into(),
            number: number.into(),
            residents: Vec::new(),
        }
    }

    fn counter(apartment_id: Uuid, serial: &str) -> Counter {
        Counter {
            id: Uuid::new_v4(),
            apartment_id,
            kind: CounterKind::Electricity,
            serial_number: serial.into(),
            name: "meter".into(),
            active: true,
        }
    }

    #[test]
    fn seq_appears_once_per_apartment() {
        let apt = apartment("1");
        let c1 = counter(apt.id, "S-1");
        let c2 = counter(apt.id, "S-2");

        let table = build_table(
            CounterKind::Electricity,
            2025,
            6,
            "1 Elm St",
            &[apt],
            &[c1, c2],
            &HashMap::new(),
            &HashMap::new(),
        );

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].seq, Some(1));
        assert_eq!(table.rows[1].seq, None);
    }

    #[test]
    fn counterless_apartment_gets_flat_rate_row() {
        let with = apartment("1");
        let without = apartment("2");
        let c = counter(with.id, "S-1");

        let table = build_table(
            CounterKind::Electricity,
            2025,
            6,
            "1 Elm St",
            &[with, without],
            &[c],
            &HashMap::new(),
            &HashMap::new(),
        );

        assert_eq!(table.rows.len(), 2);
        assert!(!table.rows[0].flat_rate);
        assert!(table.rows[1].flat_rate);
        assert_eq!(table.rows[1].seq, Some(2));
        assert_eq!(table.rows[1].delta, 0.0);

        // The rendered row tags the device and consumption columns.
        let cells = table.to_cells();
        assert_eq!(cells[1][1], "1 Elm St, apt. 2");
        assert_eq!(cells[1][2], FLAT_RATE_DEVICE_TAG);
        assert_eq!(cells[1][3], "");
        assert_eq!(cells[1][6], FLAT_RATE_BILLING_TAG);
    }

    #[test]
    fn delta_requires_both_months() {
        let apt = apartment("1");
        let c = counter(apt.id, "S-1");
        let id = c.id;

        let current: HashMap<Uuid, f64> = [(id, 120.5)].into();
        let previous: HashMap<Uuid, f64> = [(id, 100.0)].into();

        let both = build_table(
            CounterKind::Electricity,
            2025,
            6,
            "1 Elm St",
            std::slice::from_ref(&apt),
            std::slice::from_ref(&c),
            &current,
            &previous,
        );
        assert_eq!(both.rows[0].delta, 20.5);

        let only_current = build_table(
            CounterKind::Electricity,
            2025,
            6,
            "1 Elm St",
            std::slice::from_ref(&apt),
            std::slice::from_ref(&c),
            &current,
            &HashMap::new(),
        );
        assert_eq!(only_current.rows[0].delta, 0.0);
    }

    #[test]
    fn cells_are_blank_for_absent_values() {
        let apt = apartment("7");
        let c = counter(apt.id, "S-9");
        let id = c.id;
        let current: HashMap<Uuid, f64> = [(id, 50.0)].into();

        let table = build_table(
            CounterKind::Electricity,
            2025,
            6,
            "9 Oak St",
            &[apt],
            &[c],
            &current,
            &HashMap::new(),
        );
        let cells = table.to_cells();
        assert_eq!(
            cells[0],
            vec![
                "1".to_string(),
                "9 Oak St, apt. 7".to_string(),
                "meter".to_string(),
                "S-9".to_string(),
                String::new(),
                "50.0".to_string(),
                "0.0".to_string(),
            ]
        );
    }

    #[test]
    fn period_validation() {
        assert!(validate_period(2025, 6).is_ok());
        assert!(validate_period(2025, 0).is_err());
        assert!(validate_period(2025, 13).is_err());
        assert!(validate_period(2019, 6).is_err());
        assert!(validate_period(2101, 6).is_err());
    }
}
