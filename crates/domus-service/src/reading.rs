//! Meter reading lifecycle.

use chrono::Datelike;
use domus_core::authz::{ActionClass, authorize};
use domus_core::clock::Clock;
use domus_core::error::{DomusError, DomusResult};
use domus_core::models::reading::{CreateReading, Reading, round_value};
pub use domus_core::models::reading::MonthRange;
use domus_core::models::user::Principal;
use domus_core::repository::{
    ApartmentRepository, CounterRepository, HouseRepository, Pagination, ReadingRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::membership;

pub struct ReadingService<H, A, C, R, K>
where
    H: HouseRepository,
    A: ApartmentRepository,
    C: CounterRepository,
    R: ReadingRepository,
    K: Clock,
{
    houses: H,
    apartments: A,
    counters: C,
    readings: R,
    clock: K,
}

impl<H, A, C, R, K> ReadingService<H, A, C, R, K>
where
    H: HouseRepository,
    A: ApartmentRepository,
    C: CounterRepository,
    R: ReadingRepository,
    K: Clock,
{
    pub fn new(houses: H, apartments: A, counters: C, readings: R, clock: K) -> Self {
        Self {
            houses,
            apartments,
            counters,
            readings,
            clock,
        }
    }

    /// Record the current month's reading for a counter.
    ///
    /// Resident-scoped. One reading per counter per calendar month;
    /// values never decrease below the latest recorded reading and are
    /// rounded half-up to one decimal place before persisting.
    pub async fn add_reading(
        &self,
        principal: &Principal,
        counter_id: Uuid,
        value: f64,
    ) -> DomusResult<Reading> {
        let (counter, _, _, relations) = membership::counter_relations(
            &self.houses,
            &self.apartments,
            &self.counters,
            principal,
            counter_id,
        )
        .await?;
        authorize(&relations, ActionClass::ResidentScoped)?;

        let now = self.clock.now();
        let (year, month) = (now.year(), now.month());

        if self
            .readings
            .get_for_month(counter.id, year, month)
            .await?
            .is_some()
        {
            return Err(DomusError::conflict(format!(
                "a reading for {year}-{month:02} already exists"
            )));
        }

        if let Some(latest) = self.readings.latest_for_counter(counter.id).await?
            && value < latest.value
        {
            return Err(DomusError::conflict(format!(
                "value {value} is below the last recorded reading {}",
                latest.value
            )));
        }

        let reading = self
            .readings
            .create(CreateReading {
                counter_id: counter.id,
                user_id: principal.user_id,
                value: round_value(value),
                year,
                month,
                created_at: now,
            })
            .await?;
        info!(counter_id = %counter.id, year, month, "reading recorded");
        Ok(reading)
    }

    /// Resident-scoped unconditional delete.
    pub async fn remove_reading(&self, principal: &Principal, reading_id: Uuid) -> DomusResult<()> {
        let reading = self.readings.get_by_id(reading_id).await?;
        let (_, _, _, relations) = membership::counter_relations(
            &self.houses,
            &self.apartments,
            &self.counters,
            principal,
            reading.counter_id,
        )
        .await?;
        authorize(&relations, ActionClass::ResidentScoped)?;

        self.readings.delete(reading_id).await
    }

    /// Resident-scoped listing, newest first, optionally bounded to a
    /// month range.
    pub async fn list_readings(
        &self,
        principal: &Principal,
        counter_id: Uuid,
        range: MonthRange,
        pagination: Pagination,
    ) -> DomusResult<Vec<Reading>> {
        let (counter, _, _, relations) = membership::counter_relations(
            &self.houses,
            &self.apartments,
            &self.counters,
            principal,
            counter_id,
        )
        .await?;
        authorize(&relations, ActionClass::ResidentScoped)?;

        self.readings
            .list_for_counter(counter.id, range, pagination)
            .await
    }
}
