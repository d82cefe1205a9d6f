//! Counter lifecycle and the change-request workflow.
//!
//! Adding or removing a metering device is never immediate: the
//! operation opens a pending [`ChangeRequest`] that a house manager
//! resolves. Resolution applies one of four outcome paths, deletes the
//! request document and notifies the requester exactly once.

use chrono::{Datelike, Duration};
use domus_core::authz::{ActionClass, authorize};
use domus_core::clock::Clock;
use domus_core::error::{DomusError, DomusResult};
use domus_core::models::counter::{Counter, CounterKind, CounterStatus, CreateCounter};
use domus_core::models::event::{CreateEvent, EventKind};
use domus_core::models::reading::{CreateReading, round_value};
use domus_core::models::request::{
    ChangeRequest, CreateChangeRequest, RequestKind, RequestOutcome,
};
use domus_core::models::user::Principal;
use domus_core::repository::{
    ApartmentRepository, ChangeRequestRepository, CounterRepository, EventRepository,
    HouseRepository, ReadingRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::membership;

/// Days the seed reading is backdated so the first real reading can
/// land in the current month.
const SEED_READING_BACKDATE_DAYS: i64 = 60;

/// Input for registering a new metering device.
#[derive(Debug)]
pub struct AddCounterInput {
    pub apartment_id: Uuid,
    /// Counter kind name ("electricity", "hot_water", "cold_water",
    /// "gas"). Unknown names are rejected as invalid input.
    pub kind: String,
    pub serial_number: String,
    pub name: String,
    /// Value already on the device's dial, seeded as a backdated
    /// reading.
    pub start_value: f64,
    /// Free-form justification shown to the reviewing manager.
    pub reason: String,
}

pub struct CounterService<H, A, C, R, Q, E, K>
where
    H: HouseRepository,
    A: ApartmentRepository,
    C: CounterRepository,
    R: ReadingRepository,
    Q: ChangeRequestRepository,
    E: EventRepository,
    K: Clock,
{
    houses: H,
    apartments: A,
    counters: C,
    readings: R,
    requests: Q,
    events: E,
    clock: K,
    config: ServiceConfig,
}

impl<H, A, C, R, Q, E, K> CounterService<H, A, C, R, Q, E, K>
where
    H: HouseRepository,
    A: ApartmentRepository,
    C: CounterRepository,
    R: ReadingRepository,
    Q: ChangeRequestRepository,
    E: EventRepository,
    K: Clock,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        houses: H,
        apartments: A,
        counters: C,
        readings: R,
        requests: Q,
        events: E,
        clock: K,
        config: ServiceConfig,
    ) -> Self {
        Self {
            houses,
            apartments,
            counters,
            readings,
            requests,
            events,
            clock,
            config,
        }
    }

    /// Owner-scoped. Creates the counter inactive, seeds a backdated
    /// reading with the dial's current value, opens an Add request and
    /// notifies the requester.
    pub async fn add_counter(
        &self,
        principal: &Principal,
        input: AddCounterInput,
    ) -> DomusResult<Counter> {
        let kind: CounterKind = input.kind.parse()?;

        let (apartment, house, relations) = membership::apartment_relations(
            &self.houses,
            &self.apartments,
            principal,
            input.apartment_id,
        )
        .await?;
        authorize(&relations, ActionClass::OwnerScoped)?;

        match self.counters.get_by_serial(&input.serial_number).await {
            Ok(_) => {
                return Err(DomusError::conflict(format!(
                    "a counter with serial {} is already registered",
                    input.serial_number
                )));
            }
            Err(DomusError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let counter = self
            .counters
            .create(CreateCounter {
                apartment_id: apartment.id,
                kind,
                serial_number: input.serial_number,
                name: input.name,
                active: false,
            })
            .await?;

        // Seed reading, backdated so the current month stays open.
        let seeded_at = self.clock.now() - Duration::days(SEED_READING_BACKDATE_DAYS);
        self.readings
            .create(CreateReading {
                counter_id: counter.id,
                user_id: principal.user_id,
                value: round_value(input.start_value),
                year: seeded_at.year(),
                month: seeded_at.month(),
                created_at: seeded_at,
            })
            .await?;

        let request = self
            .requests
            .create(CreateChangeRequest {
                counter_id: counter.id,
                kind: RequestKind::Add,
                reason: input.reason,
                house_id: house.id,
                user_id: principal.user_id,
                counter_kind: counter.kind,
                counter_serial_number: counter.serial_number.clone(),
                apartment_number: apartment.number.clone(),
                created_at: self.clock.now(),
            })
            .await?;

        self.notify(
            principal.user_id,
            Some(house.id),
            "Counter addition requested",
            format!(
                "Your request to add counter {} in apartment {} is awaiting review",
                counter.serial_number, apartment.number
            ),
        )
        .await?;

        info!(counter_id = %counter.id, request_id = %request.id, "counter addition requested");
        Ok(counter)
    }

    /// Owner-scoped. Deactivates the counter and opens a Delete
    /// request.
    pub async fn remove_counter(
        &self,
        principal: &Principal,
        counter_id: Uuid,
        reason: String,
    ) -> DomusResult<()> {
        let (counter, apartment, house, relations) = membership::counter_relations(
            &self.houses,
            &self.apartments,
            &self.counters,
            principal,
            counter_id,
        )
        .await?;
        authorize(&relations, ActionClass::OwnerScoped)?;

        self.counters.set_active(counter.id, false).await?;

        let request = self
            .requests
            .create(CreateChangeRequest {
                counter_id: counter.id,
                kind: RequestKind::Delete,
                reason,
                house_id: house.id,
                user_id: principal.user_id,
                counter_kind: counter.kind,
                counter_serial_number: counter.serial_number.clone(),
                apartment_number: apartment.number.clone(),
                created_at: self.clock.now(),
            })
            .await?;

        self.notify(
            principal.user_id,
            Some(house.id),
            "Counter removal requested",
            format!(
                "Your request to remove counter {} in apartment {} is awaiting review",
                counter.serial_number, apartment.number
            ),
        )
        .await?;

        info!(counter_id = %counter.id, request_id = %request.id, "counter removal requested");
        Ok(())
    }

    /// Resident-scoped listing; each row says whether the current
    /// month's reading has been recorded.
    pub async fn list_counters(
        &self,
        principal: &Principal,
        apartment_id: Uuid,
        kind: Option<CounterKind>,
    ) -> DomusResult<Vec<CounterStatus>> {
        let (apartment, _, relations) = membership::apartment_relations(
            &self.houses,
            &self.apartments,
            principal,
            apartment_id,
        )
        .await?;
        authorize(&relations, ActionClass::ResidentScoped)?;

        let now = self.clock.now();
        let counters = self.counters.list_by_apartment(apartment.id, kind).await?;

        let mut statuses = Vec::with_capacity(counters.len());
        for counter in counters {
            let has_current_reading = self
                .readings
                .get_for_month(counter.id, now.year(), now.month())
                .await?
                .is_some();
            statuses.push(CounterStatus {
                counter,
                has_current_reading,
            });
        }
        Ok(statuses)
    }

    /// Manager-scoped listing of a house's pending requests.
    pub async fn list_requests(
        &self,
        principal: &Principal,
        house_id: Uuid,
    ) -> DomusResult<Vec<ChangeRequest>> {
        let (_, relations) = membership::house_relations(&self.houses, principal, house_id).await?;
        authorize(&relations, ActionClass::HouseScoped)?;
        self.requests.list_by_house(house_id).await
    }

    /// Resolve a pending request. Manager-scoped on the request's
    /// house.
    ///
    /// Outcome paths:
    /// - Approved Add: counter activated.
    /// - Approved Delete: counter deleted.
    /// - Rejected Add: counter and its seeded readings deleted.
    /// - Rejected Delete: counter re-activated.
    ///
    /// Every path deletes the request and notifies the requester from
    /// the system sender identity.
    pub async fn resolve_request(
        &self,
        principal: &Principal,
        request_id: Uuid,
        outcome: RequestOutcome,
    ) -> DomusResult<()> {
        let request = self.requests.get_by_id(request_id).await?;
        let (_, relations) =
            membership::house_relations(&self.houses, principal, request.house_id).await?;
        authorize(&relations, ActionClass::RequestResolution)?;

        match (outcome, request.kind) {
            (RequestOutcome::Approved, RequestKind::Add) => {
                self.counters.set_active(request.counter_id, true).await?;
            }
            (RequestOutcome::Approved, RequestKind::Delete) => {
                self.counters.delete(request.counter_id).await?;
            }
            (RequestOutcome::Rejected, RequestKind::Add) => {
                self.readings.delete_by_counter(request.counter_id).await?;
                self.counters.delete(request.counter_id).await?;
            }
            (RequestOutcome::Rejected, RequestKind::Delete) => {
                self.counters.set_active(request.counter_id, true).await?;
            }
        }

        self.requests.delete(request.id).await?;

        let verdict = match outcome {
            RequestOutcome::Approved => "approved",
            RequestOutcome::Rejected => "rejected",
        };
        let action = match request.kind {
            RequestKind::Add => "add",
            RequestKind::Delete => "remove",
        };
        self.events
            .create(CreateEvent {
                user_id: request.user_id,
                kind: EventKind::Notification,
                title: format!("Counter request {verdict}"),
                details: format!(
                    "Your request to {action} counter {} ({}) in apartment {} was {verdict}",
                    request.counter_serial_number,
                    request.counter_kind.as_str(),
                    request.apartment_number
                ),
                sender_id: self.config.system_sender,
                house_id: Some(request.house_id),
                created_at: self.clock.now(),
            })
            .await?;

        info!(request_id = %request.id, verdict, "change request resolved");
        Ok(())
    }

    async fn notify(
        &self,
        user_id: Uuid,
        house_id: Option<Uuid>,
        title: &str,
        details: String,
    ) -> DomusResult<()> {
        self.events
            .create(CreateEvent {
                user_id,
                kind: EventKind::Notification,
                title: title.to_string(),
                details,
                sender_id: self.config.system_sender,
                house_id,
                created_at: self.clock.now(),
            })
            .await?;
        Ok(())
    }
}
