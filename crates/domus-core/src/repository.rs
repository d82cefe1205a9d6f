//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and touch a single document.
//! Concurrent writers to the same entity race; last write wins — the
//! store offers no optimistic or pessimistic locking and none is
//! layered on top.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomusResult;
use crate::models::{
    apartment::{Apartment, CreateApartment, UpdateApartment},
    counter::{Counter, CounterKind, CreateCounter},
    event::{CreateEvent, Event},
    house::{CreateHouse, House, HouseFilter, UpdateHouse},
    reading::{CreateReading, MonthRange, Reading},
    request::{ChangeRequest, CreateChangeRequest},
    session::{CreateSession, Session},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
        }
    }
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = DomusResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomusResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = DomusResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = DomusResult<User>> + Send;
}

pub trait HouseRepository: Send + Sync {
    fn create(&self, input: CreateHouse) -> impl Future<Output = DomusResult<House>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomusResult<House>> + Send;
    fn get_by_address(&self, address: &str) -> impl Future<Output = DomusResult<House>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateHouse,
    ) -> impl Future<Output = DomusResult<House>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = DomusResult<()>> + Send;
    fn list(
        &self,
        filter: HouseFilter,
        pagination: Pagination,
    ) -> impl Future<Output = DomusResult<Vec<House>>> + Send;
}

pub trait ApartmentRepository: Send + Sync {
    /// Creates the apartment with the owner as its first resident.
    fn create(
        &self,
        input: CreateApartment,
    ) -> impl Future<Output = DomusResult<Apartment>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomusResult<Apartment>> + Send;
    fn get_by_number(
        &self,
        house_id: Uuid,
        number: &str,
    ) -> impl Future<Output = DomusResult<Apartment>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateApartment,
    ) -> impl Future<Output = DomusResult<Apartment>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = DomusResult<()>> + Send;
    /// Apartments of a house, ordered by apartment number. This is the
    /// listing order the reconciliation tables depend on.
    fn list_by_house(
        &self,
        house_id: Uuid,
    ) -> impl Future<Output = DomusResult<Vec<Apartment>>> + Send;
    fn list_by_resident(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = DomusResult<Vec<Apartment>>> + Send;
}

pub trait CounterRepository: Send + Sync {
    fn create(&self, input: CreateCounter) -> impl Future<Output = DomusResult<Counter>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomusResult<Counter>> + Send;
    fn get_by_serial(
        &self,
        serial_number: &str,
    ) -> impl Future<Output = DomusResult<Counter>> + Send;
    fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> impl Future<Output = DomusResult<Counter>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = DomusResult<()>> + Send;
    fn list_by_apartment(
        &self,
        apartment_id: Uuid,
        kind: Option<CounterKind>,
    ) -> impl Future<Output = DomusResult<Vec<Counter>>> + Send;
    /// Counters of one kind across many apartments, for report joins.
    fn list_by_apartments(
        &self,
        apartment_ids: &[Uuid],
        kind: CounterKind,
    ) -> impl Future<Output = DomusResult<Vec<Counter>>> + Send;
}

pub trait ReadingRepository: Send + Sync {
    fn create(&self, input: CreateReading) -> impl Future<Output = DomusResult<Reading>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomusResult<Reading>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = DomusResult<()>> + Send;
    /// Removes every reading of a counter (rollback of a rejected
    /// counter addition). Returns the number removed.
    fn delete_by_counter(&self, counter_id: Uuid)
    -> impl Future<Output = DomusResult<u64>> + Send;
    /// The reading for one calendar month, if recorded.
    fn get_for_month(
        &self,
        counter_id: Uuid,
        year: i32,
        month: u32,
    ) -> impl Future<Output = DomusResult<Option<Reading>>> + Send;
    /// The most recent reading by (year, month) ordering.
    fn latest_for_counter(
        &self,
        counter_id: Uuid,
    ) -> impl Future<Output = DomusResult<Option<Reading>>> + Send;
    /// Readings of a counter within an inclusive month range, newest
    /// first. The range restricts the query itself, so pagination
    /// applies to the matching rows only.
    fn list_for_counter(
        &self,
        counter_id: Uuid,
        range: MonthRange,
        pagination: Pagination,
    ) -> impl Future<Output = DomusResult<Vec<Reading>>> + Send;
    /// All readings of one calendar month across many counters.
    fn list_for_month(
        &self,
        counter_ids: &[Uuid],
        year: i32,
        month: u32,
    ) -> impl Future<Output = DomusResult<Vec<Reading>>> + Send;
}

pub trait EventRepository: Send + Sync {
    fn create(&self, input: CreateEvent) -> impl Future<Output = DomusResult<Event>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomusResult<Event>> + Send;
    fn set_read(&self, id: Uuid, read: bool) -> impl Future<Output = DomusResult<Event>> + Send;
    fn list_for_user(
        &self,
        user_id: Uuid,
        read: Option<bool>,
        pagination: Pagination,
    ) -> impl Future<Output = DomusResult<Vec<Event>>> + Send;
}

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = DomusResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = DomusResult<Session>> + Send;
    /// Sliding-expiry update on authenticated use.
    fn touch(
        &self,
        id: Uuid,
        updated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = DomusResult<()>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = DomusResult<()>> + Send;
    /// Invalidate all sessions of a user (e.g. on password change).
    fn delete_for_user(&self, user_id: Uuid) -> impl Future<Output = DomusResult<u64>> + Send;
    /// Remove all sessions expired before `now`. Returns the number
    /// removed.
    fn cleanup_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = DomusResult<u64>> + Send;
}

pub trait ChangeRequestRepository: Send + Sync {
    fn create(
        &self,
        input: CreateChangeRequest,
    ) -> impl Future<Output = DomusResult<ChangeRequest>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomusResult<ChangeRequest>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = DomusResult<()>> + Send;
    fn list_by_house(
        &self,
        house_id: Uuid,
    ) -> impl Future<Output = DomusResult<Vec<ChangeRequest>>> + Send;
}
