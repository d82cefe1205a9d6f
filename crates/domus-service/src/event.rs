//! Notification events.

use std::collections::BTreeSet;

use domus_core::authz::{ActionClass, authorize};
use domus_core::clock::Clock;
use domus_core::error::{DomusError, DomusResult};
use domus_core::models::event::{CreateEvent, Event, EventKind};
use domus_core::models::user::Principal;
use domus_core::repository::{
    ApartmentRepository, EventRepository, HouseRepository, Pagination,
};
use tracing::info;
use uuid::Uuid;

pub struct EventService<H, A, E, K>
where
    H: HouseRepository,
    A: ApartmentRepository,
    E: EventRepository,
    K: Clock,
{
    houses: H,
    apartments: A,
    events: E,
    clock: K,
}

impl<H, A, E, K> EventService<H, A, E, K>
where
    H: HouseRepository,
    A: ApartmentRepository,
    E: EventRepository,
    K: Clock,
{
    pub fn new(houses: H, apartments: A, events: E, clock: K) -> Self {
        Self {
            houses,
            apartments,
            events,
            clock,
        }
    }

    /// The caller's own events, newest first, optionally filtered by
    /// read state.
    pub async fn my_events(
        &self,
        principal: &Principal,
        read: Option<bool>,
        pagination: Pagination,
    ) -> DomusResult<Vec<Event>> {
        self.events
            .list_for_user(principal.user_id, read, pagination)
            .await
    }

    /// Flip an event's read flag. Only the recipient may do this.
    pub async fn mark_event(
        &self,
        principal: &Principal,
        event_id: Uuid,
        read: bool,
    ) -> DomusResult<Event> {
        let event = self.events.get_by_id(event_id).await?;
        if event.user_id != principal.user_id {
            return Err(DomusError::PermissionDenied {
                reason: "you are not the recipient of this event".into(),
            });
        }
        self.events.set_read(event_id, read).await
    }

    /// Manager-scoped broadcast to every distinct resident of a
    /// house. Returns the recipient count.
    pub async fn broadcast(
        &self,
        principal: &Principal,
        house_id: Uuid,
        kind: &str,
        title: &str,
        details: &str,
    ) -> DomusResult<usize> {
        let kind: EventKind = kind.parse()?;

        let (house, relations) =
            crate::membership::house_relations(&self.houses, principal, house_id).await?;
        authorize(&relations, ActionClass::HouseScoped)?;

        let apartments = self.apartments.list_by_house(house.id).await?;
        let recipients: BTreeSet<Uuid> = apartments
            .iter()
            .flat_map(|a| a.residents.iter().copied())
            .collect();

        let now = self.clock.now();
        for user_id in &recipients {
            self.events
                .create(CreateEvent {
                    user_id: *user_id,
                    kind,
                    title: title.to_string(),
                    details: details.to_string(),
                    sender_id: principal.user_id,
                    house_id: Some(house.id),
                    created_at: now,
                })
                .await?;
        }

        info!(house_id = %house.id, recipients = recipients.len(), "broadcast sent");
        Ok(recipients.len())
    }
}
