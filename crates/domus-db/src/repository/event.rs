//! SurrealDB implementation of [`EventRepository`].

use domus_core::error::DomusResult;
use domus_core::models::event::{CreateEvent, Event, EventKind};
use domus_core::repository::{EventRepository, Pagination};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{from_datetime, parse_uuid, to_datetime};

#[derive(Debug, Serialize, Deserialize)]
struct EventRow {
    user_id: String,
    kind: EventKind,
    title: String,
    details: String,
    read: bool,
    sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    house_id: Option<String>,
    created_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct EventRowWithId {
    record_id: String,
    user_id: String,
    kind: EventKind,
    title: String,
    details: String,
    read: bool,
    sender_id: String,
    house_id: Option<String>,
    created_at: Datetime,
}

fn parse_house_id(house_id: Option<String>) -> Result<Option<Uuid>, DbError> {
    house_id.map(|h| parse_uuid(&h, "house")).transpose()
}

impl EventRow {
    fn into_event(self, id: Uuid) -> Result<Event, DbError> {
        Ok(Event {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            kind: self.kind,
            title: self.title,
            details: self.details,
            read: self.read,
            sender_id: parse_uuid(&self.sender_id, "sender")?,
            house_id: parse_house_id(self.house_id)?,
            created_at: from_datetime(self.created_at),
        })
    }
}

impl EventRowWithId {
    fn try_into_event(self) -> Result<Event, DbError> {
        let id = parse_uuid(&self.record_id, "event")?;
        Ok(Event {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            kind: self.kind,
            title: self.title,
            details: self.details,
            read: self.read,
            sender_id: parse_uuid(&self.sender_id, "sender")?,
            house_id: parse_house_id(self.house_id)?,
            created_at: from_datetime(self.created_at),
        })
    }
}

/// SurrealDB implementation of the Event repository.
#[derive(Clone)]
pub struct SurrealEventRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEventRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> EventRepository for SurrealEventRepository<C> {
    async fn create(&self, input: CreateEvent) -> DomusResult<Event> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // Events are born unread.
        let data = EventRow {
            user_id: input.user_id.to_string(),
            kind: input.kind,
            title: input.title,
            details: input.details,
            read: false,
            sender_id: input.sender_id.to_string(),
            house_id: input.house_id.map(|h| h.to_string()),
            created_at: to_datetime(input.created_at),
        };

        let result = self
            .db
            .query("CREATE type::thing('event', $id) CONTENT $data")
            .bind(("id", id_str.clone()))
            .bind(("data", data))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> DomusResult<Event> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('event', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn set_read(&self, id: Uuid, read: bool) -> DomusResult<Event> {
        let id_str = id.to_string();

        let result = self
            .db
            .query("UPDATE type::thing('event', $id) SET read = $read")
            .bind(("id", id_str.clone()))
            .bind(("read", read))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        read: Option<bool>,
        pagination: Pagination,
    ) -> DomusResult<Vec<Event>> {
        let read_clause = if read.is_some() {
            "AND read = $read "
        } else {
            ""
        };
        let query = format!(
            "SELECT *, meta::id(id) AS record_id FROM event \
             WHERE user_id = $user_id {read_clause}\
             ORDER BY created_at DESC LIMIT $limit START $offset"
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("user_id", user_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(read) = read {
            builder = builder.bind(("read", read));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<EventRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(EventRowWithId::try_into_event)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
