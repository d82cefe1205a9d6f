//! SurrealDB implementation of [`ChangeRequestRepository`].
//!
//! A stored request is always pending. Resolution deletes the
//! document, so there is no status column to update.

use domus_core::error::DomusResult;
use domus_core::models::counter::CounterKind;
use domus_core::models::request::{ChangeRequest, CreateChangeRequest, RequestKind};
use domus_core::repository::ChangeRequestRepository;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{from_datetime, parse_uuid, to_datetime};

#[derive(Debug, Serialize, Deserialize)]
struct ChangeRequestRow {
    counter_id: String,
    kind: RequestKind,
    reason: String,
    house_id: String,
    user_id: String,
    counter_kind: CounterKind,
    counter_serial_number: String,
    apartment_number: String,
    created_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct ChangeRequestRowWithId {
    record_id: String,
    counter_id: String,
    kind: RequestKind,
    reason: String,
    house_id: String,
    user_id: String,
    counter_kind: CounterKind,
    counter_serial_number: String,
    apartment_number: String,
    created_at: Datetime,
}

impl ChangeRequestRow {
    fn into_request(self, id: Uuid) -> Result<ChangeRequest, DbError> {
        Ok(ChangeRequest {
            id,
            counter_id: parse_uuid(&self.counter_id, "counter")?,
            kind: self.kind,
            reason: self.reason,
            house_id: parse_uuid(&self.house_id, "house")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            counter_kind: self.counter_kind,
            counter_serial_number: self.counter_serial_number,
            apartment_number: self.apartment_number,
            created_at: from_datetime(self.created_at),
        })
    }
}

impl ChangeRequestRowWithId {
    fn try_into_request(self) -> Result<ChangeRequest, DbError> {
        let id = parse_uuid(&self.record_id, "change_request")?;
        Ok(ChangeRequest {
            id,
            counter_id: parse_uuid(&self.counter_id, "counter")?,
            kind: self.kind,
            reason: self.reason,
            house_id: parse_uuid(&self.house_id, "house")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            counter_kind: self.counter_kind,
            counter_serial_number: self.counter_serial_number,
            apartment_number: self.apartment_number,
            created_at: from_datetime(self.created_at),
        })
    }
}

/// SurrealDB implementation of the ChangeRequest repository.
#[derive(Clone)]
pub struct SurrealChangeRequestRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealChangeRequestRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ChangeRequestRepository for SurrealChangeRequestRepository<C> {
    async fn create(&self, input: CreateChangeRequest) -> DomusResult<ChangeRequest> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let data = ChangeRequestRow {
            counter_id: input.counter_id.to_string(),
            kind: input.kind,
            reason: input.reason,
            house_id: input.house_id.to_string(),
            user_id: input.user_id.to_string(),
            counter_kind: input.counter_kind,
            counter_serial_number: input.counter_serial_number,
            apartment_number: input.apartment_number,
            created_at: to_datetime(input.created_at),
        };

        let result = self
            .db
            .query("CREATE type::thing('change_request', $id) CONTENT $data")
            .bind(("id", id_str.clone()))
            .bind(("data", data))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<ChangeRequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "change_request".into(),
            id: id_str,
        })?;

        Ok(row.into_request(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> DomusResult<ChangeRequest> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('change_request', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ChangeRequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "change_request".into(),
            id: id_str,
        })?;

        Ok(row.into_request(id)?)
    }

    async fn delete(&self, id: Uuid) -> DomusResult<()> {
        self.db
            .query("DELETE type::thing('change_request', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list_by_house(&self, house_id: Uuid) -> DomusResult<Vec<ChangeRequest>> {
        let mut result = self
            .db
            .query(
                "SELECT *, meta::id(id) AS record_id FROM change_request \
                 WHERE house_id = $house_id ORDER BY created_at ASC",
            )
            .bind(("house_id", house_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ChangeRequestRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(ChangeRequestRowWithId::try_into_request)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
