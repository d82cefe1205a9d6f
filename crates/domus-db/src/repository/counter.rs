//! SurrealDB implementation of [`CounterRepository`].

use domus_core::error::DomusResult;
use domus_core::models::counter::{Counter, CounterKind, CreateCounter};
use domus_core::repository::CounterRepository;
use serde::{Deserialize, Serialize};
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, Serialize, Deserialize)]
struct CounterRow {
    apartment_id: String,
    kind: CounterKind,
    serial_number: String,
    name: String,
    active: bool,
}

#[derive(Debug, Deserialize)]
struct CounterRowWithId {
    record_id: String,
    apartment_id: String,
    kind: CounterKind,
    serial_number: String,
    name: String,
    active: bool,
}

impl CounterRow {
    fn into_counter(self, id: Uuid) -> Result<Counter, DbError> {
        Ok(Counter {
            id,
            apartment_id: parse_uuid(&self.apartment_id, "apartment")?,
            kind: self.kind,
            serial_number: self.serial_number,
            name: self.name,
            active: self.active,
        })
    }
}

impl CounterRowWithId {
    fn try_into_counter(self) -> Result<Counter, DbError> {
        let id = parse_uuid(&self.record_id, "counter")?;
        Ok(Counter {
            id,
            apartment_id: parse_uuid(&self.apartment_id, "apartment")?,
            kind: self.kind,
            serial_number: self.serial_number,
            name: self.name,
            active: self.active,
        })
    }
}

/// SurrealDB implementation of the Counter repository.
#[derive(Clone)]
pub struct SurrealCounterRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCounterRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CounterRepository for SurrealCounterRepository<C> {
    async fn create(&self, input: CreateCounter) -> DomusResult<Counter> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let data = CounterRow {
            apartment_id: input.apartment_id.to_string(),
            kind: input.kind,
            serial_number: input.serial_number,
            name: input.name,
            active: input.active,
        };

        let result = self
            .db
            .query("CREATE type::thing('counter', $id) CONTENT $data")
            .bind(("id", id_str.clone()))
            .bind(("data", data))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<CounterRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "counter".into(),
            id: id_str,
        })?;

        Ok(row.into_counter(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> DomusResult<Counter> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('counter', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CounterRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "counter".into(),
            id: id_str,
        })?;

        Ok(row.into_counter(id)?)
    }

    async fn get_by_serial(&self, serial_number: &str) -> DomusResult<Counter> {
        let mut result = self
            .db
            .query(
                "SELECT *, meta::id(id) AS record_id FROM counter \
                 WHERE serial_number = $serial_number",
            )
            .bind(("serial_number", serial_number.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CounterRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "counter".into(),
            id: format!("serial={serial_number}"),
        })?;

        Ok(row.try_into_counter()?)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> DomusResult<Counter> {
        let id_str = id.to_string();

        let result = self
            .db
            .query("UPDATE type::thing('counter', $id) SET active = $active")
            .bind(("id", id_str.clone()))
            .bind(("active", active))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<CounterRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "counter".into(),
            id: id_str,
        })?;

        Ok(row.into_counter(id)?)
    }

    async fn delete(&self, id: Uuid) -> DomusResult<()> {
        self.db
            .query("DELETE type::thing('counter', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list_by_apartment(
        &self,
        apartment_id: Uuid,
        kind: Option<CounterKind>,
    ) -> DomusResult<Vec<Counter>> {
        let kind_clause = if kind.is_some() {
            "AND kind = $kind "
        } else {
            ""
        };
        let query = format!(
            "SELECT *, meta::id(id) AS record_id FROM counter \
             WHERE apartment_id = $apartment_id {kind_clause}\
             ORDER BY serial_number ASC"
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("apartment_id", apartment_id.to_string()));
        if let Some(kind) = kind {
            builder = builder.bind(("kind", kind));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<CounterRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(CounterRowWithId::try_into_counter)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn list_by_apartments(
        &self,
        apartment_ids: &[Uuid],
        kind: CounterKind,
    ) -> DomusResult<Vec<Counter>> {
        let ids: Vec<String> = apartment_ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT *, meta::id(id) AS record_id FROM counter \
                 WHERE apartment_id IN $apartment_ids AND kind = $kind \
                 ORDER BY serial_number ASC",
            )
            .bind(("apartment_ids", ids))
            .bind(("kind", kind))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CounterRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(CounterRowWithId::try_into_counter)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
