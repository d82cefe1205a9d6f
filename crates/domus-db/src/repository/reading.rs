//! SurrealDB implementation of [`ReadingRepository`].

use domus_core::error::DomusResult;
use domus_core::models::reading::{CreateReading, MonthRange, Reading};
use domus_core::repository::{Pagination, ReadingRepository};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{CountRow, from_datetime, parse_uuid, to_datetime};

#[derive(Debug, Serialize, Deserialize)]
struct ReadingRow {
    counter_id: String,
    user_id: String,
    value: f64,
    year: i32,
    month: u32,
    created_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct ReadingRowWithId {
    record_id: String,
    counter_id: String,
    user_id: String,
    value: f64,
    year: i32,
    month: u32,
    created_at: Datetime,
}

impl ReadingRow {
    fn into_reading(self, id: Uuid) -> Result<Reading, DbError> {
        Ok(Reading {
            id,
            counter_id: parse_uuid(&self.counter_id, "counter")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            value: self.value,
            year: self.year,
            month: self.month,
            created_at: from_datetime(self.created_at),
        })
    }
}

impl ReadingRowWithId {
    fn try_into_reading(self) -> Result<Reading, DbError> {
        let id = parse_uuid(&self.record_id, "reading")?;
        Ok(Reading {
            id,
            counter_id: parse_uuid(&self.counter_id, "counter")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            value: self.value,
            year: self.year,
            month: self.month,
            created_at: from_datetime(self.created_at),
        })
    }
}

/// SurrealDB implementation of the Reading repository.
#[derive(Clone)]
pub struct SurrealReadingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReadingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ReadingRepository for SurrealReadingRepository<C> {
    async fn create(&self, input: CreateReading) -> DomusResult<Reading> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let data = ReadingRow {
            counter_id: input.counter_id.to_string(),
            user_id: input.user_id.to_string(),
            value: input.value,
            year: input.year,
            month: input.month,
            created_at: to_datetime(input.created_at),
        };

        let result = self
            .db
            .query("CREATE type::thing('reading', $id) CONTENT $data")
            .bind(("id", id_str.clone()))
            .bind(("data", data))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<ReadingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "reading".into(),
            id: id_str,
        })?;

        Ok(row.into_reading(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> DomusResult<Reading> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('reading', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReadingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "reading".into(),
            id: id_str,
        })?;

        Ok(row.into_reading(id)?)
    }

    async fn delete(&self, id: Uuid) -> DomusResult<()> {
        self.db
            .query("DELETE type::thing('reading', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn delete_by_counter(&self, counter_id: Uuid) -> DomusResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM reading \
                 WHERE counter_id = $counter_id GROUP ALL; \
                 DELETE reading WHERE counter_id = $counter_id",
            )
            .bind(("counter_id", counter_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let counts: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(counts.first().map(|c| c.total).unwrap_or(0))
    }

    async fn get_for_month(
        &self,
        counter_id: Uuid,
        year: i32,
        month: u32,
    ) -> DomusResult<Option<Reading>> {
        let mut result = self
            .db
            .query(
                "SELECT *, meta::id(id) AS record_id FROM reading \
                 WHERE counter_id = $counter_id AND year = $year AND month = $month",
            )
            .bind(("counter_id", counter_id.to_string()))
            .bind(("year", year))
            .bind(("month", month))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReadingRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(match rows.into_iter().next() {
            Some(row) => Some(row.try_into_reading()?),
            None => None,
        })
    }

    async fn latest_for_counter(&self, counter_id: Uuid) -> DomusResult<Option<Reading>> {
        let mut result = self
            .db
            .query(
                "SELECT *, meta::id(id) AS record_id FROM reading \
                 WHERE counter_id = $counter_id \
                 ORDER BY year DESC, month DESC LIMIT 1",
            )
            .bind(("counter_id", counter_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReadingRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(match rows.into_iter().next() {
            Some(row) => Some(row.try_into_reading()?),
            None => None,
        })
    }

    async fn list_for_counter(
        &self,
        counter_id: Uuid,
        range: MonthRange,
        pagination: Pagination,
    ) -> DomusResult<Vec<Reading>> {
        // Month bounds go into the query so LIMIT/START paginate the
        // matching rows, not the raw list.
        let mut conditions = vec!["counter_id = $counter_id"];
        if range.from.is_some() {
            conditions
                .push("(year > $from_year OR (year = $from_year AND month >= $from_month))");
        }
        if range.to.is_some() {
            conditions.push("(year < $to_year OR (year = $to_year AND month <= $to_month))");
        }

        let query = format!(
            "SELECT *, meta::id(id) AS record_id FROM reading \
             WHERE {} \
             ORDER BY year DESC, month DESC LIMIT $limit START $offset",
            conditions.join(" AND ")
        );

        let mut request = self
            .db
            .query(query)
            .bind(("counter_id", counter_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some((year, month)) = range.from {
            request = request.bind(("from_year", year)).bind(("from_month", month));
        }
        if let Some((year, month)) = range.to {
            request = request.bind(("to_year", year)).bind(("to_month", month));
        }

        let mut result = request.await.map_err(DbError::from)?;

        let rows: Vec<ReadingRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(ReadingRowWithId::try_into_reading)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn list_for_month(
        &self,
        counter_ids: &[Uuid],
        year: i32,
        month: u32,
    ) -> DomusResult<Vec<Reading>> {
        let ids: Vec<String> = counter_ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT *, meta::id(id) AS record_id FROM reading \
                 WHERE counter_id IN $counter_ids AND year = $year AND month = $month",
            )
            .bind(("counter_ids", ids))
            .bind(("year", year))
            .bind(("month", month))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReadingRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(ReadingRowWithId::try_into_reading)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
