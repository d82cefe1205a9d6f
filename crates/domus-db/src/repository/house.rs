//! SurrealDB implementation of [`HouseRepository`].

use domus_core::error::DomusResult;
use domus_core::models::house::{CreateHouse, House, HouseFilter, UpdateHouse};
use domus_core::repository::{HouseRepository, Pagination};
use serde::{Deserialize, Serialize};
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, Serialize, Deserialize)]
struct HouseRow {
    address: String,
    info: String,
    start_readings_day: u8,
    end_readings_day: u8,
    managers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HouseRowWithId {
    record_id: String,
    address: String,
    info: String,
    start_readings_day: u8,
    end_readings_day: u8,
    managers: Vec<String>,
}

fn parse_managers(managers: Vec<String>) -> Result<Vec<Uuid>, DbError> {
    managers
        .iter()
        .map(|m| parse_uuid(m, "manager"))
        .collect()
}

impl HouseRow {
    fn into_house(self, id: Uuid) -> Result<House, DbError> {
        Ok(House {
            id,
            address: self.address,
            info: self.info,
            start_readings_day: self.start_readings_day,
            end_readings_day: self.end_readings_day,
            managers: parse_managers(self.managers)?,
        })
    }
}

impl HouseRowWithId {
    fn try_into_house(self) -> Result<House, DbError> {
        let id = parse_uuid(&self.record_id, "house")?;
        Ok(House {
            id,
            address: self.address,
            info: self.info,
            start_readings_day: self.start_readings_day,
            end_readings_day: self.end_readings_day,
            managers: parse_managers(self.managers)?,
        })
    }
}

/// SurrealDB implementation of the House repository.
#[derive(Clone)]
pub struct SurrealHouseRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealHouseRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> HouseRepository for SurrealHouseRepository<C> {
    async fn create(&self, input: CreateHouse) -> DomusResult<House> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let data = HouseRow {
            address: input.address,
            info: input.info,
            start_readings_day: 1,
            end_readings_day: 30,
            managers: Vec::new(),
        };

        let result = self
            .db
            .query("CREATE type::thing('house', $id) CONTENT $data")
            .bind(("id", id_str.clone()))
            .bind(("data", data))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<HouseRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "house".into(),
            id: id_str,
        })?;

        Ok(row.into_house(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> DomusResult<House> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('house', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HouseRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "house".into(),
            id: id_str,
        })?;

        Ok(row.into_house(id)?)
    }

    async fn get_by_address(&self, address: &str) -> DomusResult<House> {
        let mut result = self
            .db
            .query("SELECT *, meta::id(id) AS record_id FROM house WHERE address = $address")
            .bind(("address", address.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HouseRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "house".into(),
            id: format!("address={address}"),
        })?;

        Ok(row.try_into_house()?)
    }

    async fn update(&self, id: Uuid, input: UpdateHouse) -> DomusResult<House> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.info.is_some() {
            sets.push("info = $info");
        }
        if input.start_readings_day.is_some() {
            sets.push("start_readings_day = $start_readings_day");
        }
        if input.end_readings_day.is_some() {
            sets.push("end_readings_day = $end_readings_day");
        }
        if input.managers.is_some() {
            sets.push("managers = $managers");
        }
        if sets.is_empty() {
            // Nothing to change; treat as a plain read.
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::thing('house', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(query).bind(("id", id_str.clone()));
        if let Some(info) = input.info {
            builder = builder.bind(("info", info));
        }
        if let Some(day) = input.start_readings_day {
            builder = builder.bind(("start_readings_day", day));
        }
        if let Some(day) = input.end_readings_day {
            builder = builder.bind(("end_readings_day", day));
        }
        if let Some(managers) = input.managers {
            let managers: Vec<String> = managers.iter().map(Uuid::to_string).collect();
            builder = builder.bind(("managers", managers));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<HouseRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "house".into(),
            id: id_str,
        })?;

        Ok(row.into_house(id)?)
    }

    async fn delete(&self, id: Uuid) -> DomusResult<()> {
        self.db
            .query("DELETE type::thing('house', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list(&self, filter: HouseFilter, pagination: Pagination) -> DomusResult<Vec<House>> {
        let mut conditions = Vec::new();
        if filter.address.is_some() {
            conditions.push("address = $address");
        }
        if filter.manager.is_some() {
            conditions.push("$manager IN managers");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT *, meta::id(id) AS record_id FROM house {where_clause}\
             ORDER BY address ASC LIMIT $limit START $offset"
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(address) = filter.address {
            builder = builder.bind(("address", address));
        }
        if let Some(manager) = filter.manager {
            builder = builder.bind(("manager", manager.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<HouseRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(HouseRowWithId::try_into_house)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
