//! SurrealDB implementation of [`ApartmentRepository`].

use domus_core::error::DomusResult;
use domus_core::models::apartment::{Apartment, CreateApartment, UpdateApartment};
use domus_core::repository::ApartmentRepository;
use serde::{Deserialize, Serialize};
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, Serialize, Deserialize)]
struct ApartmentRow {
    house_id: String,
    owner_id: String,
    entrance: String,
    floor: String,
    number: String,
    residents: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApartmentRowWithId {
    record_id: String,
    house_id: String,
    owner_id: String,
    entrance: String,
    floor: String,
    number: String,
    residents: Vec<String>,
}

fn parse_residents(residents: Vec<String>) -> Result<Vec<Uuid>, DbError> {
    residents
        .iter()
        .map(|r| parse_uuid(r, "resident"))
        .collect()
}

impl ApartmentRow {
    fn into_apartment(self, id: Uuid) -> Result<Apartment, DbError> {
        Ok(Apartment {
            id,
            house_id: parse_uuid(&self.house_id, "house")?,
            owner_id: parse_uuid(&self.owner_id, "owner")?,
            entrance: self.entrance,
            floor: self.floor,
            number: self.number,
            residents: parse_residents(self.residents)?,
        })
    }
}

impl ApartmentRowWithId {
    fn try_into_apartment(self) -> Result<Apartment, DbError> {
        let id = parse_uuid(&self.record_id, "apartment")?;
        Ok(Apartment {
            id,
            house_id: parse_uuid(&self.house_id, "house")?,
            owner_id: parse_uuid(&self.owner_id, "owner")?,
            entrance: self.entrance,
            floor: self.floor,
            number: self.number,
            residents: parse_residents(self.residents)?,
        })
    }
}

/// SurrealDB implementation of the Apartment repository.
#[derive(Clone)]
pub struct SurrealApartmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealApartmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ApartmentRepository for SurrealApartmentRepository<C> {
    async fn create(&self, input: CreateApartment) -> DomusResult<Apartment> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // The owner starts as the first resident.
        let data = ApartmentRow {
            house_id: input.house_id.to_string(),
            owner_id: input.owner_id.to_string(),
            entrance: input.entrance,
            floor: input.floor,
            number: input.number,
            residents: vec![input.owner_id.to_string()],
        };

        let result = self
            .db
            .query("CREATE type::thing('apartment', $id) CONTENT $data")
            .bind(("id", id_str.clone()))
            .bind(("data", data))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<ApartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "apartment".into(),
            id: id_str,
        })?;

        Ok(row.into_apartment(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> DomusResult<Apartment> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('apartment', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "apartment".into(),
            id: id_str,
        })?;

        Ok(row.into_apartment(id)?)
    }

    async fn get_by_number(&self, house_id: Uuid, number: &str) -> DomusResult<Apartment> {
        let mut result = self
            .db
            .query(
                "SELECT *, meta::id(id) AS record_id FROM apartment \
                 WHERE house_id = $house_id AND number = $number",
            )
            .bind(("house_id", house_id.to_string()))
            .bind(("number", number.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApartmentRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "apartment".into(),
            id: format!("house={house_id} number={number}"),
        })?;

        Ok(row.try_into_apartment()?)
    }

    async fn update(&self, id: Uuid, input: UpdateApartment) -> DomusResult<Apartment> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.owner_id.is_some() {
            sets.push("owner_id = $owner_id");
        }
        if input.residents.is_some() {
            sets.push("residents = $residents");
        }
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::thing('apartment', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(query).bind(("id", id_str.clone()));
        if let Some(owner_id) = input.owner_id {
            builder = builder.bind(("owner_id", owner_id.to_string()));
        }
        if let Some(residents) = input.residents {
            let residents: Vec<String> = residents.iter().map(Uuid::to_string).collect();
            builder = builder.bind(("residents", residents));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<ApartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "apartment".into(),
            id: id_str,
        })?;

        Ok(row.into_apartment(id)?)
    }

    async fn delete(&self, id: Uuid) -> DomusResult<()> {
        self.db
            .query("DELETE type::thing('apartment', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list_by_house(&self, house_id: Uuid) -> DomusResult<Vec<Apartment>> {
        let mut result = self
            .db
            .query(
                "SELECT *, meta::id(id) AS record_id FROM apartment \
                 WHERE house_id = $house_id ORDER BY number ASC",
            )
            .bind(("house_id", house_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApartmentRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(ApartmentRowWithId::try_into_apartment)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn list_by_resident(&self, user_id: Uuid) -> DomusResult<Vec<Apartment>> {
        let mut result = self
            .db
            .query(
                "SELECT *, meta::id(id) AS record_id FROM apartment \
                 WHERE $user_id IN residents ORDER BY number ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApartmentRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(ApartmentRowWithId::try_into_apartment)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
