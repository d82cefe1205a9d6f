//! SurrealDB implementation of [`UserRepository`].
//!
//! Passwords arrive pre-hashed (Argon2id PHC strings) from the auth
//! layer; this repository never sees plaintext.

use domus_core::error::DomusResult;
use domus_core::models::user::{CreateUser, Role, UpdateUser, User};
use domus_core::repository::UserRepository;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{from_datetime, parse_uuid};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Serialize, Deserialize)]
struct UserRow {
    name: String,
    surname: String,
    email: String,
    password_hash: String,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<Datetime>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct UserRowWithId {
    record_id: String,
    name: String,
    surname: String,
    email: String,
    password_hash: String,
    role: Role,
    created_at: Datetime,
    updated_at: Datetime,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        let missing = || DbError::Corrupt("user row missing timestamps".into());
        Ok(User {
            id,
            name: self.name,
            surname: self.surname,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            created_at: from_datetime(self.created_at.ok_or_else(missing)?),
            updated_at: from_datetime(self.updated_at.ok_or_else(missing)?),
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = parse_uuid(&self.record_id, "user")?;
        Ok(User {
            id,
            name: self.name,
            surname: self.surname,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            created_at: from_datetime(self.created_at),
            updated_at: from_datetime(self.updated_at),
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> DomusResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let data = UserRow {
            name: input.name,
            surname: input.surname,
            email: input.email,
            password_hash: input.password_hash,
            role: input.role,
            created_at: None,
            updated_at: None,
        };

        let result = self
            .db
            .query("CREATE type::thing('user', $id) CONTENT $data")
            .bind(("id", id_str.clone()))
            .bind(("data", data))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> DomusResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_email(&self, email: &str) -> DomusResult<User> {
        let mut result = self
            .db
            .query("SELECT *, meta::id(id) AS record_id FROM user WHERE email = $email")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> DomusResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.surname.is_some() {
            sets.push("surname = $surname");
        }
        if input.password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::thing('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(surname) = input.surname {
            builder = builder.bind(("surname", surname));
        }
        if let Some(password_hash) = input.password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }
}
