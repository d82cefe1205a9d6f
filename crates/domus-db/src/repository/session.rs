//! SurrealDB implementation of [`SessionRepository`].
//!
//! Sessions are looked up by token digest only. Expiry is enforced by
//! the auth layer; this repository just stores the timestamps.

use chrono::{DateTime, Utc};
use domus_core::error::DomusResult;
use domus_core::models::session::{CreateSession, Session};
use domus_core::repository::SessionRepository;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{CountRow, from_datetime, parse_uuid, to_datetime};

#[derive(Debug, Serialize, Deserialize)]
struct SessionRow {
    user_id: String,
    token_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<Datetime>,
    expires_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct SessionRowWithId {
    record_id: String,
    user_id: String,
    token_hash: String,
    ip: Option<String>,
    device_info: Option<String>,
    created_at: Datetime,
    updated_at: Datetime,
    expires_at: Datetime,
}

impl SessionRow {
    fn into_session(self, id: Uuid) -> Result<Session, DbError> {
        let missing = || DbError::Corrupt("session row missing timestamps".into());
        Ok(Session {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            token_hash: self.token_hash,
            ip: self.ip,
            device_info: self.device_info,
            created_at: from_datetime(self.created_at.ok_or_else(missing)?),
            updated_at: from_datetime(self.updated_at.ok_or_else(missing)?),
            expires_at: from_datetime(self.expires_at),
        })
    }
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = parse_uuid(&self.record_id, "session")?;
        Ok(Session {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            token_hash: self.token_hash,
            ip: self.ip,
            device_info: self.device_info,
            created_at: from_datetime(self.created_at),
            updated_at: from_datetime(self.updated_at),
            expires_at: from_datetime(self.expires_at),
        })
    }
}

/// SurrealDB implementation of the Session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> DomusResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let data = SessionRow {
            user_id: input.user_id.to_string(),
            token_hash: input.token_hash,
            ip: input.ip,
            device_info: input.device_info,
            created_at: None,
            updated_at: None,
            expires_at: to_datetime(input.expires_at),
        };

        let result = self
            .db
            .query("CREATE type::thing('session', $id) CONTENT $data")
            .bind(("id", id_str.clone()))
            .bind(("data", data))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        Ok(row.into_session(id)?)
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> DomusResult<Session> {
        let mut result = self
            .db
            .query(
                "SELECT *, meta::id(id) AS record_id FROM session \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: "token".into(),
        })?;

        Ok(row.try_into_session()?)
    }

    async fn touch(
        &self,
        id: Uuid,
        updated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> DomusResult<()> {
        self.db
            .query(
                "UPDATE type::thing('session', $id) \
                 SET updated_at = $updated_at, expires_at = $expires_at",
            )
            .bind(("id", id.to_string()))
            .bind(("updated_at", to_datetime(updated_at)))
            .bind(("expires_at", to_datetime(expires_at)))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomusResult<()> {
        self.db
            .query("DELETE type::thing('session', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> DomusResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM session \
                 WHERE user_id = $user_id GROUP ALL; \
                 DELETE session WHERE user_id = $user_id",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let counts: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(counts.first().map(|c| c.total).unwrap_or(0))
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> DomusResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM session \
                 WHERE expires_at < $now GROUP ALL; \
                 DELETE session WHERE expires_at < $now",
            )
            .bind(("now", to_datetime(now)))
            .await
            .map_err(DbError::from)?;

        let counts: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(counts.first().map(|c| c.total).unwrap_or(0))
    }
}
