//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// Connection settings for the document store.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket endpoint, host:port.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "domus".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Populate from `DOMUS_DB_*` environment variables, falling back
    /// to the defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env_or("DOMUS_DB_URL", &defaults.url),
            namespace: env_or("DOMUS_DB_NAMESPACE", &defaults.namespace),
            database: env_or("DOMUS_DB_DATABASE", &defaults.database),
            username: env_or("DOMUS_DB_USERNAME", &defaults.username),
            password: env_or("DOMUS_DB_PASSWORD", &defaults.password),
        }
    }
}

/// A ready-to-use handle on the configured namespace and database.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Open the WebSocket connection, authenticate as root and select
    /// the configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(Root {
            username: &config.username,
            password: &config.password,
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "connected to SurrealDB"
        );
        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_falls_back_to_defaults() {
        // None of the DOMUS_DB_* variables are set in the test
        // environment.
        let config = DbConfig::from_env();
        let defaults = DbConfig::default();
        assert_eq!(config.url, defaults.url);
        assert_eq!(config.namespace, defaults.namespace);
        assert_eq!(config.database, defaults.database);
    }
}
