//! Domus Server — application entry point.
//!
//! Connects to SurrealDB, applies migrations and keeps a background
//! task that prunes expired sessions until the process is stopped.

use std::time::Duration;

use domus_auth::{AuthConfig, AuthService};
use domus_core::clock::SystemClock;
use domus_db::repository::{SurrealSessionRepository, SurrealUserRepository};
use domus_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

const SESSION_CLEANUP_INTERVAL_SECS: u64 = 3600;

fn auth_config_from_env() -> AuthConfig {
    let mut config = AuthConfig::default();
    if let Ok(secs) = std::env::var("DOMUS_SESSION_LIFETIME_SECS")
        && let Ok(secs) = secs.parse()
    {
        config.session_lifetime_secs = secs;
    }
    config.pepper = std::env::var("DOMUS_PASSWORD_PEPPER").ok();
    config
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("domus=info".parse().unwrap()))
        .json()
        .init();

    tracing::info!("Starting Domus server...");

    let manager = match DbManager::connect(&DbConfig::from_env()).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = domus_db::run_migrations(manager.client()).await {
        tracing::error!(error = %e, "migration failed");
        std::process::exit(1);
    }

    let auth = AuthService::new(
        SurrealUserRepository::new(manager.client().clone()),
        SurrealSessionRepository::new(manager.client().clone()),
        SystemClock,
        auth_config_from_env(),
    );

    let cleanup = tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(SESSION_CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match auth.cleanup_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "pruned expired sessions"),
                Err(e) => tracing::warn!(error = %e, "session cleanup failed"),
            }
        }
    });

    tracing::info!("Domus server ready");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    cleanup.abort();

    tracing::info!("Domus server stopped.");
}
