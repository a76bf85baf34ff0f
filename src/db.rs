pub mod transaction;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use metrics::{counter, gauge, histogram};
use migrations::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};

pub use transaction::run_in_transaction;

/// Shared handle to the shop floor database.
pub type DbPool = DatabaseConnection;

/// Pool sizing and timeouts.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Opens a pool with default sizing. `sqlite::memory:` callers should size
/// the pool to one connection themselves, since each connection gets its own
/// database.
pub async fn establish_connection(database_url: &str) -> Result<DbPool, ServiceError> {
    establish_connection_with_config(&DbConfig {
        url: database_url.to_string(),
        ..Default::default()
    })
    .await
}

/// # Errors
/// `DatabaseError` when the pool cannot reach the database.
#[instrument(skip(config), fields(max_connections = config.max_connections))]
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    gauge!("shopfloor_db.max_connections", f64::from(config.max_connections));

    match Database::connect(options).await {
        Ok(pool) => {
            info!("Shop floor database pool ready");
            Ok(pool)
        }
        Err(e) => {
            counter!("shopfloor_db.connection_failures", 1);
            error!(error = %e, "Could not open shop floor database");
            Err(ServiceError::db_error(e))
        }
    }
}

pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    establish_connection_with_config(&DbConfig::from(cfg)).await
}

/// Applies every pending migration from the `migrations` crate.
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    let started = Instant::now();
    Migrator::up(pool, None).await.map_err(|e| {
        error!(error = %e, elapsed = ?started.elapsed(), "Schema migration failed");
        ServiceError::MigrationError(e.to_string())
    })?;
    info!(elapsed = ?started.elapsed(), "Schema is up to date");
    Ok(())
}

/// Round trip to the database, recorded as latency.
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    let started = Instant::now();
    if let Err(e) = pool.ping().await {
        counter!("shopfloor_db.connection_failures", 1);
        error!(error = %e, "Database ping failed");
        return Err(ServiceError::db_error(e));
    }
    histogram!("shopfloor_db.connection_latency", started.elapsed());
    debug!(elapsed = ?started.elapsed(), "Database ping ok");
    Ok(())
}

pub async fn close_pool(pool: DbPool) -> Result<(), ServiceError> {
    info!("Closing database pool");
    pool.close().await.map_err(ServiceError::db_error)
}
