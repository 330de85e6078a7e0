//! # rp-db-sqlite Implementation
//!
//! This crate implements the data mapping between the SQLite relational model
//! and the `rp-core` domain models.
//!
//! Both repositories borrow the same `SqlitePool`, handed to them at
//! construction. Every repository method is a single statement; there are no
//! multi-statement transactions.

mod posts;
mod users;

pub use posts::SqlitePostRepo;
pub use users::SqliteUserRepo;

use std::str::FromStr;
use std::time::Duration;

use rp_core::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Sizing and recycling rules for the shared connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(3600)),
        }
    }
}

impl PoolConfig {
    /// One connection that is never recycled. `sqlite::memory:` databases
    /// live and die with their connection.
    pub fn in_memory() -> Self {
        Self {
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            max_lifetime: None,
        }
    }
}

/// Opens the pool and brings the schema up to date.
pub async fn connect(url: &str, config: &PoolConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "SQLite pool ready"
    );
    Ok(pool)
}

/// Applies the embedded migrations under `./migrations`.
pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub(crate) fn db_err(err: sqlx::Error) -> AppError {
    AppError::Internal(err.to_string())
}

/// Zero rows affected means the identifier did not resolve.
pub(crate) fn ensure_affected(rows: u64, entity: &str, id: impl ToString) -> Result<()> {
    if rows == 0 {
        return Err(AppError::not_found(entity, id));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    connect("sqlite::memory:", &PoolConfig::in_memory())
        .await
        .expect("in-memory pool")
}
