pub mod migrations;
pub mod repository;

pub use repository::{RecordKind, RecordRepository, RepositoryError};

use std::time::Duration;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::ServerConfig;

/// Opens the pool described by the configuration and applies the schema.
pub async fn connect(config: &ServerConfig) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    migrations::run_migrations(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database, schema applied.
///
/// Every SQLite connection to `:memory:` is a separate database, so the pool
/// is pinned to one connection that never expires.
pub async fn open_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect("sqlite::memory:")
        .await?;
    migrations::run_migrations(&pool).await?;
    Ok(pool)
}
