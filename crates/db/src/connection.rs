//! SQLite pool construction. Every connection gets the same pragma set:
//! foreign keys on (the cascade deletes rely on it), WAL for concurrent
//! readers, and a busy timeout derived from the configured acquire timeout
//! so a locked database degrades into waiting instead of failing.

use std::time::Duration;

use puente_core::config::DatabaseConfig;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::debug;

pub type DbPool = sqlx::SqlitePool;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Cap the per-statement busy wait well below the pool acquire timeout.
const MAX_BUSY_TIMEOUT_MS: u64 = 5_000;

pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(database_url, DEFAULT_MAX_CONNECTIONS, DEFAULT_TIMEOUT_SECS).await
}

/// Pool sized and timed from the `database` config section.
pub async fn connect_from_config(database: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&database.url, database.max_connections, database.timeout_secs).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let max_connections = max_connections.max(1);
    let timeout_secs = timeout_secs.max(1);
    let busy_timeout_ms = timeout_secs.saturating_mul(1000).min(MAX_BUSY_TIMEOUT_MS);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(timeout_secs))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query(&format!("PRAGMA busy_timeout = {busy_timeout_ms}"))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await?;

    debug!(
        event_name = "db_pool_connected",
        max_connections,
        acquire_timeout_secs = timeout_secs,
        busy_timeout_ms,
        "database pool ready"
    );
    Ok(pool)
}
