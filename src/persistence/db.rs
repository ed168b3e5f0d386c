//! `SQLite` connection bootstrap for the event store.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::{AppError, Result};

use super::schema;

/// Prepared-statement cache capacity of the store connection.
///
/// Statements are cached by query text, so the handful of insert and
/// select shapes the store issues are each compiled once per connection
/// lifetime and reused for every subsequent call.
const STATEMENT_CACHE_CAPACITY: usize = 64;

/// Connect to the on-disk event store and apply schema.
///
/// The pool is capped at a single connection: concurrent batch writers
/// queue on connection acquire instead of interleaving transactions, and
/// every statement runs against the one cached-statement set.
///
/// # Errors
///
/// Returns `AppError::Db` if the database cannot be opened or the schema
/// cannot be applied, and `AppError::Io` if the parent directory cannot
/// be created.
pub async fn connect(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| AppError::Io(format!("failed to create db dir: {err}")))?;
        }
    }
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
    pool_with(options).await
}

/// Connect to a fresh in-memory event store and apply schema.
///
/// # Errors
///
/// Returns `AppError::Db` if the connection or schema application fails.
pub async fn connect_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?
        .statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
    pool_with(options).await
}

async fn pool_with(options: SqliteConnectOptions) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    schema::bootstrap_schema(&pool).await?;
    Ok(pool)
}
