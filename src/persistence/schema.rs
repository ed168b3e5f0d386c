//! `SQLite` schema bootstrap logic.
//!
//! All definitions use `CREATE ... IF NOT EXISTS`, so the bootstrap is
//! safe to re-run on every server startup and converges to one schema.

use sqlx::SqlitePool;

use crate::Result;

/// Apply the two log-stream tables to the connected `SQLite` database.
///
/// Idempotent; safe to call on every startup.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS server_log (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    logged_at       TEXT NOT NULL,
    message         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS client_log (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    logged_at       TEXT NOT NULL,
    pid             INTEGER NOT NULL,
    name            TEXT NOT NULL,
    level           TEXT NOT NULL CHECK(level IN ('connect','hooked','disconnect','message','exception')),
    payload         TEXT NOT NULL CHECK(json_valid(payload))
);

CREATE INDEX IF NOT EXISTS idx_client_log_pid ON client_log(pid);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
