//! Append-only event store over the two `SQLite` log streams.

use std::sync::Arc;

use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::event::EventLevel;
use crate::models::record::{ClientRecord, ServerRecord};
use crate::{AppError, Result};

/// Append-only store for server status records and per-session client
/// records.
///
/// Batch appends are transactional: either every record of a batch is
/// committed or none is. The pool behind the store holds a single
/// connection, so concurrent batches queue rather than interleave.
#[derive(Clone)]
pub struct EventLog {
    pool: Arc<SqlitePool>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct ClientRow {
    logged_at: String,
    pid: i64,
    name: String,
    level: String,
    payload: Json<serde_json::Value>,
}

impl ClientRow {
    /// Convert a database row into the domain record.
    fn into_record(self) -> Result<ClientRecord> {
        let logged_at = chrono::DateTime::parse_from_rfc3339(&self.logged_at)
            .map_err(|e| AppError::Db(format!("invalid logged_at: {e}")))?
            .with_timezone(&Utc);
        let pid = u32::try_from(self.pid)
            .map_err(|_| AppError::Db(format!("invalid pid: {}", self.pid)))?;
        let level = parse_level(&self.level)?;

        Ok(ClientRecord {
            logged_at,
            pid,
            name: self.name,
            level,
            payload: self.payload.0,
        })
    }
}

/// Internal row struct for the server log stream.
#[derive(sqlx::FromRow)]
struct ServerRow {
    logged_at: String,
    message: String,
}

impl ServerRow {
    fn into_record(self) -> Result<ServerRecord> {
        let logged_at = chrono::DateTime::parse_from_rfc3339(&self.logged_at)
            .map_err(|e| AppError::Db(format!("invalid logged_at: {e}")))?
            .with_timezone(&Utc);

        Ok(ServerRecord {
            logged_at,
            message: self.message,
        })
    }
}

fn parse_level(s: &str) -> Result<EventLevel> {
    match s {
        "connect" => Ok(EventLevel::Connect),
        "hooked" => Ok(EventLevel::Hooked),
        "disconnect" => Ok(EventLevel::Disconnect),
        "message" => Ok(EventLevel::Message),
        "exception" => Ok(EventLevel::Exception),
        other => Err(AppError::Db(format!("invalid level: {other}"))),
    }
}

fn level_str(level: EventLevel) -> &'static str {
    match level {
        EventLevel::Connect => "connect",
        EventLevel::Hooked => "hooked",
        EventLevel::Disconnect => "disconnect",
        EventLevel::Message => "message",
        EventLevel::Exception => "exception",
    }
}

impl EventLog {
    /// Create a new store over the shared pool.
    #[must_use]
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Append one server status record, stamped at commit time.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn append_server(&self, message: &str) -> Result<()> {
        let logged_at = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO server_log (logged_at, message) VALUES (?1, ?2)")
            .bind(&logged_at)
            .bind(message)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    /// Append a batch of client records in one transaction.
    ///
    /// All records commit together or not at all; a failure on any insert
    /// rolls back the whole batch. An empty batch is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if any insert or the commit fails.
    pub async fn append_batch(&self, records: &[ClientRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(
                "INSERT INTO client_log (logged_at, pid, name, level, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(record.logged_at.to_rfc3339())
            .bind(i64::from(record.pid))
            .bind(&record.name)
            .bind(level_str(record.level))
            .bind(Json(&record.payload))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    /// List all server records in append order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails or a row is malformed.
    pub async fn server_records(&self) -> Result<Vec<ServerRecord>> {
        let rows: Vec<ServerRow> =
            sqlx::query_as("SELECT logged_at, message FROM server_log ORDER BY id")
                .fetch_all(self.pool.as_ref())
                .await?;

        rows.into_iter().map(ServerRow::into_record).collect()
    }

    /// List all client records for one pid in append order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails or a row is malformed.
    pub async fn client_records_for(&self, pid: u32) -> Result<Vec<ClientRecord>> {
        let rows: Vec<ClientRow> = sqlx::query_as(
            "SELECT logged_at, pid, name, level, payload FROM client_log
             WHERE pid = ?1 ORDER BY id",
        )
        .bind(i64::from(pid))
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(ClientRow::into_record).collect()
    }
}
