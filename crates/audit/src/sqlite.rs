//! SQLite audit store.
//!
//! One table, `logs`, with five TEXT columns:
//! `username, tool, input, output, timestamp`.
//! Rows are never updated or deleted, so `rowid` order is insertion order.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use penwright_core::audit::{AuditLogStore, InteractionRecord};
use penwright_core::error::AuditError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

/// A file-backed audit store. Survives process restarts.
pub struct SqliteAuditStore {
    pool: SqlitePool,
}

impl SqliteAuditStore {
    /// Open (or create) the database at `path` and make sure `logs` exists.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| AuditError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self::from_pool(pool).await?;
        info!("SQLite audit log initialized at {}", path.display());
        Ok(store)
    }

    /// Wrap an existing pool.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, AuditError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), AuditError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS logs (
                username  TEXT,
                tool      TEXT,
                input     TEXT,
                output    TEXT,
                timestamp TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AuditError::MigrationFailed(format!("logs table: {e}")))?;

        debug!("SQLite audit migrations complete");
        Ok(())
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<InteractionRecord, AuditError> {
        let text = |column: &str| -> Result<String, AuditError> {
            row.try_get::<Option<String>, _>(column)
                .map(Option::unwrap_or_default)
                .map_err(|e| AuditError::QueryFailed(format!("{column} column: {e}")))
        };

        let raw_timestamp = text("timestamp")?;
        let timestamp = parse_timestamp(&raw_timestamp).ok_or_else(|| {
            AuditError::QueryFailed(format!("timestamp column: unreadable value {raw_timestamp:?}"))
        })?;

        Ok(InteractionRecord {
            username: text("username")?,
            tool: text("tool")?,
            input: text("input")?,
            output: text("output")?,
            timestamp,
        })
    }
}

/// RFC 3339 first; older rows carry a naive ISO-8601 local stamp, read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[async_trait]
impl AuditLogStore for SqliteAuditStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, record: &InteractionRecord) -> Result<(), AuditError> {
        sqlx::query(
            "INSERT INTO logs (username, tool, input, output, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&record.username)
        .bind(&record.tool)
        .bind(&record.input)
        .bind(&record.output)
        .bind(record.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AuditError::Storage(format!("Insert failed: {e}")))?;

        debug!(user = %record.username, tool = %record.tool, "Appended audit record");
        Ok(())
    }

    async fn query(&self, username: Option<&str>) -> Result<Vec<InteractionRecord>, AuditError> {
        let rows = match username {
            Some(user) => {
                sqlx::query(
                    "SELECT username, tool, input, output, timestamp FROM logs WHERE username = ?1 ORDER BY rowid",
                )
                .bind(user)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT username, tool, input, output, timestamp FROM logs ORDER BY rowid",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AuditError::QueryFailed(e.to_string()))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn count(&self) -> Result<usize, AuditError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM logs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuditError::QueryFailed(e.to_string()))?;
        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| AuditError::QueryFailed(e.to_string()))?;
        Ok(count as usize)
    }
}
