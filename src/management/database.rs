use std::path::Path;

use serde_json::{Map, Number, Value};
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{types::TrackFeatureRecord, utils};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cannot prepare database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid table name '{0}'")]
    InvalidTableName(String),

    #[error("invalid record in table {table}: {reason}")]
    Record { table: String, reason: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Real,
    Text,
}

/// Columns of a track feature table, in storage order.
const COLUMNS: &[(&str, ColumnKind)] = &[
    ("danceability", ColumnKind::Real),
    ("energy", ColumnKind::Real),
    ("key", ColumnKind::Real),
    ("loudness", ColumnKind::Real),
    ("mode", ColumnKind::Real),
    ("speechiness", ColumnKind::Real),
    ("acousticness", ColumnKind::Real),
    ("instrumentalness", ColumnKind::Real),
    ("liveness", ColumnKind::Real),
    ("valence", ColumnKind::Real),
    ("tempo", ColumnKind::Real),
    ("type", ColumnKind::Text),
    ("id", ColumnKind::Text),
    ("uri", ColumnKind::Text),
    ("track_href", ColumnKind::Text),
    ("analysis_url", ColumnKind::Text),
    ("duration_ms", ColumnKind::Real),
    ("time_signature", ColumnKind::Real),
];

/// SQLite store for fetched track feature tables.
///
/// Each table holds one named collection (a playlist, the liked tracks,
/// the saved albums). Table names are sanitized before they reach SQL.
#[derive(Clone)]
pub struct TrackStore {
    pool: SqlitePool,
}

impl TrackStore {
    /// Opens (and creates when missing) the database file at `path`,
    /// creating its parent directories first.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Io`] when the parent directory cannot be created
    /// - [`StoreError::Database`] when SQLite cannot open the file
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        debug!(path = %path.display(), "track store opened");
        Ok(TrackStore { pool })
    }

    /// Private in-memory database, gone once the store is dropped.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(TrackStore { pool })
    }

    /// Names of all track tables, sorted.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(StoreError::from))
            .collect()
    }

    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let table = checked_name(table)?;
        let count: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(&table)
        .fetch_one(&self.pool)
        .await?;
        Ok(count == 1)
    }

    /// Creates `table` unless it already exists.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidTableName`] when `table` is empty or is not
    /// already a sanitized name (see [`utils::table_name`]).
    pub async fn create_table(&self, table: &str) -> Result<()> {
        let table = checked_name(table)?;
        let columns = COLUMNS
            .iter()
            .map(|(name, kind)| match kind {
                ColumnKind::Real => format!("\"{name}\" REAL"),
                ColumnKind::Text => format!("\"{name}\" TEXT"),
            })
            .collect::<Vec<_>>()
            .join(", ");

        sqlx::query(&format!("CREATE TABLE IF NOT EXISTS \"{table}\" ({columns})"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Appends `records` to `table` in one transaction, creating the table
    /// on first use. Returns the number of rows written.
    pub async fn write_records(&self, table: &str, records: &[TrackFeatureRecord]) -> Result<usize> {
        let table = checked_name(table)?;
        self.create_table(&table).await?;

        let names = COLUMNS
            .iter()
            .map(|(name, _)| format!("\"{name}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; COLUMNS.len()].join(", ");
        let sql = format!("INSERT INTO \"{table}\" ({names}) VALUES ({placeholders})");

        let mut tx = self.pool.begin().await?;
        for record in records {
            let mut query = sqlx::query(&sql);
            for (name, kind) in COLUMNS {
                let value = record.get(name);
                query = match kind {
                    ColumnKind::Real => query.bind(value.and_then(real_value)),
                    ColumnKind::Text => query.bind(value.and_then(text_value)),
                };
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!(table = %table, rows = records.len(), "records written");
        Ok(records.len())
    }

    /// Every record of `table`, in insertion order.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidTableName`] for an unsanitized name
    /// - [`StoreError::Database`] when the table does not exist
    /// - [`StoreError::Record`] when a stored row cannot be decoded
    pub async fn read_records(&self, table: &str) -> Result<Vec<TrackFeatureRecord>> {
        let table = checked_name(table)?;
        let rows = sqlx::query(&format!("SELECT * FROM \"{table}\""))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                row_to_record(row).map_err(|reason| StoreError::Record {
                    table: table.clone(),
                    reason,
                })
            })
            .collect()
    }

    pub async fn clear_table(&self, table: &str) -> Result<()> {
        let table = checked_name(table)?;
        self.create_table(&table).await?;
        sqlx::query(&format!("DELETE FROM \"{table}\""))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Replaces the content of `table` with `records`.
    pub async fn replace_records(&self, table: &str, records: &[TrackFeatureRecord]) -> Result<usize> {
        self.clear_table(table).await?;
        self.write_records(table, records).await
    }

    /// Returns whether a table was dropped.
    pub async fn drop_table(&self, table: &str) -> Result<bool> {
        if !self.table_exists(table).await? {
            return Ok(false);
        }
        let table = checked_name(table)?;
        sqlx::query(&format!("DROP TABLE \"{table}\""))
            .execute(&self.pool)
            .await?;
        Ok(true)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn checked_name(table: &str) -> Result<String> {
    let sanitized = utils::table_name(table);
    if sanitized.is_empty() || sanitized != table {
        return Err(StoreError::InvalidTableName(table.to_string()));
    }
    Ok(sanitized)
}

fn real_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn row_to_record(row: &SqliteRow) -> std::result::Result<TrackFeatureRecord, String> {
    let mut fields = Map::new();
    for (name, kind) in COLUMNS {
        let value = match kind {
            ColumnKind::Real => row
                .try_get::<Option<f64>, _>(*name)
                .map_err(|e| e.to_string())?
                .and_then(Number::from_f64)
                .map(Value::Number),
            ColumnKind::Text => row
                .try_get::<Option<String>, _>(*name)
                .map_err(|e| e.to_string())?
                .map(Value::String),
        };
        fields.insert(name.to_string(), value.unwrap_or(Value::Null));
    }
    TrackFeatureRecord::try_from(fields)
}
