//! SQLite tabular store
//!
//! Opens the schedule database read-only through a small `sqlx` pool. The pool
//! connects lazily, so an unreachable database file does not stop the process
//! from starting: each call reports `DataError::Unavailable` instead.
//!
//! Every call acquires its own pooled connection for the duration of the call
//! and is bounded by the configured query timeout.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as _, Row, SqlitePool, TypeInfo, ValueRef};
use tracing::log::LevelFilter;

use crate::core::config::DatabaseConfig;
use crate::core::constants::SQLITE_BUSY_TIMEOUT_SECS;
use crate::data::error::DataError;
use crate::data::schema::{Column, TableName};
use crate::data::traits::TabularStore;
use crate::data::types::{CellValue, ResultSet, SqlValue, TIME_FORMAT};

const BACKEND: &str = "sqlite";

/// Lists user tables and views, skipping SQLite's internal tables
const LIST_TABLES_SQL: &str = r"SELECT name FROM sqlite_master
    WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
    ORDER BY name";

/// SQLite-backed tabular store
pub struct SqliteStore {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl SqliteStore {
    /// Create the store from configuration
    ///
    /// No connection is opened here; the first call does that.
    pub fn connect(config: &DatabaseConfig) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .read_only(true)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .log_statements(LevelFilter::Trace);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_lazy_with(options);

        tracing::debug!(path = %config.path.display(), "SqliteStore initialized");
        Self {
            pool,
            query_timeout: Duration::from_secs(config.query_timeout_secs),
        }
    }

    /// Create a store from an existing pool (primarily for testing)
    #[cfg(test)]
    pub fn from_pool(pool: SqlitePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }

    /// Run a store call with the configured timeout
    async fn run_query<T, F>(&self, f: F) -> Result<T, DataError>
    where
        F: Future<Output = Result<T, DataError>>,
    {
        tokio::time::timeout(self.query_timeout, f)
            .await
            .map_err(|_| {
                tracing::warn!(timeout = ?self.query_timeout, "SQLite query timed out");
                DataError::timeout(BACKEND, self.query_timeout)
            })?
    }

    async fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqliteRow>, DataError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DataError::unavailable(BACKEND, e.to_string()))?;

        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                SqlValue::Text(s) => query.bind(s.clone()),
                SqlValue::Integer(i) => query.bind(*i),
                SqlValue::Real(r) => query.bind(*r),
                SqlValue::Time(t) => query.bind(t.format(TIME_FORMAT).to_string()),
            };
        }

        query
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| DataError::from_sqlx(BACKEND, e))
    }
}

#[async_trait]
impl TabularStore for SqliteStore {
    async fn list_tables(&self) -> Result<Vec<TableName>, DataError> {
        self.run_query(async {
            let rows = self.fetch_all(LIST_TABLES_SQL, &[]).await?;
            let tables = rows
                .iter()
                .map(|row| row.try_get::<String, _>(0).map(TableName::from_catalog))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| DataError::from_sqlx(BACKEND, e))?;
            tracing::debug!(count = tables.len(), "Listed tables");
            Ok(tables)
        })
        .await
    }

    async fn list_distinct_values(
        &self,
        table: &TableName,
        column: Column,
    ) -> Result<Vec<CellValue>, DataError> {
        let sql = format!(
            "SELECT DISTINCT {} FROM {}",
            column.quoted(),
            table.quoted()
        );
        self.run_query(async {
            let rows = self.fetch_all(&sql, &[]).await?;
            rows.iter()
                .map(|row| decode_cell(row, 0))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| DataError::from_sqlx(BACKEND, e))
        })
        .await
    }

    async fn fetch_rows(&self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, DataError> {
        self.run_query(async {
            let rows = self.fetch_all(sql, params).await?;
            decode_rows(&rows).map_err(|e| DataError::from_sqlx(BACKEND, e))
        })
        .await
    }
}

/// Decode rows into a column-positional result set
fn decode_rows(rows: &[SqliteRow]) -> Result<ResultSet, sqlx::Error> {
    let columns = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect()
        })
        .unwrap_or_default();

    let rows = rows
        .iter()
        .map(|row| {
            (0..row.len())
                .map(|idx| decode_cell(row, idx))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResultSet { columns, rows })
}

/// Decode one cell by its runtime storage class
fn decode_cell(row: &SqliteRow, idx: usize) -> Result<CellValue, sqlx::Error> {
    let type_name = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(CellValue::Null);
        }
        raw.type_info().name().to_string()
    };

    match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(idx).map(CellValue::Integer),
        "REAL" | "NUMERIC" => row.try_get::<f64, _>(idx).map(CellValue::Real),
        "BLOB" => row.try_get::<Vec<u8>, _>(idx).map(CellValue::Blob),
        _ => row.try_get::<String, _>(idx).map(CellValue::Text),
    }
}
