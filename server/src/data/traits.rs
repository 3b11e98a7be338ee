//! Tabular store trait
//!
//! The store is the only thing that talks to the database. Implementations
//! acquire a connection per call, bound each call by a timeout, and release
//! the connection on every path.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::schema::{Column, TableName};
use crate::data::types::{CellValue, ResultSet, SqlValue};

/// Read-only access to region tables
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Enumerate the region tables, sorted by name
    async fn list_tables(&self) -> Result<Vec<TableName>, DataError>;

    /// Distinct values of one column in one table (nulls included)
    async fn list_distinct_values(
        &self,
        table: &TableName,
        column: Column,
    ) -> Result<Vec<CellValue>, DataError>;

    /// Execute a parameterized select verbatim
    ///
    /// `params` are bound positionally to the `?` placeholders in `sql`.
    async fn fetch_rows(&self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, DataError>;
}
