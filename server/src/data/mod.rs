//! Data storage layer
//!
//! Provides read-only access to the region schedule tables:
//! - `sqlite` - SQLite tabular store (pooled, read-only, timeout per call)
//! - `schema` - Column set and runtime table identifiers
//! - `types` - Bound parameter values, decoded cells, result sets
//! - `traits` - `TabularStore` trait implemented by each backend
//! - `error` - Unified error type for store calls

pub mod error;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use schema::{Column, TableName};
pub use sqlite::SqliteStore;
pub use traits::TabularStore;
pub use types::{CellValue, ResultSet, SqlValue};
