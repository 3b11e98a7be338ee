//! Shared data types for store calls
//!
//! `SqlValue` is what goes into a statement as a bound parameter, `CellValue`
//! is what comes back out of a row. Rows are kept column-positional so tables
//! with extra descriptive columns pass through unchanged.

use std::collections::HashSet;

use chrono::NaiveTime;
use serde::Serialize;

/// Time-of-day format used for binding and rendering departure times
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// A bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Time(NaiveTime),
}

/// A single cell decoded from a result row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl CellValue {
    /// Render as an option label; `None` for nulls, blobs and blank text
    ///
    /// Text is returned exactly as stored so a selected option still
    /// matches its own rows when bound back into a query.
    pub fn as_option_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::Blob(_) => None,
            Self::Integer(i) => Some(i.to_string()),
            Self::Real(r) => Some(r.to_string()),
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Text(s) => Some(s.clone()),
        }
    }

    fn key(&self) -> CellKey {
        match self {
            Self::Null => CellKey::Null,
            Self::Integer(i) => CellKey::Integer(*i),
            // -0.0 and 0.0 are the same value for dedup purposes
            Self::Real(r) => CellKey::Real(if *r == 0.0 { 0 } else { r.to_bits() }),
            Self::Text(s) => CellKey::Text(s.clone()),
            Self::Blob(b) => CellKey::Blob(b.clone()),
        }
    }
}

/// Hashable identity of a cell
#[derive(Hash, PartialEq, Eq)]
enum CellKey {
    Null,
    Integer(i64),
    Real(u64),
    Text(String),
    Blob(Vec<u8>),
}

/// Rows returned by a select, with their column names
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Remove duplicate rows, keeping the first occurrence of each
    pub fn deduplicate(self) -> Self {
        let mut seen: HashSet<Vec<CellKey>> = HashSet::with_capacity(self.rows.len());
        let rows = self
            .rows
            .into_iter()
            .filter(|row| seen.insert(row.iter().map(CellValue::key).collect()))
            .collect();
        Self {
            columns: self.columns,
            rows,
        }
    }
}
