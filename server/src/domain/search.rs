//! Search service
//!
//! Wires category expansion, the filter builder, and the catalog together.
//! Store failures never escape from here: every lookup resolves to a value,
//! with an empty body and a `warning` when the store could not answer.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use super::categories::{CategoryError, CategoryMap};
use super::filters::{FilterCriteria, RangeFilter, build_filter_query};
use crate::data::error::DataError;
use crate::data::schema::{Column, TableName};
use crate::data::types::CellValue;

pub const NO_TABLES_NOTICE: &str = "No tables found in the database.";
pub const NO_ROWS_NOTICE: &str = "No data found with the selected filters.";

/// User-facing search input, before category expansion
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Category labels; each expands to several raw bus types
    pub categories: Vec<String>,
    pub routes: Vec<String>,
    pub departure_time: Option<RangeFilter<NaiveTime>>,
    pub price: Option<RangeFilter<f64>>,
    pub star_rating: Option<RangeFilter<f64>>,
    pub seat_availability: Option<RangeFilter<i64>>,
}

/// A list lookup that may have failed
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T> Listing<T> {
    fn ok(items: Vec<T>) -> Self {
        Self {
            items,
            warning: None,
        }
    }

    fn failed(warning: String) -> Self {
        Self {
            items: Vec::new(),
            warning: Some(warning),
        }
    }
}

/// Rows matching one search, deduplicated in first-seen order
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub table: TableName,
    pub count: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub struct SearchService {
    catalog: Arc<Catalog>,
    categories: Arc<CategoryMap>,
}

impl SearchService {
    pub fn new(catalog: Arc<Catalog>, categories: Arc<CategoryMap>) -> Self {
        Self {
            catalog,
            categories,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    /// Region tables, or an empty list with a warning
    pub async fn tables(&self) -> Listing<TableName> {
        match self.catalog.list_tables().await {
            Ok(tables) => Listing::ok(tables.to_vec()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to list tables");
                Listing::failed(format!("Database connection failed: {}", e))
            }
        }
    }

    /// Distinct values of a filter column, or an empty list with a warning
    pub async fn options(&self, table: &TableName, column: Column) -> Listing<String> {
        match self.catalog.list_distinct_values(table, column).await {
            Ok(values) => Listing::ok(values.iter().cloned().collect()),
            Err(e) => {
                tracing::error!(%table, %column, error = %e, "Failed to list options");
                Listing::failed(format!("Error fetching options for {}: {}", column, e))
            }
        }
    }

    /// Look up a table by name
    pub async fn resolve_table(&self, name: &str) -> Result<Option<TableName>, DataError> {
        self.catalog.resolve_table(name).await
    }

    /// Turn a request into criteria, expanding category labels
    ///
    /// Unknown labels are rejected here so expansion only sees known ones.
    /// Route names are kept verbatim: they must equal the stored values.
    pub fn criteria(&self, request: &SearchRequest) -> Result<FilterCriteria, CategoryError> {
        self.categories.validate_labels(&request.categories)?;
        let route_names: BTreeSet<String> = request
            .routes
            .iter()
            .filter(|r| !r.trim().is_empty())
            .cloned()
            .collect();

        Ok(FilterCriteria {
            bus_types: self.categories.expand(&request.categories),
            route_names,
            departure_time: request.departure_time,
            price: request.price,
            star_rating: request.star_rating,
            seat_availability: request.seat_availability,
        })
    }

    /// Run a filtered search against one table
    pub async fn search(&self, table: &TableName, criteria: &FilterCriteria) -> SearchOutcome {
        let inverted = criteria.inverted_ranges();
        if !inverted.is_empty() {
            tracing::warn!(%table, ranges = ?inverted, "Range minimum exceeds maximum; no rows can match");
        }

        let query = build_filter_query(table, criteria);
        match self
            .catalog
            .store()
            .fetch_rows(&query.sql(), query.params())
            .await
        {
            Ok(result) => {
                let fetched = result.len();
                let result = result.deduplicate();
                tracing::debug!(
                    %table,
                    fetched,
                    count = result.len(),
                    "Search completed"
                );
                SearchOutcome {
                    table: table.clone(),
                    count: result.len(),
                    columns: result.columns,
                    rows: result.rows,
                    warning: None,
                }
            }
            Err(e) => {
                tracing::error!(%table, backend = e.backend(), error = %e, "Search query failed");
                let warning = if e.is_unavailable() {
                    format!("Database connection failed: {}", e)
                } else {
                    format!("Error executing query: {}", e)
                };
                SearchOutcome {
                    table: table.clone(),
                    count: 0,
                    columns: Vec::new(),
                    rows: Vec::new(),
                    warning: Some(warning),
                }
            }
        }
    }
}
