//! Catalog lookup
//!
//! Enumerates region tables and the distinct values of a column, memoizing
//! both in `moka` caches. Only successful lookups are cached, so a store that
//! was unreachable is asked again on the next call.

use std::collections::BTreeSet;
use std::sync::Arc;

use moka::future::Cache;

use crate::data::error::DataError;
use crate::data::schema::{Column, TableName};
use crate::data::traits::TabularStore;

/// Memoized view of the store's tables and column values
pub struct Catalog {
    store: Arc<dyn TabularStore>,
    tables: Cache<(), Arc<Vec<TableName>>>,
    values: Cache<(TableName, Column), Arc<BTreeSet<String>>>,
}

impl Catalog {
    pub fn new(store: Arc<dyn TabularStore>, max_entries: u64) -> Self {
        Self {
            store,
            tables: Cache::new(1),
            values: Cache::builder()
                .max_capacity(max_entries)
                .initial_capacity((max_entries as usize / 4).min(1_000))
                .build(),
        }
    }

    pub fn store(&self) -> &Arc<dyn TabularStore> {
        &self.store
    }

    /// Region tables, sorted by name
    pub async fn list_tables(&self) -> Result<Arc<Vec<TableName>>, DataError> {
        if let Some(tables) = self.tables.get(&()).await {
            tracing::trace!("Table list cache hit");
            return Ok(tables);
        }

        let mut tables = self.store.list_tables().await?;
        tables.sort();
        tables.dedup();
        let tables = Arc::new(tables);
        self.tables.insert((), tables.clone()).await;
        tracing::debug!(count = tables.len(), "Cached table list");
        Ok(tables)
    }

    /// Distinct non-blank values of `column` in `table`, rendered as text
    pub async fn list_distinct_values(
        &self,
        table: &TableName,
        column: Column,
    ) -> Result<Arc<BTreeSet<String>>, DataError> {
        let key = (table.clone(), column);
        if let Some(values) = self.values.get(&key).await {
            tracing::trace!(%table, %column, "Distinct values cache hit");
            return Ok(values);
        }

        let values: BTreeSet<String> = self
            .store
            .list_distinct_values(table, column)
            .await?
            .iter()
            .filter_map(|cell| cell.as_option_text())
            .collect();
        let values = Arc::new(values);
        self.values.insert(key, values.clone()).await;
        tracing::debug!(%table, %column, count = values.len(), "Cached distinct values");
        Ok(values)
    }

    /// Look a user-supplied name up among the enumerated tables
    pub async fn resolve_table(&self, name: &str) -> Result<Option<TableName>, DataError> {
        let tables = self.list_tables().await?;
        Ok(tables.iter().find(|t| t.as_str() == name).cloned())
    }

    /// Drop every memoized lookup
    pub fn invalidate(&self) {
        self.tables.invalidate_all();
        self.values.invalidate_all();
        tracing::debug!("Catalog cache invalidated");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::data::sqlite::fixtures::fixture_store;
    use crate::data::types::{CellValue, ResultSet, SqlValue};

    /// Store wrapper that counts calls and can be switched offline
    pub(crate) struct FlakyStore<S> {
        pub inner: S,
        pub calls: AtomicUsize,
        pub offline: AtomicBool,
    }

    impl<S> FlakyStore<S> {
        pub fn new(inner: S) -> Self {
            Self {
                inner,
                calls: AtomicUsize::new(0),
                offline: AtomicBool::new(false),
            }
        }

        fn check(&self) -> Result<(), DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(DataError::unavailable("flaky", "switched off"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl<S: TabularStore> TabularStore for FlakyStore<S> {
        async fn list_tables(&self) -> Result<Vec<TableName>, DataError> {
            self.check()?;
            self.inner.list_tables().await
        }

        async fn list_distinct_values(
            &self,
            table: &TableName,
            column: Column,
        ) -> Result<Vec<CellValue>, DataError> {
            self.check()?;
            self.inner.list_distinct_values(table, column).await
        }

        async fn fetch_rows(
            &self,
            sql: &str,
            params: &[SqlValue],
        ) -> Result<ResultSet, DataError> {
            self.check()?;
            self.inner.fetch_rows(sql, params).await
        }
    }

    async fn flaky_catalog() -> (Arc<FlakyStore<crate::data::SqliteStore>>, Catalog) {
        let store = Arc::new(FlakyStore::new(fixture_store().await));
        let catalog = Catalog::new(store.clone(), 100);
        (store, catalog)
    }

    #[tokio::test]
    async fn test_list_tables_is_memoized() {
        let (store, catalog) = flaky_catalog().await;

        let first = catalog.list_tables().await.unwrap();
        let second = catalog.list_tables().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_values_drop_null_and_blank() {
        let (_, catalog) = flaky_catalog().await;
        let table = catalog.resolve_table("Kerala").await.unwrap().unwrap();

        let routes = catalog
            .list_distinct_values(&table, Column::RouteName)
            .await
            .unwrap();
        let routes: Vec<&str> = routes.iter().map(String::as_str).collect();
        assert_eq!(
            routes,
            vec!["Kochi-Bangalore", "Kozhikode-Kochi", "Trivandrum-Kochi"]
        );
    }

    #[tokio::test]
    async fn test_distinct_values_render_numbers_as_text() {
        let (_, catalog) = flaky_catalog().await;
        let table = catalog.resolve_table("Karnataka").await.unwrap().unwrap();

        let seats = catalog
            .list_distinct_values(&table, Column::SeatAvailability)
            .await
            .unwrap();
        assert!(seats.contains("12"));
        assert!(seats.contains("30"));
    }

    #[tokio::test]
    async fn test_distinct_values_memoized_per_column() {
        let (store, catalog) = flaky_catalog().await;
        let table = catalog.resolve_table("Kerala").await.unwrap().unwrap();
        let after_resolve = store.calls.load(Ordering::SeqCst);

        catalog
            .list_distinct_values(&table, Column::BusType)
            .await
            .unwrap();
        catalog
            .list_distinct_values(&table, Column::BusType)
            .await
            .unwrap();
        catalog
            .list_distinct_values(&table, Column::RouteName)
            .await
            .unwrap();

        assert_eq!(store.calls.load(Ordering::SeqCst), after_resolve + 2);
    }

    #[tokio::test]
    async fn test_resolve_unknown_table() {
        let (_, catalog) = flaky_catalog().await;
        assert_eq!(catalog.resolve_table("Goa").await.unwrap(), None);
        // Matching is exact
        assert_eq!(catalog.resolve_table("kerala").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let (store, catalog) = flaky_catalog().await;

        store.offline.store(true, Ordering::SeqCst);
        let err = catalog.list_tables().await.unwrap_err();
        assert!(err.is_unavailable());

        store.offline.store(false, Ordering::SeqCst);
        assert_eq!(catalog.list_tables().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let (store, catalog) = flaky_catalog().await;

        catalog.list_tables().await.unwrap();
        catalog.invalidate();
        catalog.list_tables().await.unwrap();

        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }
}
