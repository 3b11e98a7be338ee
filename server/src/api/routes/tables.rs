//! Region table endpoints: listing, filter options, search

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::extractors::ApiJson;
use crate::api::types::ApiError;
use crate::data::schema::{Column, TableName};
use crate::domain::{Listing, SearchOutcome, SearchRequest, SearchService};

#[derive(Clone)]
pub struct TablesApiState {
    pub search: Arc<SearchService>,
}

pub fn routes(search: Arc<SearchService>) -> Router<()> {
    let state = TablesApiState { search };

    Router::new()
        .route("/", get(list_tables))
        .route("/{table}/options/{column}", get(list_options))
        .route("/{table}/search", post(search_table))
        .with_state(state)
}

pub fn catalog_routes(search: Arc<SearchService>) -> Router<()> {
    let state = TablesApiState { search };

    Router::new()
        .route("/refresh", post(refresh_catalog))
        .with_state(state)
}

async fn resolve(state: &TablesApiState, name: &str) -> Result<TableName, ApiError> {
    state
        .search
        .resolve_table(name)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::not_found("TABLE_NOT_FOUND", format!("Unknown table: {}", name)))
}

/// List region tables
///
/// Store failures are reported in `warning` with an empty list.
pub async fn list_tables(State(state): State<TablesApiState>) -> Json<Listing<TableName>> {
    Json(state.search.tables().await)
}

/// Distinct values of one filter column
pub async fn list_options(
    State(state): State<TablesApiState>,
    Path((table, column)): Path<(String, String)>,
) -> Result<Json<Listing<String>>, ApiError> {
    let column: Column = column
        .parse()
        .map_err(|e: String| ApiError::bad_request("INVALID_COLUMN", e))?;
    let table = resolve(&state, &table).await?;

    Ok(Json(state.search.options(&table, column).await))
}

/// Run a filtered search against one table
pub async fn search_table(
    State(state): State<TablesApiState>,
    Path(table): Path<String>,
    ApiJson(request): ApiJson<SearchRequest>,
) -> Result<Json<SearchOutcome>, ApiError> {
    let table = resolve(&state, &table).await?;
    let criteria = state
        .search
        .criteria(&request)
        .map_err(|e| ApiError::bad_request("UNKNOWN_CATEGORY", e.to_string()))?;

    Ok(Json(state.search.search(&table, &criteria).await))
}

/// Drop memoized table and option lists
pub async fn refresh_catalog(State(state): State<TablesApiState>) -> StatusCode {
    state.search.catalog().invalidate();
    tracing::info!("Catalog cache cleared");
    StatusCode::NO_CONTENT
}
