//! Bus category endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::domain::SearchService;
use crate::domain::categories::CategoryEntry;

#[derive(Clone)]
pub struct CategoriesApiState {
    pub search: Arc<SearchService>,
}

pub fn routes(search: Arc<SearchService>) -> Router<()> {
    let state = CategoriesApiState { search };

    Router::new()
        .route("/", get(list_categories))
        .with_state(state)
}

/// List category labels with the raw bus types each one expands to
pub async fn list_categories(State(state): State<CategoriesApiState>) -> Json<Vec<CategoryEntry>> {
    Json(state.search.categories().entries().to_vec())
}
