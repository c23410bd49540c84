use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{models::CatalogEntry, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct MovieQuery {
    /// Case-insensitive substring filter on the title
    q: Option<String>,
}

/// Handler for the catalog listing, in catalog order
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MovieQuery>,
) -> Json<Vec<CatalogEntry>> {
    let entries = state.engine.stores().catalog().entries();

    let movies = match params.q.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => {
            let needle = query.to_lowercase();
            entries
                .iter()
                .filter(|entry| entry.title.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        }
        _ => entries.to_vec(),
    };

    Json(movies)
}
