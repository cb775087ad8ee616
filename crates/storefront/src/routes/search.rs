//! Catalog search handler.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use tracing::instrument;

use atelier_core::Artwork;

use super::bad_request;
use crate::error::Result;
use crate::models::SearchParams;
use crate::models::catalog::clamp_limit;
use crate::state::AppState;

/// `GET /api/search?q=&limit=`
///
/// An empty query returns no results without touching the store.
#[instrument(skip(state, params))]
pub async fn search(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Artwork>>> {
    let Query(params) = params.map_err(bad_request)?;
    let term = params.q.trim();

    if term.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let results = state
        .catalog()
        .search(term, clamp_limit(params.limit))
        .await?;
    tracing::debug!(term, hits = results.len(), "Catalog search");

    Ok(Json(results))
}
