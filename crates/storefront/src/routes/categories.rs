//! Category handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use atelier_core::CategoryCount;

use crate::error::Result;
use crate::state::AppState;

/// `GET /api/categories/stats` - artwork count per category.
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<Json<Vec<CategoryCount>>> {
    Ok(Json(state.catalog().category_stats().await?))
}
