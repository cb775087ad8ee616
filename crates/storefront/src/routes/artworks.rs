//! Artwork catalog handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::PathRejection, rejection::QueryRejection},
};
use tracing::instrument;

use atelier_core::{Artwork, ArtworkDetail, ArtworkId};

use super::bad_request;
use crate::error::{AppError, Result};
use crate::models::{ArtworkQuery, ArtworksParams};
use crate::state::AppState;

/// How many related artworks the detail page shows.
pub const RELATED_LIMIT: i64 = 4;

/// `GET /api/artworks` - filtered, sorted, paged listing.
#[instrument(skip(state, params))]
pub async fn index(
    State(state): State<AppState>,
    params: std::result::Result<Query<ArtworksParams>, QueryRejection>,
) -> Result<Json<Vec<Artwork>>> {
    let Query(params) = params.map_err(bad_request)?;
    let query = ArtworkQuery::try_from(params).map_err(bad_request)?;

    let artworks = state.catalog().list_artworks(&query).await?;
    Ok(Json(artworks))
}

/// `GET /api/artworks/{id}` - one artwork with artist details.
#[instrument(skip(state, id))]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<ArtworkId>, PathRejection>,
) -> Result<Json<ArtworkDetail>> {
    let Path(id) = id.map_err(bad_request)?;

    state
        .catalog()
        .get_artwork(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("artwork {id}")))
}

/// `GET /api/artworks/{id}/related` - other artworks in the same category.
#[instrument(skip(state, id))]
pub async fn related(
    State(state): State<AppState>,
    id: std::result::Result<Path<ArtworkId>, PathRejection>,
) -> Result<Json<Vec<Artwork>>> {
    let Path(id) = id.map_err(bad_request)?;

    state
        .catalog()
        .related_artworks(id, RELATED_LIMIT)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("artwork {id}")))
}
