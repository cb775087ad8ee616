//! Artist handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use tracing::instrument;

use atelier_core::{Artist, ArtistId, Artwork};

use super::bad_request;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /api/artists`
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Artist>>> {
    Ok(Json(state.catalog().list_artists().await?))
}

/// `GET /api/artists/{id}`
#[instrument(skip(state, id))]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<ArtistId>, PathRejection>,
) -> Result<Json<Artist>> {
    let Path(id) = id.map_err(bad_request)?;

    state
        .catalog()
        .get_artist(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("artist {id}")))
}

/// `GET /api/artists/{id}/artworks` - empty for an unknown artist.
#[instrument(skip(state, id))]
pub async fn artworks(
    State(state): State<AppState>,
    id: std::result::Result<Path<ArtistId>, PathRejection>,
) -> Result<Json<Vec<Artwork>>> {
    let Path(id) = id.map_err(bad_request)?;
    Ok(Json(state.catalog().artworks_by_artist(id).await?))
}
