//! Wishlist handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
};
use tracing::instrument;

use atelier_core::{ArtworkSnapshot, WishlistLine, WishlistLineId};

use super::bad_request;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::ShopperSession;
use crate::models::{AddToWishlistRequest, MutationResponse};
use crate::state::AppState;

/// `GET /api/wishlist` - the session's saved artworks, newest first.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: ShopperSession,
) -> Result<Json<Vec<WishlistLine>>> {
    Ok(Json(state.wishlists().list(session.token()).await?))
}

/// `POST /api/wishlist` - save an artwork; saving it twice is a no-op.
#[instrument(skip(state, session, body))]
pub async fn add(
    State(state): State<AppState>,
    session: ShopperSession,
    body: std::result::Result<Json<AddToWishlistRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>> {
    let Json(body) = body.map_err(bad_request)?;
    let artwork_id = body
        .artwork_id
        .ok_or_else(|| AppError::BadRequest("artwork_id is required".to_string()))?;

    let artwork = state
        .catalog()
        .get_artwork(artwork_id)
        .await?
        .ok_or(AppError::ArtworkNotFound(artwork_id))?;

    let added = state
        .wishlists()
        .add(session.token(), &ArtworkSnapshot::from(&artwork))
        .await?;

    if added.already_exists() {
        return Ok(Json(MutationResponse::ALREADY_EXISTS));
    }

    add_breadcrumb(
        "wishlist",
        "Saved artwork",
        Some(&[("artwork_id", artwork_id.to_string().as_str())]),
    );
    Ok(Json(MutationResponse::OK))
}

/// `DELETE /api/wishlist/{id}` - remove by line id; a missing line is a no-op.
#[instrument(skip(state, session, id))]
pub async fn remove(
    State(state): State<AppState>,
    session: ShopperSession,
    id: std::result::Result<Path<WishlistLineId>, PathRejection>,
) -> Result<Json<MutationResponse>> {
    let Path(id) = id.map_err(bad_request)?;

    if !state.wishlists().remove(session.token(), id).await? {
        tracing::debug!(line_id = %id, "Wishlist line not present");
    }

    Ok(Json(MutationResponse::OK))
}
