//! Cart handlers.
//!
//! Lines are scoped by the shopper session resolved in
//! [`shopper_session_middleware`](crate::middleware::shopper_session_middleware).
//! Merge rules live in the stores; handlers validate input and resolve the
//! catalog snapshot.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
};
use tracing::instrument;

use atelier_core::{ArtworkSnapshot, CartLine, CartLineId, LineChange, Quantity};

use super::bad_request;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::ShopperSession;
use crate::models::{AddToCartRequest, MutationResponse, UpdateQuantityRequest};
use crate::state::AppState;

/// `GET /api/cart` - the session's lines, newest first.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: ShopperSession,
) -> Result<Json<Vec<CartLine>>> {
    Ok(Json(state.carts().list(session.token()).await?))
}

/// `POST /api/cart` - add an artwork, merging into an existing line.
#[instrument(skip(state, session, body))]
pub async fn add(
    State(state): State<AppState>,
    session: ShopperSession,
    body: std::result::Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>> {
    let Json(body) = body.map_err(bad_request)?;
    let artwork_id = body
        .artwork_id
        .ok_or_else(|| AppError::BadRequest("artwork_id is required".to_string()))?;
    let quantity = Quantity::new(body.quantity.unwrap_or(1))?;

    let artwork = state
        .catalog()
        .get_artwork(artwork_id)
        .await?
        .ok_or(AppError::ArtworkNotFound(artwork_id))?;

    let change = state
        .carts()
        .add(
            session.token(),
            &ArtworkSnapshot::from(&artwork),
            body.size_option.as_deref(),
            quantity,
        )
        .await?;

    let action = match change {
        LineChange::Created(_) => "Added to cart",
        LineChange::Merged(_) => "Increased cart quantity",
    };
    add_breadcrumb("cart", action, Some(&[("artwork_id", artwork_id.to_string().as_str())]));

    Ok(Json(MutationResponse::OK))
}

/// `DELETE /api/cart/{id}` - removing a missing line is a no-op.
#[instrument(skip(state, session, id))]
pub async fn remove(
    State(state): State<AppState>,
    session: ShopperSession,
    id: std::result::Result<Path<CartLineId>, PathRejection>,
) -> Result<Json<MutationResponse>> {
    let Path(id) = id.map_err(bad_request)?;

    if !state.carts().remove(session.token(), id).await? {
        tracing::debug!(line_id = %id, "Cart line not present");
    }

    Ok(Json(MutationResponse::OK))
}

/// `PATCH /api/cart/{id}` - replace a line's quantity.
///
/// A missing or non-positive quantity is rejected without touching the line.
#[instrument(skip(state, session, id, body))]
pub async fn update(
    State(state): State<AppState>,
    session: ShopperSession,
    id: std::result::Result<Path<CartLineId>, PathRejection>,
    body: std::result::Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>> {
    let Path(id) = id.map_err(bad_request)?;
    let Json(body) = body.map_err(bad_request)?;
    let quantity = Quantity::new(body.quantity.unwrap_or(0))?;

    if !state
        .carts()
        .set_quantity(session.token(), id, quantity)
        .await?
    {
        tracing::debug!(line_id = %id, "Cart line not present");
    }

    Ok(Json(MutationResponse::OK))
}
