//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness check
//! GET    /health/ready              - Readiness check (store reachable)
//!
//! # Catalog (read-only)
//! GET    /api/artworks              - Filtered, sorted listing
//! GET    /api/artworks/{id}         - Artwork detail
//! GET    /api/artworks/{id}/related - Up to 4 artworks in the same category
//! GET    /api/artists               - All artists
//! GET    /api/artists/{id}          - Artist detail
//! GET    /api/artists/{id}/artworks - An artist's artworks
//! GET    /api/categories/stats      - Artwork count per category
//! GET    /api/search                - Substring search
//!
//! # Cart (scoped by x-session-id)
//! GET    /api/cart                  - List lines
//! POST   /api/cart                  - Add (merges by artwork + size)
//! PATCH  /api/cart/{id}             - Replace quantity
//! DELETE /api/cart/{id}             - Remove line
//!
//! # Wishlist (scoped by x-session-id)
//! GET    /api/wishlist              - List lines
//! POST   /api/wishlist              - Save artwork
//! DELETE /api/wishlist/{id}         - Remove line
//! ```

pub mod artists;
pub mod artworks;
pub mod cart;
pub mod categories;
pub mod search;
pub mod wishlist;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    routing::{delete, get},
};

use crate::error::AppError;
use crate::middleware::shopper_session_middleware;
use crate::state::AppState;

/// Map an extractor rejection (or any displayable parse error) to a 400.
pub(crate) fn bad_request(err: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(err.to_string())
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/artworks", get(artworks::index))
        .route("/artworks/{id}", get(artworks::show))
        .route("/artworks/{id}/related", get(artworks::related))
        .route("/artists", get(artists::index))
        .route("/artists/{id}", get(artists::show))
        .route("/artists/{id}/artworks", get(artists::artworks))
        .route("/categories/stats", get(categories::stats))
        .route("/search", get(search::search))
}

/// Create the session-scoped cart and wishlist routes router.
pub fn basket_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::index).post(cart::add))
        .route("/cart/{id}", delete(cart::remove).patch(cart::update))
        .route("/wishlist", get(wishlist::index).post(wishlist::add))
        .route("/wishlist/{id}", delete(wishlist::remove))
        .layer(from_fn(shopper_session_middleware))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", catalog_routes().merge(basket_routes()))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests;
