//! Persistence for the storefront.
//!
//! # Database: `atelier_storefront`
//!
//! ## Tables
//!
//! - `storefront.artist` - Artists
//! - `storefront.artwork` - The catalog (read-only through the API)
//! - `storefront.cart_item` - Cart lines, scoped by session token
//! - `storefront.wishlist_item` - Wishlist lines, scoped by session token
//!
//! Handlers depend on the [`CatalogStore`], [`CartStore`] and
//! [`WishlistStore`] traits. `PostgreSQL` implements them for production and
//! [`MemoryStore`] implements them for tests and demos.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

mod cache;
mod cart;
mod catalog;
pub(crate) mod memory;
mod wishlist;

pub use cache::CachedCatalog;
pub use cart::PgCartStore;
pub use catalog::PgCatalog;
pub use memory::MemoryStore;
pub use wishlist::PgWishlistStore;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use atelier_core::{
    Artist, ArtistId, Artwork, ArtworkDetail, ArtworkId, ArtworkSnapshot, CartLine, CartLineId,
    CategoryCount, LineChange, Quantity, QuantityError, SessionToken, WishlistAdd, WishlistLine,
    WishlistLineId,
};

use crate::models::ArtworkQuery;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A quantity left the valid range (e.g. a merge overflowed).
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

// =============================================================================
// Store Traits
// =============================================================================

/// Read-only access to artists and artworks.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Artworks matching the filters, in the requested order.
    async fn list_artworks(&self, query: &ArtworkQuery) -> Result<Vec<Artwork>, RepositoryError>;

    /// One artwork with its artist's bio and profile image.
    async fn get_artwork(&self, id: ArtworkId) -> Result<Option<ArtworkDetail>, RepositoryError>;

    /// Up to `limit` other artworks in the same category.
    ///
    /// Returns `None` when the artwork itself does not exist.
    async fn related_artworks(
        &self,
        id: ArtworkId,
        limit: i64,
    ) -> Result<Option<Vec<Artwork>>, RepositoryError>;

    /// All artists ordered by name.
    async fn list_artists(&self) -> Result<Vec<Artist>, RepositoryError>;

    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, RepositoryError>;

    /// An artist's artworks, newest first.
    async fn artworks_by_artist(&self, id: ArtistId) -> Result<Vec<Artwork>, RepositoryError>;

    /// Artwork count per category, ordered by category.
    async fn category_stats(&self) -> Result<Vec<CategoryCount>, RepositoryError>;

    /// Case-insensitive substring search over title, description, artist name
    /// and category.
    async fn search(&self, term: &str, limit: i64) -> Result<Vec<Artwork>, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Cart lines, partitioned by session token.
///
/// Every operation only sees lines belonging to `session`.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The session's lines, newest first.
    async fn list(&self, session: &SessionToken) -> Result<Vec<CartLine>, RepositoryError>;

    /// Add `quantity` of an artwork, merging into the line with the same
    /// `(artwork, size)` key if one exists.
    async fn add(
        &self,
        session: &SessionToken,
        snapshot: &ArtworkSnapshot,
        size_option: Option<&str>,
        quantity: Quantity,
    ) -> Result<LineChange, RepositoryError>;

    /// Remove a line. Returns whether a line was removed.
    async fn remove(&self, session: &SessionToken, id: CartLineId)
    -> Result<bool, RepositoryError>;

    /// Replace a line's quantity. Returns whether the line exists.
    async fn set_quantity(
        &self,
        session: &SessionToken,
        id: CartLineId,
        quantity: Quantity,
    ) -> Result<bool, RepositoryError>;
}

/// Wishlist lines, partitioned by session token.
#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// The session's lines, newest first.
    async fn list(&self, session: &SessionToken) -> Result<Vec<WishlistLine>, RepositoryError>;

    /// Save an artwork; a no-op if it is already saved.
    async fn add(
        &self,
        session: &SessionToken,
        snapshot: &ArtworkSnapshot,
    ) -> Result<WishlistAdd, RepositoryError>;

    /// Remove a line by its id. Returns whether a line was removed.
    async fn remove(
        &self,
        session: &SessionToken,
        id: WishlistLineId,
    ) -> Result<bool, RepositoryError>;
}
