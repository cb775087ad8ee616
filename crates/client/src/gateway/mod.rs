//! Sync gateways: where cart and wishlist lines are persisted.
//!
//! Each capability is a trait with two bodies:
//!
//! - [`RemoteGateway`] - every call is a request to the storefront API,
//!   scoped by the session token
//! - [`LocalGateway`] - lines live in a persisted key-value slot, merged on
//!   the client with the same rules the server uses
//!
//! Both must be observably identical: same merge, same validation, same
//! errors for missing artworks, same no-op on unknown line ids.

mod local;
mod remote;

pub use local::{CART_KEY, LocalGateway, WISHLIST_KEY};
pub use remote::RemoteGateway;

use async_trait::async_trait;

use atelier_core::{ArtworkId, CartLine, CartLineId, Quantity, WishlistLine, WishlistLineId};

use crate::error::SyncError;

/// Persistence for a cart.
#[async_trait]
pub trait CartSync: Send + Sync {
    /// Fetch all lines, most recently created first.
    async fn load_cart(&self) -> Result<Vec<CartLine>, SyncError>;

    /// Add `quantity` of an artwork in a size, merging into an existing line
    /// for the same `(artwork, size)`.
    ///
    /// Fails with [`SyncError::ArtworkNotFound`] if the artwork does not exist.
    async fn add_to_cart(
        &self,
        artwork_id: ArtworkId,
        size_option: Option<&str>,
        quantity: Quantity,
    ) -> Result<(), SyncError>;

    /// Remove a line. Unknown ids are a no-op.
    async fn remove_from_cart(&self, id: CartLineId) -> Result<(), SyncError>;

    /// Replace a line's quantity. Unknown ids are a no-op.
    async fn update_quantity(&self, id: CartLineId, quantity: Quantity) -> Result<(), SyncError>;
}

/// Persistence for a wishlist.
#[async_trait]
pub trait WishlistSync: Send + Sync {
    /// Fetch all lines, most recently created first.
    async fn load_wishlist(&self) -> Result<Vec<WishlistLine>, SyncError>;

    /// Save an artwork. Returns `true` if it was already saved.
    ///
    /// Fails with [`SyncError::ArtworkNotFound`] if the artwork does not exist.
    async fn add_to_wishlist(&self, artwork_id: ArtworkId) -> Result<bool, SyncError>;

    /// Remove a line by its id. Unknown ids are a no-op.
    async fn remove_from_wishlist(&self, id: WishlistLineId) -> Result<(), SyncError>;
}
