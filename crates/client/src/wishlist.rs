//! The wishlist aggregate.

use tokio::sync::Mutex;

use atelier_core::{ArtworkId, WishlistLine, WishlistLineId, WishlistLines};

use crate::error::SyncError;
use crate::gateway::WishlistSync;

/// A shopper's saved artworks, kept in sync through a gateway.
///
/// Locking and failure behave as for [`crate::Cart`].
pub struct Wishlist<G> {
    gateway: G,
    lines: Mutex<WishlistLines>,
}

impl<G: WishlistSync> Wishlist<G> {
    /// Create an empty wishlist; call [`Wishlist::refresh`] to load its lines.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            lines: Mutex::new(WishlistLines::default()),
        }
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Reload the lines from the gateway.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error; the cached lines are kept.
    pub async fn refresh(&self) -> Result<Vec<WishlistLine>, SyncError> {
        let mut lines = self.lines.lock().await;
        *lines = WishlistLines::new(self.gateway.load_wishlist().await?);
        Ok(lines.as_slice().to_vec())
    }

    /// The cached lines, most recently created first.
    pub async fn lines(&self) -> Vec<WishlistLine> {
        self.lines.lock().await.as_slice().to_vec()
    }

    /// Whether an artwork is among the cached lines.
    pub async fn is_saved(&self, artwork_id: ArtworkId) -> bool {
        self.lines.lock().await.contains(artwork_id)
    }

    /// Save an artwork. Returns `true` if it was already saved.
    ///
    /// An artwork already in the cached lines is reported as saved without
    /// calling the gateway.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::ArtworkNotFound` if the artwork does not exist, or
    /// the gateway's error.
    pub async fn add(&self, artwork_id: ArtworkId) -> Result<bool, SyncError> {
        let mut lines = self.lines.lock().await;
        if lines.contains(artwork_id) {
            return Ok(true);
        }

        let already_saved = self.gateway.add_to_wishlist(artwork_id).await?;
        *lines = WishlistLines::new(self.gateway.load_wishlist().await?);
        Ok(already_saved)
    }

    /// Remove a line by its id. Removing an unknown line is not an error.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error.
    pub async fn remove(&self, id: WishlistLineId) -> Result<(), SyncError> {
        let mut lines = self.lines.lock().await;

        self.gateway.remove_from_wishlist(id).await?;
        *lines = WishlistLines::new(self.gateway.load_wishlist().await?);
        Ok(())
    }

    /// Number of saved artworks.
    pub async fn item_count(&self) -> usize {
        self.lines.lock().await.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use crate::catalog::tests::catalog;
    use crate::gateway::LocalGateway;
    use crate::storage::MemoryStore;

    use super::*;

    fn local_wishlist() -> Wishlist<LocalGateway> {
        Wishlist::new(LocalGateway::open(
            Arc::new(MemoryStore::new()),
            Arc::new(catalog()),
        ))
    }

    #[tokio::test]
    async fn test_add_twice_keeps_one_line() {
        let wishlist = local_wishlist();
        let seven = ArtworkId::new(7);

        assert!(!wishlist.add(seven).await.unwrap());
        assert!(wishlist.add(seven).await.unwrap());

        assert_eq!(wishlist.item_count().await, 1);
        assert!(wishlist.is_saved(seven).await);
        assert!(!wishlist.is_saved(ArtworkId::new(8)).await);
    }

    #[tokio::test]
    async fn test_add_unknown_artwork() {
        let wishlist = local_wishlist();

        let err = wishlist.add(ArtworkId::new(404)).await.unwrap_err();
        assert!(matches!(err, SyncError::ArtworkNotFound(_)));
        assert_eq!(wishlist.item_count().await, 0);
    }

    #[tokio::test]
    async fn test_remove_by_line_id() {
        let wishlist = local_wishlist();
        wishlist.add(ArtworkId::new(7)).await.unwrap();
        wishlist.add(ArtworkId::new(8)).await.unwrap();

        let line = wishlist
            .lines()
            .await
            .into_iter()
            .find(|l| l.artwork_id == ArtworkId::new(7))
            .unwrap();
        wishlist.remove(line.id).await.unwrap();

        assert!(!wishlist.is_saved(ArtworkId::new(7)).await);
        assert!(wishlist.is_saved(ArtworkId::new(8)).await);

        wishlist.remove(WishlistLineId::new(999)).await.unwrap();
        assert_eq!(wishlist.item_count().await, 1);
    }

    #[tokio::test]
    async fn test_refresh_sees_other_handles() {
        let gateway = LocalGateway::open(Arc::new(MemoryStore::new()), Arc::new(catalog()));
        let first = Wishlist::new(gateway.clone());
        let second = Wishlist::new(gateway);

        first.add(ArtworkId::new(7)).await.unwrap();
        assert_eq!(second.item_count().await, 0);

        second.refresh().await.unwrap();
        assert!(second.is_saved(ArtworkId::new(7)).await);
    }
}
