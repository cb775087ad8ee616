//! Gateway backed by persisted key-value slots.
//!
//! Lines are deserialized once when the gateway opens and written back whole
//! after every mutation. A mutation is applied to a copy of the lines and only
//! becomes visible once it has been persisted.
//!
//! Each slot also records the highest line id it has issued. Ids of removed
//! lines are never handed out again, so a stale id held by the caller can
//! only ever miss.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::instrument;

use atelier_core::{
    ArtworkId, ArtworkSnapshot, CartLine, CartLineId, CartLines, LineChange, Quantity,
    WishlistAdd, WishlistLine, WishlistLineId, WishlistLines,
};

use super::{CartSync, WishlistSync};
use crate::catalog::CatalogSource;
use crate::error::SyncError;
use crate::storage::KeyValueStore;

/// Slot holding the serialized cart lines.
pub const CART_KEY: &str = "cart";

/// Slot holding the serialized wishlist lines.
pub const WISHLIST_KEY: &str = "wishlist";

/// Gateway that keeps lines in a local store.
///
/// Cheap to clone; clones share the same lines.
#[derive(Clone)]
pub struct LocalGateway {
    inner: Arc<LocalGatewayInner>,
}

struct LocalGatewayInner {
    store: Arc<dyn KeyValueStore>,
    catalog: Arc<dyn CatalogSource>,
    cart: Mutex<Slot<CartLines>>,
    wishlist: Mutex<Slot<WishlistLines>>,
}

/// Persisted contents of one slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Slot<L> {
    /// Highest id issued so far, including ids of lines since removed.
    last_id: i32,
    lines: L,
}

impl<L> Slot<L> {
    fn next_id(&self) -> i32 {
        self.last_id.saturating_add(1)
    }
}

/// Read a slot, falling back to empty when it is missing or unreadable.
fn load_slot<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Could not read persisted lines, starting empty");
            return T::default();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "Malformed persisted lines, resetting to empty");
        T::default()
    })
}

fn save_slot<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), SyncError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json).inspect_err(|e| {
        tracing::warn!(key, error = %e, "Could not persist lines");
    })?;
    Ok(())
}

impl LocalGateway {
    /// Open the gateway, loading any persisted lines from `store`.
    ///
    /// `catalog` supplies the snapshot taken when a line is created.
    #[must_use]
    pub fn open(store: Arc<dyn KeyValueStore>, catalog: Arc<dyn CatalogSource>) -> Self {
        let mut cart: Slot<CartLines> = load_slot(store.as_ref(), CART_KEY);
        let mut wishlist: Slot<WishlistLines> = load_slot(store.as_ref(), WISHLIST_KEY);

        // A hand-edited slot may carry lines above its mark
        cart.last_id = cart.last_id.max(cart.lines.max_id());
        wishlist.last_id = wishlist.last_id.max(wishlist.lines.max_id());

        tracing::debug!(
            cart_lines = cart.lines.len(),
            wishlist_lines = wishlist.lines.len(),
            cart_last_id = cart.last_id,
            wishlist_last_id = wishlist.last_id,
            "Local gateway opened"
        );

        Self {
            inner: Arc::new(LocalGatewayInner {
                store,
                catalog,
                cart: Mutex::new(cart),
                wishlist: Mutex::new(wishlist),
            }),
        }
    }

    async fn snapshot(&self, artwork_id: ArtworkId) -> Result<ArtworkSnapshot, SyncError> {
        self.inner
            .catalog
            .artwork(artwork_id)
            .await?
            .ok_or(SyncError::ArtworkNotFound(artwork_id))
    }

    /// Apply `change` to a copy of the cart and persist it if it changed anything.
    async fn mutate_cart<F>(&self, change: F) -> Result<(), SyncError>
    where
        F: FnOnce(&mut Slot<CartLines>) -> Result<bool, SyncError> + Send,
    {
        let mut slot = self.inner.cart.lock().await;
        let mut next = slot.clone();

        if change(&mut next)? {
            save_slot(self.inner.store.as_ref(), CART_KEY, &next)?;
            *slot = next;
        }
        Ok(())
    }

    async fn mutate_wishlist<F>(&self, change: F) -> Result<(), SyncError>
    where
        F: FnOnce(&mut Slot<WishlistLines>) -> bool + Send,
    {
        let mut slot = self.inner.wishlist.lock().await;
        let mut next = slot.clone();

        if change(&mut next) {
            save_slot(self.inner.store.as_ref(), WISHLIST_KEY, &next)?;
            *slot = next;
        }
        Ok(())
    }
}

#[async_trait]
impl CartSync for LocalGateway {
    async fn load_cart(&self) -> Result<Vec<CartLine>, SyncError> {
        Ok(self.inner.cart.lock().await.lines.newest_first())
    }

    #[instrument(skip_all, fields(artwork_id = %artwork_id))]
    async fn add_to_cart(
        &self,
        artwork_id: ArtworkId,
        size_option: Option<&str>,
        quantity: Quantity,
    ) -> Result<(), SyncError> {
        let snapshot = self.snapshot(artwork_id).await?;

        self.mutate_cart(|slot| {
            let next = CartLineId::new(slot.next_id());
            let change = slot
                .lines
                .add(&snapshot, size_option, quantity, Utc::now(), || next)?;
            if let LineChange::Created(id) = change {
                slot.last_id = id.as_i32();
            }
            Ok(true)
        })
        .await
    }

    #[instrument(skip_all, fields(line_id = %id))]
    async fn remove_from_cart(&self, id: CartLineId) -> Result<(), SyncError> {
        self.mutate_cart(|slot| Ok(slot.lines.remove(id))).await
    }

    #[instrument(skip_all, fields(line_id = %id, quantity = %quantity))]
    async fn update_quantity(&self, id: CartLineId, quantity: Quantity) -> Result<(), SyncError> {
        self.mutate_cart(|slot| Ok(slot.lines.set_quantity(id, quantity)))
            .await
    }
}

#[async_trait]
impl WishlistSync for LocalGateway {
    async fn load_wishlist(&self) -> Result<Vec<WishlistLine>, SyncError> {
        Ok(self.inner.wishlist.lock().await.lines.newest_first())
    }

    #[instrument(skip_all, fields(artwork_id = %artwork_id))]
    async fn add_to_wishlist(&self, artwork_id: ArtworkId) -> Result<bool, SyncError> {
        if self.inner.wishlist.lock().await.lines.contains(artwork_id) {
            return Ok(true);
        }

        let snapshot = self.snapshot(artwork_id).await?;
        let mut already_saved = false;

        self.mutate_wishlist(|slot| {
            let next = WishlistLineId::new(slot.next_id());
            match slot.lines.add(&snapshot, Utc::now(), || next) {
                WishlistAdd::Added(id) => {
                    slot.last_id = id.as_i32();
                    true
                }
                WishlistAdd::AlreadySaved(_) => {
                    already_saved = true;
                    false
                }
            }
        })
        .await?;

        Ok(already_saved)
    }

    #[instrument(skip_all, fields(line_id = %id))]
    async fn remove_from_wishlist(&self, id: WishlistLineId) -> Result<(), SyncError> {
        self.mutate_wishlist(|slot| slot.lines.remove(id)).await
    }
}
