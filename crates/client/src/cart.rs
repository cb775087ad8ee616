//! The cart aggregate.

use rust_decimal::Decimal;
use tokio::sync::Mutex;

use atelier_core::{ArtworkId, CartLine, CartLineId, CartLines, CartSummary, Quantity};

use crate::error::SyncError;
use crate::gateway::CartSync;

/// A shopper's cart, kept in sync through a gateway.
///
/// The in-memory lines are a cache of the gateway's last known state. Each
/// mutation holds the aggregate's lock across the gateway call and the
/// rehydrating read, so mutations on one aggregate never interleave. If either
/// step fails the cached lines are left untouched.
pub struct Cart<G> {
    gateway: G,
    lines: Mutex<CartLines>,
    tax_rate: Decimal,
}

impl<G: CartSync> Cart<G> {
    /// Create an empty cart; call [`Cart::refresh`] to load its lines.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            lines: Mutex::new(CartLines::default()),
            tax_rate: CartSummary::DEFAULT_TAX_RATE,
        }
    }

    /// Use a different tax rate for [`Cart::summary`].
    #[must_use]
    pub fn with_tax_rate(mut self, tax_rate: Decimal) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Reload the lines from the gateway.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error; the cached lines are kept.
    pub async fn refresh(&self) -> Result<Vec<CartLine>, SyncError> {
        let mut lines = self.lines.lock().await;
        *lines = CartLines::new(self.gateway.load_cart().await?);
        Ok(lines.as_slice().to_vec())
    }

    /// The cached lines, most recently created first.
    pub async fn lines(&self) -> Vec<CartLine> {
        self.lines.lock().await.as_slice().to_vec()
    }

    /// Add `quantity` of an artwork in a size.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidQuantity` if `quantity < 1` (nothing is sent),
    /// `SyncError::ArtworkNotFound` if the artwork does not exist, or the
    /// gateway's error.
    pub async fn add(
        &self,
        artwork_id: ArtworkId,
        size_option: Option<&str>,
        quantity: i64,
    ) -> Result<(), SyncError> {
        let quantity = Quantity::new(quantity)?;
        let mut lines = self.lines.lock().await;

        self.gateway
            .add_to_cart(artwork_id, size_option, quantity)
            .await?;
        *lines = CartLines::new(self.gateway.load_cart().await?);
        Ok(())
    }

    /// Remove a line. Removing an unknown line is not an error.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error.
    pub async fn remove(&self, id: CartLineId) -> Result<(), SyncError> {
        let mut lines = self.lines.lock().await;

        self.gateway.remove_from_cart(id).await?;
        *lines = CartLines::new(self.gateway.load_cart().await?);
        Ok(())
    }

    /// Replace a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidQuantity` if `quantity < 1`, leaving the line
    /// as it was, or the gateway's error.
    pub async fn update_quantity(&self, id: CartLineId, quantity: i64) -> Result<(), SyncError> {
        let quantity = Quantity::new(quantity)?;
        let mut lines = self.lines.lock().await;

        self.gateway.update_quantity(id, quantity).await?;
        *lines = CartLines::new(self.gateway.load_cart().await?);
        Ok(())
    }

    /// Sum of quantities over the cached lines.
    pub async fn item_count(&self) -> u64 {
        self.lines.lock().await.item_count()
    }

    /// Sum of price × quantity over the cached lines.
    pub async fn total_price(&self) -> Decimal {
        self.lines.lock().await.total_price()
    }

    /// Subtotal, tax and total over the cached lines.
    pub async fn summary(&self) -> CartSummary {
        CartSummary::compute(&*self.lines.lock().await, self.tax_rate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::catalog::tests::catalog;
    use crate::gateway::LocalGateway;
    use crate::storage::MemoryStore;

    use super::*;

    fn local_cart() -> Cart<LocalGateway> {
        Cart::new(LocalGateway::open(
            Arc::new(MemoryStore::new()),
            Arc::new(catalog()),
        ))
    }

    #[tokio::test]
    async fn test_repeated_adds_merge_into_one_line() {
        let cart = local_cart();
        let seven = ArtworkId::new(7);

        for quantity in [1, 2, 4] {
            cart.add(seven, Some("Medium"), quantity).await.unwrap();
        }

        let lines = cart.lines().await;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity.get(), 7);
        assert_eq!(lines[0].size_option.as_deref(), Some("Medium"));
    }

    #[tokio::test]
    async fn test_count_and_total() {
        let cart = local_cart();
        cart.add(ArtworkId::new(7), None, 2).await.unwrap();
        cart.add(ArtworkId::new(8), None, 3).await.unwrap();

        assert_eq!(cart.item_count().await, 5);
        assert_eq!(cart.total_price().await, Decimal::from(35));
    }

    #[tokio::test]
    async fn test_summary_applies_tax_rate() {
        let cart = local_cart().with_tax_rate(Decimal::new(10, 2));
        cart.add(ArtworkId::new(7), None, 2).await.unwrap();

        let summary = cart.summary().await;
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.subtotal, Decimal::from(20));
        assert_eq!(summary.tax, Decimal::from(2));
        assert_eq!(summary.total, Decimal::from(22));
    }

    #[tokio::test]
    async fn test_non_positive_update_changes_nothing() {
        let cart = local_cart();
        cart.add(ArtworkId::new(7), None, 2).await.unwrap();
        let id = cart.lines().await[0].id;

        for quantity in [0, -1] {
            let err = cart.update_quantity(id, quantity).await.unwrap_err();
            assert!(matches!(err, SyncError::InvalidQuantity(_)));
        }

        assert_eq!(cart.refresh().await.unwrap()[0].quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_non_positive_add_changes_nothing() {
        let cart = local_cart();

        let err = cart.add(ArtworkId::new(7), None, 0).await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidQuantity(_)));
        assert!(cart.refresh().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_line_is_noop() {
        let cart = local_cart();
        cart.add(ArtworkId::new(7), None, 1).await.unwrap();

        cart.remove(CartLineId::new(999)).await.unwrap();
        assert_eq!(cart.lines().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_then_remove() {
        let cart = local_cart();
        cart.add(ArtworkId::new(7), None, 1).await.unwrap();
        let id = cart.lines().await[0].id;

        cart.update_quantity(id, 4).await.unwrap();
        assert_eq!(cart.item_count().await, 4);

        cart.remove(id).await.unwrap();
        assert!(cart.lines().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_adds_on_one_cart() {
        let cart = Arc::new(local_cart());

        let mut set = tokio::task::JoinSet::new();
        for _ in 0..10 {
            let cart = cart.clone();
            set.spawn(async move { cart.add(ArtworkId::new(8), None, 1).await });
        }
        while let Some(result) = set.join_next().await {
            result.unwrap().unwrap();
        }

        let lines = cart.refresh().await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity.get(), 10);
    }

    /// Local gateway whose calls can be made to fail on demand.
    struct Flaky {
        inner: LocalGateway,
        down: AtomicBool,
    }

    impl Flaky {
        fn check(&self) -> Result<(), SyncError> {
            if self.down.load(Ordering::SeqCst) {
                Err(SyncError::Api {
                    status: 503,
                    code: "unavailable".to_string(),
                    message: "down".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CartSync for Flaky {
        async fn load_cart(&self) -> Result<Vec<CartLine>, SyncError> {
            self.check()?;
            self.inner.load_cart().await
        }

        async fn add_to_cart(
            &self,
            artwork_id: ArtworkId,
            size_option: Option<&str>,
            quantity: Quantity,
        ) -> Result<(), SyncError> {
            self.check()?;
            self.inner.add_to_cart(artwork_id, size_option, quantity).await
        }

        async fn remove_from_cart(&self, id: CartLineId) -> Result<(), SyncError> {
            self.check()?;
            self.inner.remove_from_cart(id).await
        }

        async fn update_quantity(
            &self,
            id: CartLineId,
            quantity: Quantity,
        ) -> Result<(), SyncError> {
            self.check()?;
            self.inner.update_quantity(id, quantity).await
        }
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_cached_lines() {
        let cart = Cart::new(Flaky {
            inner: LocalGateway::open(Arc::new(MemoryStore::new()), Arc::new(catalog())),
            down: AtomicBool::new(false),
        });
        cart.add(ArtworkId::new(7), None, 2).await.unwrap();
        let before = cart.lines().await;

        cart.gateway().down.store(true, Ordering::SeqCst);
        assert!(cart.add(ArtworkId::new(8), None, 1).await.is_err());
        assert!(cart.remove(before[0].id).await.is_err());
        assert!(cart.refresh().await.is_err());

        assert_eq!(cart.lines().await, before);
    }
}
