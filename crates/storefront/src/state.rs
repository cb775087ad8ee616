//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{
    CachedCatalog, CartStore, CatalogStore, MemoryStore, PgCartStore, PgCatalog, PgWishlistStore,
    WishlistStore,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the stores and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn CatalogStore>,
    carts: Arc<dyn CartStore>,
    wishlists: Arc<dyn WishlistStore>,
}

impl AppState {
    /// Create application state backed by `PostgreSQL`.
    ///
    /// Catalog reads are cached for `config.catalog_cache_ttl`.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog = CachedCatalog::new(
            Arc::new(PgCatalog::new(pool.clone())),
            config.catalog_cache_ttl,
        );

        Self::from_stores(
            config,
            Arc::new(catalog),
            Arc::new(PgCartStore::new(pool.clone())),
            Arc::new(PgWishlistStore::new(pool)),
        )
    }

    /// Create application state over a single in-memory store.
    #[must_use]
    pub fn in_memory(config: StorefrontConfig, store: Arc<MemoryStore>) -> Self {
        Self::from_stores(config, store.clone(), store.clone(), store)
    }

    /// Create application state from explicit stores.
    #[must_use]
    pub fn from_stores(
        config: StorefrontConfig,
        catalog: Arc<dyn CatalogStore>,
        carts: Arc<dyn CartStore>,
        wishlists: Arc<dyn WishlistStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                carts,
                wishlists,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.inner.catalog.as_ref()
    }

    /// Get the cart store.
    #[must_use]
    pub fn carts(&self) -> &dyn CartStore {
        self.inner.carts.as_ref()
    }

    /// Get the wishlist store.
    #[must_use]
    pub fn wishlists(&self) -> &dyn WishlistStore {
        self.inner.wishlists.as_ref()
    }
}
