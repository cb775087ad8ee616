//! TTL cache in front of a catalog store.
//!
//! Caches single artworks, the artist list and category stats using `moka`.
//! Listings and search are parameterized too widely to cache usefully and go
//! straight to the inner store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, instrument};

use atelier_core::{Artist, ArtistId, Artwork, ArtworkDetail, ArtworkId, CategoryCount};

use super::{CatalogStore, RepositoryError};
use crate::models::ArtworkQuery;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Artwork(ArtworkId),
    Artists,
    CategoryStats,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Artwork(Box<ArtworkDetail>),
    Artists(Arc<Vec<Artist>>),
    CategoryStats(Arc<Vec<CategoryCount>>),
}

/// A [`CatalogStore`] that caches hot reads from another store.
#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn CatalogStore>,
    cache: Cache<CacheKey, CacheValue>,
}

impl CachedCatalog {
    /// Wrap `inner`, keeping entries for `ttl`.
    #[must_use]
    pub fn new(inner: Arc<dyn CatalogStore>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }

    /// Invalidate a cached artwork.
    pub async fn invalidate_artwork(&self, id: ArtworkId) {
        self.cache.invalidate(&CacheKey::Artwork(id)).await;
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl CatalogStore for CachedCatalog {
    async fn list_artworks(&self, query: &ArtworkQuery) -> Result<Vec<Artwork>, RepositoryError> {
        self.inner.list_artworks(query).await
    }

    #[instrument(skip(self), fields(artwork_id = %id))]
    async fn get_artwork(&self, id: ArtworkId) -> Result<Option<ArtworkDetail>, RepositoryError> {
        let cache_key = CacheKey::Artwork(id);

        if let Some(CacheValue::Artwork(detail)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for artwork");
            return Ok(Some(*detail));
        }

        // Misses are not cached so a newly added artwork shows up immediately
        let detail = self.inner.get_artwork(id).await?;
        if let Some(detail) = &detail {
            self.cache
                .insert(cache_key, CacheValue::Artwork(Box::new(detail.clone())))
                .await;
        }

        Ok(detail)
    }

    async fn related_artworks(
        &self,
        id: ArtworkId,
        limit: i64,
    ) -> Result<Option<Vec<Artwork>>, RepositoryError> {
        self.inner.related_artworks(id, limit).await
    }

    #[instrument(skip(self))]
    async fn list_artists(&self) -> Result<Vec<Artist>, RepositoryError> {
        if let Some(CacheValue::Artists(artists)) = self.cache.get(&CacheKey::Artists).await {
            debug!("Cache hit for artists");
            return Ok(artists.as_ref().clone());
        }

        let artists = self.inner.list_artists().await?;
        self.cache
            .insert(CacheKey::Artists, CacheValue::Artists(Arc::new(artists.clone())))
            .await;

        Ok(artists)
    }

    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, RepositoryError> {
        self.inner.get_artist(id).await
    }

    async fn artworks_by_artist(&self, id: ArtistId) -> Result<Vec<Artwork>, RepositoryError> {
        self.inner.artworks_by_artist(id).await
    }

    #[instrument(skip(self))]
    async fn category_stats(&self) -> Result<Vec<CategoryCount>, RepositoryError> {
        if let Some(CacheValue::CategoryStats(stats)) =
            self.cache.get(&CacheKey::CategoryStats).await
        {
            debug!("Cache hit for category stats");
            return Ok(stats.as_ref().clone());
        }

        let stats = self.inner.category_stats().await?;
        self.cache
            .insert(
                CacheKey::CategoryStats,
                CacheValue::CategoryStats(Arc::new(stats.clone())),
            )
            .await;

        Ok(stats)
    }

    async fn search(&self, term: &str, limit: i64) -> Result<Vec<Artwork>, RepositoryError> {
        self.inner.search(term, limit).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.inner.ping().await
    }
}
