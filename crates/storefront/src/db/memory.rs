//! In-process store for tests and local development.
//!
//! Applies the same merge rules as the Postgres store by delegating to
//! [`CartLines`] and [`WishlistLines`]. Line ids come from store-wide counters
//! so they behave like serial columns: unique across sessions, never reused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use atelier_core::{
    Artist, ArtistId, Artwork, ArtworkDetail, ArtworkId, ArtworkSnapshot, CartLine, CartLineId,
    CartLines, CategoryCount, LineChange, Quantity, SessionToken, WishlistAdd, WishlistLine,
    WishlistLineId, WishlistLines,
};

use super::{CartStore, CatalogStore, RepositoryError, WishlistStore};
use crate::models::{ArtworkQuery, ArtworkSort};

/// Catalog, carts and wishlists held in memory.
#[derive(Default)]
pub struct MemoryStore {
    artists: Mutex<Vec<Artist>>,
    artworks: Mutex<Vec<Artwork>>,
    carts: Mutex<HashMap<SessionToken, CartLines>>,
    wishlists: Mutex<HashMap<SessionToken, WishlistLines>>,
    cart_seq: AtomicI32,
    wishlist_seq: AtomicI32,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with a catalog.
    #[must_use]
    pub fn with_catalog(artists: Vec<Artist>, artworks: Vec<Artwork>) -> Self {
        Self {
            artists: Mutex::new(artists),
            artworks: Mutex::new(artworks),
            ..Self::default()
        }
    }

    /// Insert or replace an artist.
    pub fn put_artist(&self, artist: Artist) {
        let mut artists = lock(&self.artists);
        artists.retain(|a| a.id != artist.id);
        artists.push(artist);
    }

    /// Insert or replace an artwork.
    pub fn put_artwork(&self, artwork: Artwork) {
        let mut artworks = lock(&self.artworks);
        artworks.retain(|a| a.id != artwork.id);
        artworks.push(artwork);
    }

    fn next_cart_id(&self) -> CartLineId {
        CartLineId::new(self.cart_seq.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn next_wishlist_id(&self) -> WishlistLineId {
        WishlistLineId::new(self.wishlist_seq.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn artist(&self, id: ArtistId) -> Option<Artist> {
        lock(&self.artists).iter().find(|a| a.id == id).cloned()
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Every critical section leaves the data consistent, so poisoning carries no
/// information here.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn newest_first(a: &Artwork, b: &Artwork) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

fn popularity(artwork: &Artwork) -> u8 {
    u8::from(artwork.is_featured) + u8::from(artwork.is_trending)
}

fn matches(artwork: &Artwork, query: &ArtworkQuery) -> bool {
    (!query.featured || artwork.is_featured)
        && (!query.trending || artwork.is_trending)
        && (!query.bestseller || artwork.is_bestseller)
        && query.category.is_none_or(|c| artwork.category == c)
        && query
            .orientation
            .as_deref()
            .is_none_or(|o| artwork.orientation.as_deref() == Some(o))
        && query.min_price.is_none_or(|min| artwork.price >= min)
        && query.max_price.is_none_or(|max| artwork.price <= max)
}

fn page<T>(items: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    items.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_artworks(&self, query: &ArtworkQuery) -> Result<Vec<Artwork>, RepositoryError> {
        let mut artworks: Vec<Artwork> = lock(&self.artworks)
            .iter()
            .filter(|a| matches(a, query))
            .cloned()
            .collect();

        match query.sort {
            ArtworkSort::Newest => artworks.sort_by(newest_first),
            ArtworkSort::PriceLow => artworks.sort_by(|a, b| a.price.cmp(&b.price)),
            ArtworkSort::PriceHigh => artworks.sort_by(|a, b| b.price.cmp(&a.price)),
            ArtworkSort::Popular => artworks.sort_by(|a, b| {
                popularity(b)
                    .cmp(&popularity(a))
                    .then_with(|| newest_first(a, b))
            }),
        }

        Ok(page(artworks, query.offset, query.limit))
    }

    async fn get_artwork(&self, id: ArtworkId) -> Result<Option<ArtworkDetail>, RepositoryError> {
        let Some(artwork) = lock(&self.artworks).iter().find(|a| a.id == id).cloned() else {
            return Ok(None);
        };
        let artist = self.artist(artwork.artist_id);

        Ok(Some(ArtworkDetail {
            artist_bio: artist.as_ref().and_then(|a| a.bio.clone()),
            artist_profile_image_url: artist.and_then(|a| a.profile_image_url),
            artwork,
        }))
    }

    async fn related_artworks(
        &self,
        id: ArtworkId,
        limit: i64,
    ) -> Result<Option<Vec<Artwork>>, RepositoryError> {
        let artworks = lock(&self.artworks);
        let Some(category) = artworks.iter().find(|a| a.id == id).map(|a| a.category) else {
            return Ok(None);
        };

        // Deterministic stand-in for the database's random pick
        let mut related: Vec<Artwork> = artworks
            .iter()
            .filter(|a| a.category == category && a.id != id)
            .cloned()
            .collect();
        related.sort_by(newest_first);

        Ok(Some(page(related, 0, limit)))
    }

    async fn list_artists(&self) -> Result<Vec<Artist>, RepositoryError> {
        let mut artists = lock(&self.artists).clone();
        artists.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(artists)
    }

    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, RepositoryError> {
        Ok(self.artist(id))
    }

    async fn artworks_by_artist(&self, id: ArtistId) -> Result<Vec<Artwork>, RepositoryError> {
        let mut artworks: Vec<Artwork> = lock(&self.artworks)
            .iter()
            .filter(|a| a.artist_id == id)
            .cloned()
            .collect();
        artworks.sort_by(newest_first);
        Ok(artworks)
    }

    async fn category_stats(&self) -> Result<Vec<CategoryCount>, RepositoryError> {
        let mut counts: HashMap<_, i64> = HashMap::new();
        for artwork in lock(&self.artworks).iter() {
            *counts.entry(artwork.category).or_default() += 1;
        }

        let mut stats: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        stats.sort_by(|a, b| a.category.as_str().cmp(b.category.as_str()));
        Ok(stats)
    }

    async fn search(&self, term: &str, limit: i64) -> Result<Vec<Artwork>, RepositoryError> {
        let needle = term.to_lowercase();
        let hit = |field: &str| field.to_lowercase().contains(&needle);

        let mut artworks: Vec<Artwork> = lock(&self.artworks)
            .iter()
            .filter(|a| {
                hit(&a.title)
                    || a.description.as_deref().is_some_and(hit)
                    || a.artist_name.as_deref().is_some_and(hit)
                    || hit(a.category.as_str())
            })
            .cloned()
            .collect();
        artworks.sort_by(|a, b| {
            b.is_featured
                .cmp(&a.is_featured)
                .then_with(|| newest_first(a, b))
        });

        Ok(page(artworks, 0, limit))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn list(&self, session: &SessionToken) -> Result<Vec<CartLine>, RepositoryError> {
        Ok(lock(&self.carts)
            .get(session)
            .map(CartLines::newest_first)
            .unwrap_or_default())
    }

    async fn add(
        &self,
        session: &SessionToken,
        snapshot: &ArtworkSnapshot,
        size_option: Option<&str>,
        quantity: Quantity,
    ) -> Result<LineChange, RepositoryError> {
        let mut carts = lock(&self.carts);
        let lines = carts.entry(session.clone()).or_default();
        let change = lines.add(snapshot, size_option, quantity, Utc::now(), || {
            self.next_cart_id()
        })?;
        Ok(change)
    }

    async fn remove(
        &self,
        session: &SessionToken,
        id: CartLineId,
    ) -> Result<bool, RepositoryError> {
        Ok(lock(&self.carts)
            .get_mut(session)
            .is_some_and(|lines| lines.remove(id)))
    }

    async fn set_quantity(
        &self,
        session: &SessionToken,
        id: CartLineId,
        quantity: Quantity,
    ) -> Result<bool, RepositoryError> {
        Ok(lock(&self.carts)
            .get_mut(session)
            .is_some_and(|lines| lines.set_quantity(id, quantity)))
    }
}

#[async_trait]
impl WishlistStore for MemoryStore {
    async fn list(&self, session: &SessionToken) -> Result<Vec<WishlistLine>, RepositoryError> {
        Ok(lock(&self.wishlists)
            .get(session)
            .map(WishlistLines::newest_first)
            .unwrap_or_default())
    }

    async fn add(
        &self,
        session: &SessionToken,
        snapshot: &ArtworkSnapshot,
    ) -> Result<WishlistAdd, RepositoryError> {
        let mut wishlists = lock(&self.wishlists);
        let lines = wishlists.entry(session.clone()).or_default();
        Ok(lines.add(snapshot, Utc::now(), || self.next_wishlist_id()))
    }

    async fn remove(
        &self,
        session: &SessionToken,
        id: WishlistLineId,
    ) -> Result<bool, RepositoryError> {
        Ok(lock(&self.wishlists)
            .get_mut(session)
            .is_some_and(|lines| lines.remove(id)))
    }
}
