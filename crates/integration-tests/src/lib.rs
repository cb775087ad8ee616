//! Integration tests for Atelier.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (storefront on an ephemeral port, in-memory stores)
//! cargo test -p atelier-integration-tests
//!
//! # Including the PostgreSQL-backed tests
//! STOREFRONT_DATABASE_URL=postgres://... cargo test -p atelier-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `session_identity` - Token minting, echo and persistence across runs
//! - `basket_sync` - Remote and local gateways give the same results
//! - `storefront_postgres` - The same scenarios against a real database

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::net::TcpListener;

use atelier_client::StaticCatalog;
use atelier_core::{Artist, ArtistId, Artwork, ArtworkId, Category};
use atelier_storefront::config::StorefrontConfig;
use atelier_storefront::db::MemoryStore;
use atelier_storefront::state::AppState;

/// A storefront served on an ephemeral loopback port.
pub struct TestServer {
    addr: SocketAddr,
    store: Arc<MemoryStore>,
}

impl TestServer {
    /// Serve the storefront over `store` until the test runtime shuts down.
    ///
    /// # Panics
    ///
    /// Panics if the loopback listener cannot be bound.
    pub async fn spawn(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let state = AppState::in_memory(
            StorefrontConfig::for_local("postgres://localhost/unused"),
            store.clone(),
        );
        Self::serve(atelier_storefront::app(state), store).await
    }

    /// Serve the sample catalog.
    ///
    /// # Panics
    ///
    /// Panics if the loopback listener cannot be bound.
    pub async fn with_sample_catalog() -> Self {
        let (artists, artworks) = sample_catalog();
        Self::spawn(MemoryStore::with_catalog(artists, artworks)).await
    }

    async fn serve(router: axum::Router, store: Arc<MemoryStore>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind test listener: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("listener has no address: {e}"));

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .unwrap_or_else(|e| panic!("test server stopped: {e}"));
        });

        Self { addr, store }
    }

    /// Base URL, without a trailing slash.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The backing store, for changing the catalog mid-test.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

/// Two artists and four artworks.
///
/// Artwork 4 has no artist name so snapshots without one are covered.
#[must_use]
pub fn sample_catalog() -> (Vec<Artist>, Vec<Artwork>) {
    let now = Utc::now();
    let artist = |id: i32, name: &str| Artist {
        id: ArtistId::new(id),
        name: name.to_string(),
        bio: Some(format!("{name} makes art")),
        profile_image_url: None,
        created_at: now,
        updated_at: now,
    };
    let artists = vec![artist(1, "Sophia Martinez"), artist(2, "James Chen")];

    let artworks = vec![
        artwork(1, 1, Some("Sophia Martinez"), "Ocean Whisper", Category::AbstractArt, 249),
        artwork(2, 1, Some("Sophia Martinez"), "Desert Bloom", Category::WallArt, 180),
        artwork(3, 2, Some("James Chen"), "Mud Mirror", Category::LippanArt, 120),
        artwork(4, 2, None, "Untitled Study", Category::ArtPrint, 45),
    ];

    (artists, artworks)
}

/// A catalog artwork priced in whole units.
#[must_use]
pub fn artwork(
    id: i32,
    artist_id: i32,
    artist_name: Option<&str>,
    title: &str,
    category: Category,
    price: i64,
) -> Artwork {
    let now = Utc::now();
    Artwork {
        id: ArtworkId::new(id),
        title: title.to_string(),
        artist_id: ArtistId::new(artist_id),
        artist_name: artist_name.map(str::to_string),
        category,
        description: None,
        image_url: format!("https://img.example/{id}.jpg"),
        video_url: None,
        price: Decimal::from(price),
        orientation: None,
        width: None,
        height: None,
        is_featured: false,
        is_trending: false,
        is_bestseller: false,
        created_at: now,
        updated_at: now,
    }
}

/// The sample catalog as a local-mode snapshot source.
#[must_use]
pub fn sample_static_catalog() -> StaticCatalog {
    sample_catalog().1.iter().collect()
}
