//! Catalog lookups for local mode.
//!
//! Remote mode resolves artworks on the server. Local mode has to take the
//! snapshot itself, from either the storefront's catalog API or a static list.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;

use atelier_core::{Artwork, ArtworkDetail, ArtworkId, ArtworkSnapshot};

use crate::api::{ApiBase, api_error};
use crate::error::SyncError;

/// Resolves artwork ids to display snapshots.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Look up an artwork. Returns `None` if it does not exist.
    async fn artwork(&self, id: ArtworkId) -> Result<Option<ArtworkSnapshot>, SyncError>;
}

/// Reads `GET /api/artworks/{id}` from a storefront.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base: ApiBase,
}

impl HttpCatalog {
    /// Create a catalog client for the storefront at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        Ok(Self::with_client(reqwest::Client::new(), ApiBase::parse(base_url)?))
    }

    /// Create a catalog client sharing an existing HTTP client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, base: ApiBase) -> Self {
        Self { client, base }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    #[tracing::instrument(skip(self), fields(artwork_id = %id))]
    async fn artwork(&self, id: ArtworkId) -> Result<Option<ArtworkSnapshot>, SyncError> {
        let url = self.base.endpoint(&format!("artworks/{id}"))?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let detail: ArtworkDetail = response.json().await?;
                Ok(Some(ArtworkSnapshot::from(&detail)))
            }
            _ => Err(api_error(response).await),
        }
    }
}

/// A fixed in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    artworks: HashMap<ArtworkId, ArtworkSnapshot>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an artwork.
    pub fn insert(&mut self, snapshot: ArtworkSnapshot) {
        self.artworks.insert(snapshot.artwork_id, snapshot);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.artworks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artworks.is_empty()
    }
}

impl<'a> FromIterator<&'a Artwork> for StaticCatalog {
    fn from_iter<I: IntoIterator<Item = &'a Artwork>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for artwork in iter {
            catalog.insert(ArtworkSnapshot::from(artwork));
        }
        catalog
    }
}

impl FromIterator<ArtworkSnapshot> for StaticCatalog {
    fn from_iter<I: IntoIterator<Item = ArtworkSnapshot>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for snapshot in iter {
            catalog.insert(snapshot);
        }
        catalog
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn artwork(&self, id: ArtworkId) -> Result<Option<ArtworkSnapshot>, SyncError> {
        Ok(self.artworks.get(&id).cloned())
    }
}
