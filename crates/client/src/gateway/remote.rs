//! Gateway backed by the storefront's cart and wishlist API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use atelier_core::{
    ArtworkId, CartLine, CartLineId, Quantity, QuantityError, WishlistLine, WishlistLineId,
};

use super::{CartSync, WishlistSync};
use crate::api::{ApiBase, api_error};
use crate::error::SyncError;
use crate::session::{SESSION_HEADER, SessionIdentity};

#[derive(Serialize)]
struct AddToCartBody<'a> {
    artwork_id: ArtworkId,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_option: Option<&'a str>,
    quantity: Quantity,
}

#[derive(Serialize)]
struct UpdateQuantityBody {
    quantity: Quantity,
}

#[derive(Serialize)]
struct AddToWishlistBody {
    artwork_id: ArtworkId,
}

/// `{success, already_exists?}` returned by every mutation.
#[derive(Deserialize)]
struct MutationAck {
    #[serde(default)]
    already_exists: bool,
}

/// Gateway that calls the storefront API for every operation.
///
/// Cheap to clone; clones share the HTTP client and session identity.
#[derive(Clone)]
pub struct RemoteGateway {
    inner: Arc<RemoteGatewayInner>,
}

struct RemoteGatewayInner {
    client: reqwest::Client,
    base: ApiBase,
    identity: SessionIdentity,
}

impl RemoteGateway {
    /// Create a gateway for the storefront at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, identity: SessionIdentity) -> Result<Self, SyncError> {
        Ok(Self::with_client(
            reqwest::Client::new(),
            ApiBase::parse(base_url)?,
            identity,
        ))
    }

    /// Create a gateway sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base: ApiBase, identity: SessionIdentity) -> Self {
        Self {
            inner: Arc::new(RemoteGatewayInner {
                client,
                base,
                identity,
            }),
        }
    }

    /// The session identity this gateway presents and updates.
    #[must_use]
    pub fn identity(&self) -> &SessionIdentity {
        &self.inner.identity
    }

    fn request(&self, method: Method, route: &str) -> Result<RequestBuilder, SyncError> {
        let url = self.inner.base.endpoint(route)?;
        let builder = self.inner.client.request(method, url);

        Ok(match self.inner.identity.token() {
            Some(token) => builder.header(SESSION_HEADER, token.as_str()),
            None => builder,
        })
    }

    /// Send a request, record the echoed session token, and fail on non-2xx.
    ///
    /// The token is recorded before the status check: error responses carry
    /// it too, and the first contact may well be a failing add.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, SyncError> {
        let response = builder.send().await.inspect_err(|e| {
            tracing::warn!(error = %e, "Storefront request failed");
        })?;

        if let Some(value) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            && let Err(e) = self.inner.identity.observe(value)
        {
            tracing::warn!(error = %e, "Could not persist session token");
        }

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response).await)
        }
    }

    async fn mutate(&self, builder: RequestBuilder) -> Result<MutationAck, SyncError> {
        Ok(self.send(builder).await?.json().await?)
    }
}

/// Map the API's catalog and quantity rejections onto the shared error variants.
fn rejected_add(err: SyncError, artwork_id: ArtworkId) -> SyncError {
    match err {
        SyncError::Api { ref code, .. } if code == "artwork_not_found" => {
            SyncError::ArtworkNotFound(artwork_id)
        }
        // Positivity is checked before sending, so only an overflowing merge remains
        SyncError::Api { ref code, .. } if code == "invalid_quantity" => {
            SyncError::InvalidQuantity(QuantityError::TooLarge { max: Quantity::MAX })
        }
        other => other,
    }
}

#[async_trait]
impl CartSync for RemoteGateway {
    #[instrument(skip_all)]
    async fn load_cart(&self) -> Result<Vec<CartLine>, SyncError> {
        let builder = self.request(Method::GET, "cart")?;
        Ok(self.send(builder).await?.json().await?)
    }

    #[instrument(skip_all, fields(artwork_id = %artwork_id))]
    async fn add_to_cart(
        &self,
        artwork_id: ArtworkId,
        size_option: Option<&str>,
        quantity: Quantity,
    ) -> Result<(), SyncError> {
        let builder = self.request(Method::POST, "cart")?.json(&AddToCartBody {
            artwork_id,
            size_option,
            quantity,
        });

        self.mutate(builder)
            .await
            .map(drop)
            .map_err(|e| rejected_add(e, artwork_id))
    }

    #[instrument(skip_all, fields(line_id = %id))]
    async fn remove_from_cart(&self, id: CartLineId) -> Result<(), SyncError> {
        let builder = self.request(Method::DELETE, &format!("cart/{id}"))?;
        self.mutate(builder).await.map(drop)
    }

    #[instrument(skip_all, fields(line_id = %id, quantity = %quantity))]
    async fn update_quantity(&self, id: CartLineId, quantity: Quantity) -> Result<(), SyncError> {
        let builder = self
            .request(Method::PATCH, &format!("cart/{id}"))?
            .json(&UpdateQuantityBody { quantity });
        self.mutate(builder).await.map(drop)
    }
}

#[async_trait]
impl WishlistSync for RemoteGateway {
    #[instrument(skip_all)]
    async fn load_wishlist(&self) -> Result<Vec<WishlistLine>, SyncError> {
        let builder = self.request(Method::GET, "wishlist")?;
        Ok(self.send(builder).await?.json().await?)
    }

    #[instrument(skip_all, fields(artwork_id = %artwork_id))]
    async fn add_to_wishlist(&self, artwork_id: ArtworkId) -> Result<bool, SyncError> {
        let builder = self
            .request(Method::POST, "wishlist")?
            .json(&AddToWishlistBody { artwork_id });

        self.mutate(builder)
            .await
            .map(|ack| ack.already_exists)
            .map_err(|e| rejected_add(e, artwork_id))
    }

    #[instrument(skip_all, fields(line_id = %id))]
    async fn remove_from_wishlist(&self, id: WishlistLineId) -> Result<(), SyncError> {
        let builder = self.request(Method::DELETE, &format!("wishlist/{id}"))?;
        self.mutate(builder).await.map(drop)
    }
}
