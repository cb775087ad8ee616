//! Cart and wishlist request and response bodies.

use serde::{Deserialize, Serialize};

use atelier_core::ArtworkId;

/// `POST /api/cart` body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub artwork_id: Option<ArtworkId>,
    #[serde(default)]
    pub size_option: Option<String>,
    /// Raw quantity; validated by the handler so a non-positive value is
    /// reported as `invalid_quantity` rather than a parse failure.
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// `PATCH /api/cart/{id}` body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// `POST /api/wishlist` body.
#[derive(Debug, Deserialize)]
pub struct AddToWishlistRequest {
    pub artwork_id: Option<ArtworkId>,
}

/// Body returned by every successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub already_exists: bool,
}

impl MutationResponse {
    pub const OK: Self = Self {
        success: true,
        already_exists: false,
    };

    pub const ALREADY_EXISTS: Self = Self {
        success: true,
        already_exists: true,
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_omitted_when_false() {
        assert_eq!(
            serde_json::to_string(&MutationResponse::OK).unwrap(),
            r#"{"success":true}"#
        );
        assert_eq!(
            serde_json::to_string(&MutationResponse::ALREADY_EXISTS).unwrap(),
            r#"{"success":true,"already_exists":true}"#
        );
    }

    #[test]
    fn test_add_to_cart_defaults() {
        let body: AddToCartRequest = serde_json::from_str(r#"{"artwork_id": 7}"#).unwrap();
        assert_eq!(body.artwork_id, Some(ArtworkId::new(7)));
        assert_eq!(body.size_option, None);
        assert_eq!(body.quantity, None);
    }
}
