//! Request models for the storefront API.

pub mod basket;
pub mod catalog;

pub use basket::{AddToCartRequest, AddToWishlistRequest, MutationResponse, UpdateQuantityRequest};
pub use catalog::{ArtworkQuery, ArtworkSort, ArtworksParams, SearchParams};
