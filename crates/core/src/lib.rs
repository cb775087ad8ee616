//! Atelier Core - Shared types library.
//!
//! This crate provides common types used across all Atelier components:
//! - `storefront` - Catalog and cart/wishlist HTTP API
//! - `client` - Cart and wishlist aggregates with remote and local sync gateways
//! - `cli` - Command-line tools for migrations, seeding and cart management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The line merge rules live here so that every
//! persistence backend applies exactly the same semantics.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, session tokens, quantities and categories
//! - [`catalog`] - Artist and artwork records as served by the catalog API
//! - [`basket`] - Cart and wishlist lines plus their merge rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod basket;
pub mod catalog;
pub mod types;

pub use basket::{
    CartLine, CartLines, CartSummary, LineChange, WishlistAdd, WishlistLine, WishlistLines,
    normalize_size_option,
};
pub use catalog::{Artist, Artwork, ArtworkDetail, ArtworkSnapshot, CategoryCount};
pub use types::*;
