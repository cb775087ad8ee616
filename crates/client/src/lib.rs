//! Atelier Client - cart and wishlist state for storefront front ends.
//!
//! # Architecture
//!
//! - [`Cart`] and [`Wishlist`] are the aggregates a UI talks to. They cache
//!   the last known lines and delegate persistence to a gateway.
//! - A gateway implements [`CartSync`] and/or [`WishlistSync`]:
//!   [`RemoteGateway`] calls the storefront API, [`LocalGateway`] keeps lines
//!   in a [`KeyValueStore`] and merges them with the shared core rules.
//! - [`SessionIdentity`] remembers the token the storefront issues and
//!   persists it between runs.
//!
//! The backend is picked when wiring the aggregates, never per call:
//!
//! ```rust,ignore
//! let identity = SessionIdentity::load(store.clone());
//! let gateway = RemoteGateway::new("http://127.0.0.1:8787", identity)?;
//! let cart = Cart::new(gateway.clone());
//! let wishlist = Wishlist::new(gateway);
//!
//! cart.add(ArtworkId::new(7), Some("Medium"), 1).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod session;
pub mod storage;
pub mod wishlist;

pub use api::ApiBase;
pub use cart::Cart;
pub use catalog::{CatalogSource, HttpCatalog, StaticCatalog};
pub use error::{StoreError, SyncError};
pub use gateway::{CartSync, LocalGateway, RemoteGateway, WishlistSync};
pub use session::{SESSION_HEADER, SESSION_KEY, SessionIdentity};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use wishlist::Wishlist;
