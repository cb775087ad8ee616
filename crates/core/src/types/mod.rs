//! Core types for Atelier.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod id;
pub mod quantity;
pub mod session;

pub use category::{Category, CategoryError};
pub use id::*;
pub use quantity::{Quantity, QuantityError};
pub use session::{SessionToken, SessionTokenError};
