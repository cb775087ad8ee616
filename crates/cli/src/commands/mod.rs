//! CLI command implementations.

pub mod basket;
pub mod migrate;
pub mod seed;
