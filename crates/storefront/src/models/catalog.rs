//! Catalog listing parameters.
//!
//! Query strings arrive as raw strings (browsers send empty values for unset
//! form fields) and are validated into an [`ArtworkQuery`] before they reach a
//! store.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use atelier_core::{Category, CategoryError};

/// Default page size for listings and search.
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 100;

/// A listing parameter that could not be understood.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error("invalid {field}: {value}")]
    Price { field: &'static str, value: String },
}

/// Sort order for artwork listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtworkSort {
    /// Most recently created first.
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    /// Featured and trending artworks first, then newest.
    Popular,
}

impl ArtworkSort {
    /// Parse a sort key; unknown keys fall back to [`ArtworkSort::Newest`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "popular" => Self::Popular,
            _ => Self::Newest,
        }
    }
}

/// Raw `GET /api/artworks` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ArtworksParams {
    pub featured: Option<String>,
    pub trending: Option<String>,
    pub bestseller: Option<String>,
    pub category: Option<String>,
    pub orientation: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Validated artwork listing filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkQuery {
    pub featured: bool,
    pub trending: bool,
    pub bestseller: bool,
    pub category: Option<Category>,
    pub orientation: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: ArtworkSort,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ArtworkQuery {
    fn default() -> Self {
        Self {
            featured: false,
            trending: false,
            bestseller: false,
            category: None,
            orientation: None,
            min_price: None,
            max_price: None,
            sort: ArtworkSort::Newest,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl TryFrom<ArtworksParams> for ArtworkQuery {
    type Error = ParamError;

    fn try_from(params: ArtworksParams) -> Result<Self, Self::Error> {
        let category = non_empty(params.category)
            .map(|c| Category::from_str(&c))
            .transpose()?;

        Ok(Self {
            featured: flag(params.featured.as_deref()),
            trending: flag(params.trending.as_deref()),
            bestseller: flag(params.bestseller.as_deref()),
            category,
            orientation: non_empty(params.orientation),
            min_price: parse_price("min_price", params.min_price)?,
            max_price: parse_price("max_price", params.max_price)?,
            sort: params
                .sort
                .as_deref()
                .map(ArtworkSort::parse)
                .unwrap_or_default(),
            limit: clamp_limit(params.limit),
            offset: params.offset.unwrap_or(0).max(0),
        })
    }
}

/// Raw `GET /api/search` query string.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

/// Apply the default page size and clamp to `1..=MAX_LIMIT`.
#[must_use]
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

fn flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("1" | "true"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parse_price(field: &'static str, value: Option<String>) -> Result<Option<Decimal>, ParamError> {
    non_empty(value)
        .map(|v| Decimal::from_str(&v).map_err(|_| ParamError::Price { field, value: v }))
        .transpose()
}
