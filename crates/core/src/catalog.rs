//! Catalog records served by the read-only catalog API.
//!
//! The storefront maps database rows into these types; the client deserializes
//! them from JSON. Field names follow the JSON wire format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ArtistId, ArtworkId, Category};

/// An artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An artwork joined with its artist's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: ArtworkId,
    pub title: String,
    pub artist_id: ArtistId,
    pub artist_name: Option<String>,
    pub category: Category,
    pub description: Option<String>,
    pub image_url: String,
    pub video_url: Option<String>,
    pub price: Decimal,
    pub orientation: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub is_featured: bool,
    pub is_trending: bool,
    pub is_bestseller: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An artwork with the artist fields shown on the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkDetail {
    #[serde(flatten)]
    pub artwork: Artwork,
    pub artist_bio: Option<String>,
    pub artist_profile_image_url: Option<String>,
}

/// Number of artworks in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: i64,
}

/// Display fields copied from the catalog into a cart or wishlist line.
///
/// Captured once when the line is created and never refreshed, so later
/// catalog edits (price, title) do not leak into existing lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkSnapshot {
    pub artwork_id: ArtworkId,
    pub title: String,
    pub image_url: String,
    pub price: Decimal,
    pub category: Category,
    pub artist_name: Option<String>,
}

impl From<&Artwork> for ArtworkSnapshot {
    fn from(artwork: &Artwork) -> Self {
        Self {
            artwork_id: artwork.id,
            title: artwork.title.clone(),
            image_url: artwork.image_url.clone(),
            price: artwork.price,
            category: artwork.category,
            artist_name: artwork.artist_name.clone(),
        }
    }
}

impl From<&ArtworkDetail> for ArtworkSnapshot {
    fn from(detail: &ArtworkDetail) -> Self {
        Self::from(&detail.artwork)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn artwork() -> Artwork {
        Artwork {
            id: ArtworkId::new(7),
            title: "Desert Bloom".to_string(),
            artist_id: ArtistId::new(1),
            artist_name: Some("Sophia Martinez".to_string()),
            category: Category::AbstractArt,
            description: None,
            image_url: "https://img.example/7.jpg".to_string(),
            video_url: None,
            price: Decimal::new(12_000, 2),
            orientation: Some("Portrait".to_string()),
            width: Some(18),
            height: Some(24),
            is_featured: true,
            is_trending: false,
            is_bestseller: false,
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
            updated_at: DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    #[test]
    fn test_snapshot_copies_display_fields() {
        let snapshot = ArtworkSnapshot::from(&artwork());
        assert_eq!(snapshot.artwork_id, ArtworkId::new(7));
        assert_eq!(snapshot.title, "Desert Bloom");
        assert_eq!(snapshot.price, Decimal::new(12_000, 2));
        assert_eq!(snapshot.artist_name.as_deref(), Some("Sophia Martinez"));
    }

    #[test]
    fn test_detail_flattens_artwork_fields() {
        let detail = ArtworkDetail {
            artwork: artwork(),
            artist_bio: Some("Abstract expressionist".to_string()),
            artist_profile_image_url: None,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["title"], "Desert Bloom");
        assert_eq!(json["artist_bio"], "Abstract expressionist");

        let parsed: ArtworkDetail = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, detail);
    }
}
