//! YAML catalog files used by `seed` and by local mode.
//!
//! ```yaml
//! artists:
//!   - id: 1
//!     name: Sophia Martinez
//!     bio: Contemporary abstract painter.
//! artworks:
//!   - id: 1
//!     artist: 1
//!     title: Ocean Whisper
//!     category: AbstractArt
//!     image_url: https://img.example/ocean.jpg
//!     price: "249.00"
//!     featured: true
//! ```
//!
//! Ids are explicit so a seeded database and a local-mode catalog built from
//! the same file agree on every artwork id.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use atelier_core::{Artist, ArtistId, Artwork, ArtworkId, Category};

/// A catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub artists: Vec<ArtistEntry>,
    #[serde(default)]
    pub artworks: Vec<ArtworkEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistEntry {
    pub id: i32,
    pub name: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtworkEntry {
    pub id: i32,
    /// Id of the artist entry.
    pub artist: i32,
    pub title: String,
    pub category: Category,
    pub description: Option<String>,
    pub image_url: String,
    pub video_url: Option<String>,
    pub price: Decimal,
    pub orientation: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub trending: bool,
    #[serde(default)]
    pub bestseller: bool,
}

/// Errors loading a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogFileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("{} validation errors found", .0.len())]
    Invalid(Vec<String>),
}

impl CatalogFile {
    /// Read, parse and validate a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// [`CatalogFile::validate`].
    pub async fn load(path: &Path) -> Result<Self, CatalogFileError> {
        let display = path.display().to_string();
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CatalogFileError::Read {
                    path: display.clone(),
                    source,
                })?;

        let file: Self = serde_yaml::from_str(&content).map_err(|source| {
            CatalogFileError::Parse {
                path: display,
                source,
            }
        })?;

        let errors = file.validate();
        if errors.is_empty() {
            Ok(file)
        } else {
            Err(CatalogFileError::Invalid(errors))
        }
    }

    /// Check ids, references and prices. Returns one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut artist_ids = HashSet::new();
        for artist in &self.artists {
            if artist.id < 1 {
                errors.push(format!("artist {:?}: id must be positive", artist.name));
            }
            if !artist_ids.insert(artist.id) {
                errors.push(format!("artist id {} is used more than once", artist.id));
            }
            if artist.name.trim().is_empty() {
                errors.push(format!("artist {}: name is empty", artist.id));
            }
        }

        let mut artwork_ids = HashSet::new();
        for artwork in &self.artworks {
            if artwork.id < 1 {
                errors.push(format!("artwork {:?}: id must be positive", artwork.title));
            }
            if !artwork_ids.insert(artwork.id) {
                errors.push(format!("artwork id {} is used more than once", artwork.id));
            }
            if !artist_ids.contains(&artwork.artist) {
                errors.push(format!(
                    "artwork {}: unknown artist {}",
                    artwork.id, artwork.artist
                ));
            }
            if artwork.title.trim().is_empty() {
                errors.push(format!("artwork {}: title is empty", artwork.id));
            }
            if artwork.price.is_sign_negative() {
                errors.push(format!("artwork {}: price is negative", artwork.id));
            }
        }

        errors
    }

    /// Artist records, timestamped `now`.
    #[must_use]
    pub fn artists(&self, now: DateTime<Utc>) -> Vec<Artist> {
        self.artists
            .iter()
            .map(|a| Artist {
                id: ArtistId::new(a.id),
                name: a.name.clone(),
                bio: a.bio.clone(),
                profile_image_url: a.profile_image_url.clone(),
                created_at: now,
                updated_at: now,
            })
            .collect()
    }

    /// Artwork records joined with their artist's name, timestamped `now`.
    #[must_use]
    pub fn artworks(&self, now: DateTime<Utc>) -> Vec<Artwork> {
        let names: HashMap<i32, &str> = self
            .artists
            .iter()
            .map(|a| (a.id, a.name.as_str()))
            .collect();

        self.artworks
            .iter()
            .map(|w| Artwork {
                id: ArtworkId::new(w.id),
                title: w.title.clone(),
                artist_id: ArtistId::new(w.artist),
                artist_name: names.get(&w.artist).map(|n| (*n).to_string()),
                category: w.category,
                description: w.description.clone(),
                image_url: w.image_url.clone(),
                video_url: w.video_url.clone(),
                price: w.price,
                orientation: w.orientation.clone(),
                width: w.width,
                height: w.height,
                is_featured: w.featured,
                is_trending: w.trending,
                is_bestseller: w.bestseller,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
artists:
  - id: 1
    name: Sophia Martinez
    bio: Contemporary abstract painter.
  - id: 2
    name: James Chen
artworks:
  - id: 10
    artist: 1
    title: Ocean Whisper
    category: AbstractArt
    image_url: https://img.example/ocean.jpg
    price: "249.00"
    featured: true
  - id: 11
    artist: 2
    title: Mud Mirror
    category: LippanArt
    image_url: https://img.example/mirror.jpg
    price: 120
    width: 24
    height: 24
"#;

    #[test]
    fn test_parse_sample() {
        let file: CatalogFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert!(file.validate().is_empty());

        let artworks = file.artworks(Utc::now());
        assert_eq!(artworks.len(), 2);
        assert_eq!(artworks[0].artist_name.as_deref(), Some("Sophia Martinez"));
        assert_eq!(artworks[0].price, Decimal::new(24900, 2));
        assert!(artworks[0].is_featured);
        assert_eq!(artworks[1].category, Category::LippanArt);
        assert_eq!(artworks[1].price, Decimal::from(120));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut file: CatalogFile = serde_yaml::from_str(SAMPLE).unwrap();
        file.artworks[1].artist = 9;
        file.artworks[1].id = 10;
        file.artworks[0].price = Decimal::from(-1);

        let errors = file.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
    }

    #[test]
    fn test_unknown_category_fails_to_parse() {
        let yaml = SAMPLE.replace("LippanArt", "Sculpture");
        assert!(serde_yaml::from_str::<CatalogFile>(&yaml).is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = CatalogFile::load(Path::new("/nonexistent/catalog.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogFileError::Read { .. }));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let file = CatalogFile::load(&path).await.unwrap();
        assert_eq!(file.artists.len(), 2);
    }
}
