//! Seed the catalog from a YAML file.
//!
//! Rows are upserted by id, so re-running with an edited file updates the
//! catalog in place. Existing cart and wishlist lines keep their snapshots.

use std::path::Path;

use chrono::Utc;
use sqlx::{Postgres, Transaction};
use tracing::{error, info};

use atelier_core::{Artist, Artwork};
use atelier_storefront::db;

use super::migrate::database_url;
use crate::catalog_file::{CatalogFile, CatalogFileError};

/// Rows written by a seeding run.
#[derive(Debug, Default)]
pub struct SeedResult {
    pub artists: u64,
    pub artworks: u64,
}

/// Seed the catalog from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the catalog file
/// * `clear_existing` - If true, delete the whole catalog first (cart and
///   wishlist lines referencing it go too)
///
/// # Errors
///
/// Returns an error if the file is invalid, the environment is incomplete, or
/// database operations fail.
pub async fn catalog(
    file_path: &Path,
    clear_existing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(path = %file_path.display(), "Loading catalog from file");

    // Read and validate before connecting to the database
    let file = match CatalogFile::load(file_path).await {
        Ok(file) => file,
        Err(CatalogFileError::Invalid(errors)) => {
            error!("Catalog validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        artists = file.artists.len(),
        artworks = file.artworks.len(),
        "Catalog validated"
    );

    let pool = db::create_pool(&database_url()?).await?;
    info!("Connected to database");

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    if clear_existing {
        sqlx::query("TRUNCATE storefront.artist, storefront.artwork RESTART IDENTITY CASCADE")
            .execute(&mut *tx)
            .await?;
        info!("Cleared existing catalog");
    }

    let mut result = SeedResult::default();
    for artist in file.artists(now) {
        result.artists += upsert_artist(&mut tx, &artist).await?;
    }
    for artwork in file.artworks(now) {
        result.artworks += upsert_artwork(&mut tx, &artwork).await?;
    }

    // Explicit ids bypass the sequences; move them past the highest id in use
    for table in ["artist", "artwork"] {
        sqlx::query(&format!(
            "SELECT setval(pg_get_serial_sequence('storefront.{table}', 'id'), \
             GREATEST((SELECT MAX(id) FROM storefront.{table}), 1))"
        ))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Artists written: {}", result.artists);
    info!("  Artworks written: {}", result.artworks);

    Ok(())
}

async fn upsert_artist(
    tx: &mut Transaction<'_, Postgres>,
    artist: &Artist,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r"
        INSERT INTO storefront.artist (id, name, bio, profile_image_url, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        ON CONFLICT (id) DO UPDATE
        SET name = EXCLUDED.name,
            bio = EXCLUDED.bio,
            profile_image_url = EXCLUDED.profile_image_url,
            updated_at = EXCLUDED.updated_at
        ",
    )
    .bind(artist.id)
    .bind(&artist.name)
    .bind(&artist.bio)
    .bind(&artist.profile_image_url)
    .bind(artist.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

async fn upsert_artwork(
    tx: &mut Transaction<'_, Postgres>,
    artwork: &Artwork,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r"
        INSERT INTO storefront.artwork
            (id, title, artist_id, category, description, image_url, video_url, price,
             orientation, width, height, is_featured, is_trending, is_bestseller,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
        ON CONFLICT (id) DO UPDATE
        SET title = EXCLUDED.title,
            artist_id = EXCLUDED.artist_id,
            category = EXCLUDED.category,
            description = EXCLUDED.description,
            image_url = EXCLUDED.image_url,
            video_url = EXCLUDED.video_url,
            price = EXCLUDED.price,
            orientation = EXCLUDED.orientation,
            width = EXCLUDED.width,
            height = EXCLUDED.height,
            is_featured = EXCLUDED.is_featured,
            is_trending = EXCLUDED.is_trending,
            is_bestseller = EXCLUDED.is_bestseller,
            updated_at = EXCLUDED.updated_at
        ",
    )
    .bind(artwork.id)
    .bind(&artwork.title)
    .bind(artwork.artist_id)
    .bind(artwork.category.as_str())
    .bind(&artwork.description)
    .bind(&artwork.image_url)
    .bind(&artwork.video_url)
    .bind(artwork.price)
    .bind(&artwork.orientation)
    .bind(artwork.width)
    .bind(artwork.height)
    .bind(artwork.is_featured)
    .bind(artwork.is_trending)
    .bind(artwork.is_bestseller)
    .bind(artwork.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}
