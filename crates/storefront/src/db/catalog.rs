//! Catalog queries against `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use atelier_core::{
    Artist, ArtistId, Artwork, ArtworkDetail, ArtworkId, Category, CategoryCount,
};

use super::{CatalogStore, RepositoryError};
use crate::models::{ArtworkQuery, ArtworkSort};

/// Artwork columns joined with the artist name.
macro_rules! artwork_select {
    () => {
        r"
        SELECT a.id, a.title, a.artist_id, ar.name AS artist_name, a.category,
               a.description, a.image_url, a.video_url, a.price, a.orientation,
               a.width, a.height, a.is_featured, a.is_trending, a.is_bestseller,
               a.created_at, a.updated_at
        FROM storefront.artwork a
        LEFT JOIN storefront.artist ar ON ar.id = a.artist_id
        "
    };
}

/// Parse a stored category name.
pub(super) fn parse_category(value: &str) -> Result<Category, RepositoryError> {
    value
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid category in database: {e}")))
}

// =============================================================================
// Rows
// =============================================================================

#[derive(sqlx::FromRow)]
struct ArtworkRow {
    id: ArtworkId,
    title: String,
    artist_id: ArtistId,
    artist_name: Option<String>,
    category: String,
    description: Option<String>,
    image_url: String,
    video_url: Option<String>,
    price: Decimal,
    orientation: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    is_featured: bool,
    is_trending: bool,
    is_bestseller: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ArtworkRow> for Artwork {
    type Error = RepositoryError;

    fn try_from(r: ArtworkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            title: r.title,
            artist_id: r.artist_id,
            artist_name: r.artist_name,
            category: parse_category(&r.category)?,
            description: r.description,
            image_url: r.image_url,
            video_url: r.video_url,
            price: r.price,
            orientation: r.orientation,
            width: r.width,
            height: r.height,
            is_featured: r.is_featured,
            is_trending: r.is_trending,
            is_bestseller: r.is_bestseller,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ArtworkDetailRow {
    #[sqlx(flatten)]
    artwork: ArtworkRow,
    artist_bio: Option<String>,
    artist_profile_image_url: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ArtistRow {
    id: ArtistId,
    name: String,
    bio: Option<String>,
    profile_image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ArtistRow> for Artist {
    fn from(r: ArtistRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            bio: r.bio,
            profile_image_url: r.profile_image_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryCountRow {
    category: String,
    count: i64,
}

fn into_artworks(rows: Vec<ArtworkRow>) -> Result<Vec<Artwork>, RepositoryError> {
    rows.into_iter().map(Artwork::try_from).collect()
}

/// Escape `LIKE` wildcards so the term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

const fn order_by(sort: ArtworkSort) -> &'static str {
    match sort {
        ArtworkSort::Newest => " ORDER BY a.created_at DESC, a.id DESC",
        ArtworkSort::PriceLow => " ORDER BY a.price ASC, a.id ASC",
        ArtworkSort::PriceHigh => " ORDER BY a.price DESC, a.id ASC",
        ArtworkSort::Popular => {
            " ORDER BY (a.is_featured::int + a.is_trending::int) DESC, a.created_at DESC, a.id DESC"
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Catalog backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Create a catalog store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    #[instrument(skip(self))]
    async fn list_artworks(&self, query: &ArtworkQuery) -> Result<Vec<Artwork>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(artwork_select!());
        qb.push(" WHERE TRUE");

        if query.featured {
            qb.push(" AND a.is_featured");
        }
        if query.trending {
            qb.push(" AND a.is_trending");
        }
        if query.bestseller {
            qb.push(" AND a.is_bestseller");
        }
        if let Some(category) = query.category {
            qb.push(" AND a.category = ").push_bind(category.as_str());
        }
        if let Some(orientation) = &query.orientation {
            qb.push(" AND a.orientation = ").push_bind(orientation.clone());
        }
        if let Some(min) = query.min_price {
            qb.push(" AND a.price >= ").push_bind(min);
        }
        if let Some(max) = query.max_price {
            qb.push(" AND a.price <= ").push_bind(max);
        }

        qb.push(order_by(query.sort));
        qb.push(" LIMIT ").push_bind(query.limit);
        qb.push(" OFFSET ").push_bind(query.offset);

        let rows: Vec<ArtworkRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        into_artworks(rows)
    }

    #[instrument(skip(self), fields(artwork_id = %id))]
    async fn get_artwork(&self, id: ArtworkId) -> Result<Option<ArtworkDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, ArtworkDetailRow>(
            r"
            SELECT a.id, a.title, a.artist_id, ar.name AS artist_name, a.category,
                   a.description, a.image_url, a.video_url, a.price, a.orientation,
                   a.width, a.height, a.is_featured, a.is_trending, a.is_bestseller,
                   a.created_at, a.updated_at,
                   ar.bio AS artist_bio, ar.profile_image_url AS artist_profile_image_url
            FROM storefront.artwork a
            LEFT JOIN storefront.artist ar ON ar.id = a.artist_id
            WHERE a.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(ArtworkDetail {
                artwork: Artwork::try_from(r.artwork)?,
                artist_bio: r.artist_bio,
                artist_profile_image_url: r.artist_profile_image_url,
            })
        })
        .transpose()
    }

    #[instrument(skip(self), fields(artwork_id = %id))]
    async fn related_artworks(
        &self,
        id: ArtworkId,
        limit: i64,
    ) -> Result<Option<Vec<Artwork>>, RepositoryError> {
        let category: Option<String> =
            sqlx::query_scalar("SELECT category FROM storefront.artwork WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(category) = category else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, ArtworkRow>(concat!(
            artwork_select!(),
            "WHERE a.category = $1 AND a.id <> $2 ORDER BY RANDOM() LIMIT $3"
        ))
        .bind(category)
        .bind(id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        into_artworks(rows).map(Some)
    }

    #[instrument(skip(self))]
    async fn list_artists(&self) -> Result<Vec<Artist>, RepositoryError> {
        let rows = sqlx::query_as::<_, ArtistRow>(
            r"
            SELECT id, name, bio, profile_image_url, created_at, updated_at
            FROM storefront.artist
            ORDER BY name
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Artist::from).collect())
    }

    #[instrument(skip(self), fields(artist_id = %id))]
    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, RepositoryError> {
        let row = sqlx::query_as::<_, ArtistRow>(
            r"
            SELECT id, name, bio, profile_image_url, created_at, updated_at
            FROM storefront.artist
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Artist::from))
    }

    #[instrument(skip(self), fields(artist_id = %id))]
    async fn artworks_by_artist(&self, id: ArtistId) -> Result<Vec<Artwork>, RepositoryError> {
        let rows = sqlx::query_as::<_, ArtworkRow>(concat!(
            artwork_select!(),
            "WHERE a.artist_id = $1 ORDER BY a.created_at DESC, a.id DESC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        into_artworks(rows)
    }

    #[instrument(skip(self))]
    async fn category_stats(&self) -> Result<Vec<CategoryCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryCountRow>(
            r"
            SELECT category, COUNT(*) AS count
            FROM storefront.artwork
            GROUP BY category
            ORDER BY category
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(CategoryCount {
                    category: parse_category(&r.category)?,
                    count: r.count,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn search(&self, term: &str, limit: i64) -> Result<Vec<Artwork>, RepositoryError> {
        let rows = sqlx::query_as::<_, ArtworkRow>(concat!(
            artwork_select!(),
            r"WHERE a.title ILIKE $1
                 OR a.description ILIKE $1
                 OR ar.name ILIKE $1
                 OR a.category ILIKE $1
            ORDER BY a.is_featured DESC, a.created_at DESC, a.id DESC
            LIMIT $2"
        ))
        .bind(like_pattern(term))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        into_artworks(rows)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ocean"), "%ocean%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_parse_category_reports_corruption() {
        assert_eq!(parse_category("WallArt").unwrap(), Category::WallArt);
        assert!(matches!(
            parse_category("Sculpture"),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[tokio::test]
    #[ignore = "Requires STOREFRONT_DATABASE_URL with migrated schema"]
    async fn test_pg_list_and_search() {
        let url = std::env::var("STOREFRONT_DATABASE_URL").unwrap();
        let pool = PgPool::connect(&url).await.unwrap();
        let catalog = PgCatalog::new(pool);

        catalog.ping().await.unwrap();
        let artworks = catalog.list_artworks(&ArtworkQuery::default()).await.unwrap();
        assert!(artworks.len() <= 20);
        let hits = catalog.search("%", 5).await.unwrap();
        assert!(hits.len() <= 5);
    }
}
