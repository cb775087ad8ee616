//! Wishlist lines in `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use atelier_core::{
    ArtworkId, ArtworkSnapshot, SessionToken, WishlistAdd, WishlistLine, WishlistLineId,
};

use super::catalog::parse_category;
use super::{RepositoryError, WishlistStore};

#[derive(sqlx::FromRow)]
struct WishlistLineRow {
    id: WishlistLineId,
    artwork_id: ArtworkId,
    title: String,
    image_url: String,
    price: Decimal,
    category: String,
    artist_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<WishlistLineRow> for WishlistLine {
    type Error = RepositoryError;

    fn try_from(r: WishlistLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            artwork_id: r.artwork_id,
            title: r.title,
            image_url: r.image_url,
            price: r.price,
            category: parse_category(&r.category)?,
            artist_name: r.artist_name,
            created_at: r.created_at,
        })
    }
}

/// Wishlist lines backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgWishlistStore {
    pool: PgPool,
}

impl PgWishlistStore {
    /// Create a wishlist store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WishlistStore for PgWishlistStore {
    #[instrument(skip(self, session))]
    async fn list(&self, session: &SessionToken) -> Result<Vec<WishlistLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistLineRow>(
            r"
            SELECT id, artwork_id, title, image_url, price, category, artist_name, created_at
            FROM storefront.wishlist_item
            WHERE session_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(session)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WishlistLine::try_from).collect()
    }

    #[instrument(skip(self, session, snapshot), fields(artwork_id = %snapshot.artwork_id))]
    async fn add(
        &self,
        session: &SessionToken,
        snapshot: &ArtworkSnapshot,
    ) -> Result<WishlistAdd, RepositoryError> {
        let inserted: Option<WishlistLineId> = sqlx::query_scalar(
            r"
            INSERT INTO storefront.wishlist_item
                (session_id, artwork_id, title, image_url, price, category, artist_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (session_id, artwork_id) DO NOTHING
            RETURNING id
            ",
        )
        .bind(session)
        .bind(snapshot.artwork_id)
        .bind(&snapshot.title)
        .bind(&snapshot.image_url)
        .bind(snapshot.price)
        .bind(snapshot.category.as_str())
        .bind(&snapshot.artist_name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(id) = inserted {
            return Ok(WishlistAdd::Added(id));
        }

        let existing: Option<WishlistLineId> = sqlx::query_scalar(
            "SELECT id FROM storefront.wishlist_item WHERE session_id = $1 AND artwork_id = $2",
        )
        .bind(session)
        .bind(snapshot.artwork_id)
        .fetch_optional(&self.pool)
        .await?;

        // A concurrent remove between the two statements leaves nothing to report
        existing
            .map(WishlistAdd::AlreadySaved)
            .ok_or_else(|| RepositoryError::Conflict("wishlist line removed during add".into()))
    }

    #[instrument(skip(self, session), fields(line_id = %id))]
    async fn remove(
        &self,
        session: &SessionToken,
        id: WishlistLineId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM storefront.wishlist_item WHERE id = $1 AND session_id = $2")
                .bind(id)
                .bind(session)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_core::Category;

    use super::*;

    #[tokio::test]
    #[ignore = "Requires STOREFRONT_DATABASE_URL with seeded artwork 1"]
    async fn test_pg_add_twice_is_noop() {
        let url = std::env::var("STOREFRONT_DATABASE_URL").unwrap();
        let store = PgWishlistStore::new(PgPool::connect(&url).await.unwrap());
        let session = SessionToken::generate();
        let snapshot = ArtworkSnapshot {
            artwork_id: ArtworkId::new(1),
            title: "Artwork 1".to_string(),
            image_url: "https://img.example/1.jpg".to_string(),
            price: Decimal::from(10),
            category: Category::WallArt,
            artist_name: None,
        };

        let first = store.add(&session, &snapshot).await.unwrap();
        let second = store.add(&session, &snapshot).await.unwrap();
        assert!(!first.already_exists());
        assert_eq!(second, WishlistAdd::AlreadySaved(match first {
            WishlistAdd::Added(id) | WishlistAdd::AlreadySaved(id) => id,
        }));
        assert_eq!(store.list(&session).await.unwrap().len(), 1);
    }
}
