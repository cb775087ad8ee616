//! Cart lines in `PostgreSQL`.
//!
//! The `(session_id, artwork_id, COALESCE(size_option, ''))` unique index makes
//! the add path a single upsert, so two concurrent adds for a new key cannot
//! create duplicate lines.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use atelier_core::{
    ArtworkId, ArtworkSnapshot, CartLine, CartLineId, LineChange, Quantity, QuantityError,
    SessionToken, normalize_size_option,
};

use super::catalog::parse_category;
use super::{CartStore, RepositoryError};

/// `numeric_value_out_of_range`: a merged quantity overflowed the column.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: CartLineId,
    artwork_id: ArtworkId,
    size_option: Option<String>,
    quantity: i32,
    title: String,
    image_url: String,
    price: Decimal,
    category: String,
    artist_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(r: CartLineRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(i64::from(r.quantity)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid quantity in database: {e}"))
        })?;

        Ok(Self {
            id: r.id,
            artwork_id: r.artwork_id,
            size_option: r.size_option,
            quantity,
            title: r.title,
            image_url: r.image_url,
            price: r.price,
            category: parse_category(&r.category)?,
            artist_name: r.artist_name,
            created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UpsertRow {
    id: CartLineId,
    inserted: bool,
}

fn map_overflow(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) => {
            RepositoryError::InvalidQuantity(QuantityError::TooLarge { max: Quantity::MAX })
        }
        _ => RepositoryError::Database(err),
    }
}

/// Cart lines backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    /// Create a cart store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    #[instrument(skip(self, session))]
    async fn list(&self, session: &SessionToken) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, artwork_id, size_option, quantity, title, image_url, price,
                   category, artist_name, created_at
            FROM storefront.cart_item
            WHERE session_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(session)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    #[instrument(skip(self, session, snapshot), fields(artwork_id = %snapshot.artwork_id))]
    async fn add(
        &self,
        session: &SessionToken,
        snapshot: &ArtworkSnapshot,
        size_option: Option<&str>,
        quantity: Quantity,
    ) -> Result<LineChange, RepositoryError> {
        // On conflict only the quantity changes; the stored snapshot is kept
        let row = sqlx::query_as::<_, UpsertRow>(
            r"
            INSERT INTO storefront.cart_item
                (session_id, artwork_id, size_option, quantity,
                 title, image_url, price, category, artist_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (session_id, artwork_id, (COALESCE(size_option, '')))
            DO UPDATE SET quantity = storefront.cart_item.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            RETURNING id, (xmax = 0) AS inserted
            ",
        )
        .bind(session)
        .bind(snapshot.artwork_id)
        .bind(normalize_size_option(size_option))
        .bind(quantity.as_i32())
        .bind(&snapshot.title)
        .bind(&snapshot.image_url)
        .bind(snapshot.price)
        .bind(snapshot.category.as_str())
        .bind(&snapshot.artist_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_overflow)?;

        Ok(if row.inserted {
            LineChange::Created(row.id)
        } else {
            LineChange::Merged(row.id)
        })
    }

    #[instrument(skip(self, session), fields(line_id = %id))]
    async fn remove(
        &self,
        session: &SessionToken,
        id: CartLineId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM storefront.cart_item WHERE id = $1 AND session_id = $2")
                .bind(id)
                .bind(session)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip_all, fields(line_id = %id, quantity = %quantity))]
    async fn set_quantity(
        &self,
        session: &SessionToken,
        id: CartLineId,
        quantity: Quantity,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.cart_item
            SET quantity = $1, updated_at = NOW()
            WHERE id = $2 AND session_id = $3
            ",
        )
        .bind(quantity.as_i32())
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

    fn snapshot(id: i32) -> ArtworkSnapshot {
        ArtworkSnapshot {
            artwork_id: ArtworkId::new(id),
            title: format!("Artwork {id}"),
            image_url: format!("https://img.example/{id}.jpg"),
            price: Decimal::from(10),
            category: Category::WallArt,
            artist_name: None,
        }
    }

    async fn store() -> PgCartStore {
        let url = std::env::var("STOREFRONT_DATABASE_URL").unwrap();
        PgCartStore::new(PgPool::connect(&url).await.unwrap())
    }

    #[tokio::test]
    #[ignore = "Requires STOREFRONT_DATABASE_URL with seeded artwork 1"]
    async fn test_pg_upsert_merges() {
        let store = store().await;
        let session = SessionToken::generate();

        let first = store
            .add(&session, &snapshot(1), Some(" Medium "), Quantity::ONE)
            .await
            .unwrap();
        let second = store
            .add(&session, &snapshot(1), Some("Medium"), Quantity::new(2).unwrap())
            .await
            .unwrap();

        assert!(matches!(first, LineChange::Created(_)));
        assert_eq!(second, LineChange::Merged(first.line_id()));

        let lines = store.list(&session).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity.get(), 3);
        assert_eq!(lines[0].size_option.as_deref(), Some("Medium"));
    }

    #[tokio::test]
    #[ignore = "Requires STOREFRONT_DATABASE_URL with seeded artwork 1"]
    async fn test_pg_concurrent_first_adds_create_one_line() {
        let store = store().await;
        let session = SessionToken::generate();

        let mut set = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let store = store.clone();
            let session = session.clone();
            set.spawn(async move { store.add(&session, &snapshot(1), None, Quantity::ONE).await });
        }
        while let Some(result) = set.join_next().await {
            result.unwrap().unwrap();
        }

        let lines = store.list(&session).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity.get(), 8);
    }

    #[tokio::test]
    #[ignore = "Requires STOREFRONT_DATABASE_URL with seeded artwork 1"]
    async fn test_pg_other_session_cannot_remove() {
        let store = store().await;
        let owner = SessionToken::generate();
        let other = SessionToken::generate();

        let change = store
            .add(&owner, &snapshot(1), None, Quantity::ONE)
            .await
            .unwrap();
        assert!(!store.remove(&other, change.line_id()).await.unwrap());
        assert!(store.remove(&owner, change.line_id()).await.unwrap());
    }
}
