//! Cart and wishlist lines and the rules for merging into them.
//!
//! Every persistence backend (Postgres, the in-memory store, the local
//! client mirror) must behave identically. The in-process backends apply the
//! rules in this module directly; the Postgres backend expresses the same rules
//! as upserts and is tested against them.
//!
//! # Invariants
//!
//! - At most one [`CartLine`] per `(artwork_id, size_option)` within a scope.
//!   Adding an existing key increments its quantity.
//! - At most one [`WishlistLine`] per `artwork_id` within a scope. Adding an
//!   existing artwork is a no-op.
//! - Quantities are always positive; see [`Quantity`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::ArtworkSnapshot;
use crate::types::{ArtworkId, CartLineId, Category, Quantity, QuantityError, WishlistLineId};

/// Normalize a size option: trims whitespace, and treats empty as no size.
#[must_use]
pub fn normalize_size_option(size_option: Option<&str>) -> Option<String> {
    size_option
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

// =============================================================================
// Lines
// =============================================================================

/// One size/quantity selection against a catalog artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub artwork_id: ArtworkId,
    pub size_option: Option<String>,
    pub quantity: Quantity,
    pub title: String,
    pub image_url: String,
    pub price: Decimal,
    pub category: Category,
    pub artist_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    /// Create a line from a catalog snapshot.
    #[must_use]
    pub fn from_snapshot(
        id: CartLineId,
        snapshot: &ArtworkSnapshot,
        size_option: Option<String>,
        quantity: Quantity,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            artwork_id: snapshot.artwork_id,
            size_option,
            quantity,
            title: snapshot.title.clone(),
            image_url: snapshot.image_url.clone(),
            price: snapshot.price,
            category: snapshot.category,
            artist_name: snapshot.artist_name.clone(),
            created_at,
        }
    }

    /// Price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity.get())
    }

    /// Whether this line holds the given `(artwork, size)` key.
    ///
    /// `size_option` must already be normalized.
    #[must_use]
    pub fn has_key(&self, artwork_id: ArtworkId, size_option: Option<&str>) -> bool {
        self.artwork_id == artwork_id && self.size_option.as_deref() == size_option
    }
}

/// One saved artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistLine {
    pub id: WishlistLineId,
    pub artwork_id: ArtworkId,
    pub title: String,
    pub image_url: String,
    pub price: Decimal,
    pub category: Category,
    pub artist_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WishlistLine {
    /// Create a line from a catalog snapshot.
    #[must_use]
    pub fn from_snapshot(
        id: WishlistLineId,
        snapshot: &ArtworkSnapshot,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            artwork_id: snapshot.artwork_id,
            title: snapshot.title.clone(),
            image_url: snapshot.image_url.clone(),
            price: snapshot.price,
            category: snapshot.category,
            artist_name: snapshot.artist_name.clone(),
            created_at,
        }
    }
}

/// What an add did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// A new line was created.
    Created(CartLineId),
    /// An existing line's quantity was incremented.
    Merged(CartLineId),
}

impl LineChange {
    /// The affected line.
    #[must_use]
    pub const fn line_id(self) -> CartLineId {
        match self {
            Self::Created(id) | Self::Merged(id) => id,
        }
    }
}

/// What an add did to the wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistAdd {
    /// A new line was appended.
    Added(WishlistLineId),
    /// The artwork was already saved; nothing changed.
    AlreadySaved(WishlistLineId),
}

impl WishlistAdd {
    /// Whether the artwork was already present.
    #[must_use]
    pub const fn already_exists(self) -> bool {
        matches!(self, Self::AlreadySaved(_))
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The lines of one cart scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLines(Vec<CartLine>);

impl CartLines {
    /// Wrap an existing list of lines.
    #[must_use]
    pub const fn new(lines: Vec<CartLine>) -> Self {
        Self(lines)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CartLine] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<CartLine> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a line by id.
    #[must_use]
    pub fn get(&self, id: CartLineId) -> Option<&CartLine> {
        self.0.iter().find(|line| line.id == id)
    }

    /// Look up the line holding an `(artwork, size)` key.
    #[must_use]
    pub fn find(&self, artwork_id: ArtworkId, size_option: Option<&str>) -> Option<&CartLine> {
        let size = normalize_size_option(size_option);
        self.0
            .iter()
            .find(|line| line.has_key(artwork_id, size.as_deref()))
    }

    /// Add `quantity` of an artwork in a size.
    ///
    /// Merges into the existing line for the key if there is one (the stored
    /// snapshot is kept as-is), otherwise appends a new line with an id from
    /// `mint_id`.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::TooLarge` if merging would overflow the
    /// quantity; the lines are left unchanged.
    pub fn add(
        &mut self,
        snapshot: &ArtworkSnapshot,
        size_option: Option<&str>,
        quantity: Quantity,
        now: DateTime<Utc>,
        mint_id: impl FnOnce() -> CartLineId,
    ) -> Result<LineChange, QuantityError> {
        let size = normalize_size_option(size_option);

        if let Some(line) = self
            .0
            .iter_mut()
            .find(|line| line.has_key(snapshot.artwork_id, size.as_deref()))
        {
            line.quantity = line.quantity.checked_add(quantity)?;
            return Ok(LineChange::Merged(line.id));
        }

        let id = mint_id();
        self.0
            .push(CartLine::from_snapshot(id, snapshot, size, quantity, now));
        Ok(LineChange::Created(id))
    }

    /// Remove a line. Returns whether a line was removed.
    pub fn remove(&mut self, id: CartLineId) -> bool {
        let before = self.0.len();
        self.0.retain(|line| line.id != id);
        self.0.len() != before
    }

    /// Replace a line's quantity. Returns whether the line exists.
    pub fn set_quantity(&mut self, id: CartLineId, quantity: Quantity) -> bool {
        match self.0.iter_mut().find(|line| line.id == id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Highest line id present, or 0 when empty.
    ///
    /// Ids of removed lines are not reflected, so this is not a safe source
    /// for new ids on its own.
    #[must_use]
    pub fn max_id(&self) -> i32 {
        self.0.iter().map(|line| line.id.as_i32()).max().unwrap_or(0)
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.0.iter().map(|line| u64::from(line.quantity.get())).sum()
    }

    /// Sum of price × quantity.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.0.iter().map(CartLine::line_total).sum()
    }

    /// Lines ordered most recently created first.
    #[must_use]
    pub fn newest_first(&self) -> Vec<CartLine> {
        let mut lines = self.0.clone();
        lines.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        lines
    }
}

impl From<Vec<CartLine>> for CartLines {
    fn from(lines: Vec<CartLine>) -> Self {
        Self(lines)
    }
}

/// Order summary shown on the cart page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub item_count: u64,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CartSummary {
    /// Default sales tax rate (8%).
    pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

    /// Compute a summary. Tax is rounded to cents.
    #[must_use]
    pub fn compute(lines: &CartLines, tax_rate: Decimal) -> Self {
        let subtotal = lines.total_price();
        let tax = (subtotal * tax_rate).round_dp(2);
        Self {
            item_count: lines.item_count(),
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

// =============================================================================
// Wishlist
// =============================================================================

/// The lines of one wishlist scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WishlistLines(Vec<WishlistLine>);

impl WishlistLines {
    /// Wrap an existing list of lines.
    #[must_use]
    pub const fn new(lines: Vec<WishlistLine>) -> Self {
        Self(lines)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[WishlistLine] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<WishlistLine> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether an artwork is saved.
    #[must_use]
    pub fn contains(&self, artwork_id: ArtworkId) -> bool {
        self.0.iter().any(|line| line.artwork_id == artwork_id)
    }

    /// Save an artwork unless it is already saved.
    pub fn add(
        &mut self,
        snapshot: &ArtworkSnapshot,
        now: DateTime<Utc>,
        mint_id: impl FnOnce() -> WishlistLineId,
    ) -> WishlistAdd {
        if let Some(line) = self
            .0
            .iter()
            .find(|line| line.artwork_id == snapshot.artwork_id)
        {
            return WishlistAdd::AlreadySaved(line.id);
        }

        let id = mint_id();
        self.0.push(WishlistLine::from_snapshot(id, snapshot, now));
        WishlistAdd::Added(id)
    }

    /// Remove a line by its id. Returns whether a line was removed.
    pub fn remove(&mut self, id: WishlistLineId) -> bool {
        let before = self.0.len();
        self.0.retain(|line| line.id != id);
        self.0.len() != before
    }

    /// Highest line id present, or 0 when empty.
    #[must_use]
    pub fn max_id(&self) -> i32 {
        self.0.iter().map(|line| line.id.as_i32()).max().unwrap_or(0)
    }

    /// Lines ordered most recently created first.
    #[must_use]
    pub fn newest_first(&self) -> Vec<WishlistLine> {
        let mut lines = self.0.clone();
        lines.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        lines
    }
}

impl From<Vec<WishlistLine>> for WishlistLines {
    fn from(lines: Vec<WishlistLine>) -> Self {
        Self(lines)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn snapshot(id: i32, price: i64) -> ArtworkSnapshot {
        ArtworkSnapshot {
            artwork_id: ArtworkId::new(id),
            title: format!("Artwork {id}"),
            image_url: format!("https://img.example/{id}.jpg"),
            price: Decimal::from(price),
            category: Category::WallArt,
            artist_name: Some("James Chen".to_string()),
        }
    }

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn add(lines: &mut CartLines, art: &ArtworkSnapshot, size: Option<&str>, n: i64) -> LineChange {
        let next = CartLineId::new(lines.max_id() + 1);
        lines.add(art, size, qty(n), Utc::now(), || next).unwrap()
    }

    #[test]
    fn test_repeated_add_merges_quantity() {
        let mut lines = CartLines::default();
        let art = snapshot(7, 10);

        let first = add(&mut lines, &art, Some("Medium"), 1);
        let second = add(&mut lines, &art, Some("Medium"), 2);

        assert!(matches!(first, LineChange::Created(_)));
        assert_eq!(second, LineChange::Merged(first.line_id()));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.as_slice()[0].quantity.get(), 3);
    }

    #[test]
    fn test_distinct_sizes_are_distinct_lines() {
        let mut lines = CartLines::default();
        let art = snapshot(7, 10);

        add(&mut lines, &art, Some("Medium"), 1);
        add(&mut lines, &art, Some("Medium"), 2);
        add(&mut lines, &art, Some("Large"), 1);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines.find(ArtworkId::new(7), Some("Large")).unwrap().quantity.get(), 1);
    }

    #[test]
    fn test_missing_size_is_its_own_key() {
        let mut lines = CartLines::default();
        let art = snapshot(3, 10);

        add(&mut lines, &art, None, 1);
        add(&mut lines, &art, Some(""), 1);
        add(&mut lines, &art, Some("  "), 1);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines.as_slice()[0].quantity.get(), 3);
        assert_eq!(lines.as_slice()[0].size_option, None);
    }

    #[test]
    fn test_merge_keeps_original_snapshot() {
        let mut lines = CartLines::default();
        add(&mut lines, &snapshot(7, 10), None, 1);

        let mut repriced = snapshot(7, 99);
        repriced.title = "Renamed".to_string();
        add(&mut lines, &repriced, None, 1);

        let line = &lines.as_slice()[0];
        assert_eq!(line.price, Decimal::from(10));
        assert_eq!(line.title, "Artwork 7");
    }

    #[test]
    fn test_merge_overflow_leaves_line_unchanged() {
        let mut lines = CartLines::default();
        let art = snapshot(1, 1);
        add(&mut lines, &art, None, Quantity::MAX);

        let result = lines.add(&art, None, Quantity::ONE, Utc::now(), || CartLineId::new(99));
        assert!(result.is_err());
        assert_eq!(i64::from(lines.as_slice()[0].quantity), Quantity::MAX);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut lines = CartLines::default();
        add(&mut lines, &snapshot(1, 5), None, 1);

        assert!(!lines.remove(CartLineId::new(404)));
        assert_eq!(lines.len(), 1);
        assert!(lines.remove(CartLineId::new(1)));
        assert!(lines.is_empty());
    }

    #[test]
    fn test_set_quantity_replaces() {
        let mut lines = CartLines::default();
        let id = add(&mut lines, &snapshot(1, 5), None, 4).line_id();

        assert!(lines.set_quantity(id, qty(2)));
        assert_eq!(lines.get(id).unwrap().quantity.get(), 2);
        assert!(!lines.set_quantity(CartLineId::new(404), qty(2)));
    }

    #[test]
    fn test_derived_totals() {
        let mut lines = CartLines::default();
        add(&mut lines, &snapshot(1, 10), None, 2);
        add(&mut lines, &snapshot(2, 5), None, 3);

        assert_eq!(lines.item_count(), 5);
        assert_eq!(lines.total_price(), Decimal::from(35));
    }

    #[test]
    fn test_summary_applies_tax() {
        let mut lines = CartLines::default();
        add(&mut lines, &snapshot(1, 10), None, 2);
        add(&mut lines, &snapshot(2, 5), None, 3);

        let summary = CartSummary::compute(&lines, CartSummary::DEFAULT_TAX_RATE);
        assert_eq!(summary.item_count, 5);
        assert_eq!(summary.subtotal, Decimal::from(35));
        assert_eq!(summary.tax, Decimal::new(280, 2));
        assert_eq!(summary.total, Decimal::new(3780, 2));
    }

    #[test]
    fn test_newest_first() {
        let mut lines = CartLines::default();
        let earlier = Utc::now() - chrono::Duration::minutes(5);
        lines
            .add(&snapshot(1, 1), None, Quantity::ONE, earlier, || CartLineId::new(1))
            .unwrap();
        lines
            .add(&snapshot(2, 1), None, Quantity::ONE, Utc::now(), || CartLineId::new(2))
            .unwrap();

        let ordered = lines.newest_first();
        assert_eq!(ordered[0].id, CartLineId::new(2));
        assert_eq!(ordered[1].id, CartLineId::new(1));
    }

    #[test]
    fn test_wishlist_add_is_idempotent() {
        let mut lines = WishlistLines::default();
        let art = snapshot(4, 20);

        let first = lines.add(&art, Utc::now(), || WishlistLineId::new(1));
        let second = lines.add(&art, Utc::now(), || WishlistLineId::new(2));

        assert_eq!(first, WishlistAdd::Added(WishlistLineId::new(1)));
        assert_eq!(second, WishlistAdd::AlreadySaved(WishlistLineId::new(1)));
        assert!(second.already_exists());
        assert_eq!(lines.len(), 1);
        assert!(lines.contains(ArtworkId::new(4)));
    }

    #[test]
    fn test_wishlist_remove_by_line_id_only() {
        let mut lines = WishlistLines::default();
        lines.add(&snapshot(4, 20), Utc::now(), || WishlistLineId::new(9));

        // Artwork id 4 is not a line id
        assert!(!lines.remove(WishlistLineId::new(4)));
        assert!(lines.remove(WishlistLineId::new(9)));
        assert!(lines.is_empty());
    }

    #[test]
    fn test_max_id_ignores_removed_lines() {
        let mut lines = CartLines::default();
        let first = add(&mut lines, &snapshot(1, 1), None, 1).line_id();
        let second = add(&mut lines, &snapshot(2, 1), None, 1).line_id();
        assert_eq!(lines.max_id(), second.as_i32());

        lines.remove(second);
        assert_eq!(lines.max_id(), first.as_i32());
        assert_eq!(CartLines::default().max_id(), 0);

        let mut saved = WishlistLines::default();
        let _ = saved.add(&snapshot(3, 1), Utc::now(), || WishlistLineId::new(4));
        assert_eq!(saved.max_id(), 4);
    }

    #[test]
    fn test_serde_round_trip_preserves_lines() {
        let mut lines = CartLines::default();
        add(&mut lines, &snapshot(7, 10), Some("Medium"), 3);

        let json = serde_json::to_string(&lines).unwrap();
        let parsed: CartLines = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, lines);
    }
}
