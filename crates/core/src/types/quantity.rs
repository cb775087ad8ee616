//! Positive line quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantity was zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// Quantity does not fit the storage column.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Maximum allowed quantity.
        max: i64,
    },
}

/// A cart line quantity: always a positive integer.
///
/// Stored as `INTEGER` in Postgres, so the upper bound is `i32::MAX`.
///
/// ```
/// use atelier_core::Quantity;
///
/// assert_eq!(Quantity::new(3).unwrap().get(), 3);
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(u32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(1);

    /// Largest representable quantity.
    pub const MAX: i64 = i32::MAX as i64;

    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` for values below 1 and
    /// `QuantityError::TooLarge` for values above `i32::MAX`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::NotPositive(value));
        }
        if value > Self::MAX {
            return Err(QuantityError::TooLarge { max: Self::MAX });
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge { max: Self::MAX })
    }

    /// Returns the quantity as a `u32`.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the quantity as an `i32` for database binding.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        // Bounded by MAX at construction
        i32::try_from(self.0).unwrap_or(i32::MAX)
    }

    /// Add two quantities, failing if the sum leaves the valid range.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::TooLarge` on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, QuantityError> {
        Self::new(i64::from(self.0) + i64::from(other.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(quantity: Quantity) -> Self {
        Self::from(quantity.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::new(-1), Err(QuantityError::NotPositive(-1)));
    }

    #[test]
    fn test_rejects_values_beyond_column() {
        assert!(matches!(
            Quantity::new(i64::from(i32::MAX) + 1),
            Err(QuantityError::TooLarge { .. })
        ));
        assert!(Quantity::new(i64::from(i32::MAX)).is_ok());
    }

    #[test]
    fn test_checked_add() {
        let two = Quantity::new(2).unwrap();
        let three = Quantity::new(3).unwrap();
        assert_eq!(two.checked_add(three).unwrap().get(), 5);

        let max = Quantity::new(Quantity::MAX).unwrap();
        assert!(max.checked_add(Quantity::ONE).is_err());
    }

    #[test]
    fn test_serde() {
        let q: Quantity = serde_json::from_str("4").unwrap();
        assert_eq!(q.get(), 4);
        assert_eq!(serde_json::to_string(&q).unwrap(), "4");
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }
}
