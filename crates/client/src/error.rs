//! Client error types.

use std::path::PathBuf;

use thiserror::Error;

use atelier_core::{ArtworkId, QuantityError};

/// Errors from a key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key cannot be used as a storage slot name.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Reading a slot failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing a slot failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors reported by cart and wishlist operations.
///
/// Whatever the variant, the aggregate's in-memory lines are left as they
/// were before the failed call.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The quantity was below 1 or too large.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// The artwork does not exist in the catalog.
    #[error("artwork not found: {0}")]
    ArtworkNotFound(ArtworkId),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error body.
    #[error("API error: {status} {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The API base URL could not be used.
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Persisted state could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Lines could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SyncError {
    /// Whether the error came from the transport rather than a rejected request.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SyncError::ArtworkNotFound(ArtworkId::new(7));
        assert_eq!(err.to_string(), "artwork not found: 7");

        let err = SyncError::Api {
            status: 500,
            code: "internal".to_string(),
            message: "Internal server error".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 internal - Internal server error");
    }

    #[test]
    fn test_quantity_error_converts() {
        let err: SyncError = QuantityError::NotPositive(0).into();
        assert!(matches!(err, SyncError::InvalidQuantity(_)));
        assert!(!err.is_transport());
    }
}
