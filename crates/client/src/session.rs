//! Client-side session identity.
//!
//! The storefront mints a token on first contact and echoes it on every cart
//! and wishlist response. The identity remembers the latest one and persists it
//! so the next run continues the same cart.

use std::sync::{Arc, PoisonError, RwLock};

use atelier_core::SessionToken;

use crate::error::StoreError;
use crate::storage::{KeyValueStore, MemoryStore};

/// Storage slot holding the session token.
pub const SESSION_KEY: &str = "session_id";

/// Header carrying the session token in both directions.
pub const SESSION_HEADER: &str = "x-session-id";

/// The shopper's session token, loaded from and persisted to a store slot.
pub struct SessionIdentity {
    store: Arc<dyn KeyValueStore>,
    token: RwLock<Option<SessionToken>>,
}

impl SessionIdentity {
    /// Load the identity from `store`.
    ///
    /// An unreadable or invalid stored token is discarded; the server will
    /// mint a new one on the next request.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let token = match store.get(SESSION_KEY) {
            Ok(Some(raw)) => match SessionToken::parse(raw.trim()) {
                Ok(token) => Some(token),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding invalid stored session token");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored session token");
                None
            }
        };

        Self {
            store,
            token: RwLock::new(token),
        }
    }

    /// An identity that lives only as long as the process.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self::load(Arc::new(MemoryStore::new()))
    }

    /// The current token, if one has been issued.
    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record the token a response carried.
    ///
    /// Overwrites the held token whenever the server returns one, and persists
    /// it if it changed. Returns whether the token changed. A value that is
    /// not a valid token is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting a changed token fails. The new token is
    /// still held in memory.
    pub fn observe(&self, presented: &str) -> Result<bool, StoreError> {
        let token = match SessionToken::parse(presented) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid session header");
                return Ok(false);
            }
        };

        {
            let mut held = self.token.write().unwrap_or_else(PoisonError::into_inner);
            if held.as_ref() == Some(&token) {
                return Ok(false);
            }
            *held = Some(token.clone());
        }

        tracing::debug!("Session token updated");
        self.store.set(SESSION_KEY, token.as_str())?;
        Ok(true)
    }

    /// Forget the token so the next request starts a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored slot cannot be removed.
    pub fn clear(&self) -> Result<(), StoreError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.remove(SESSION_KEY)
    }
}

impl std::fmt::Debug for SessionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIdentity")
            .field("has_token", &self.token().is_some())
            .finish_non_exhaustive()
    }
}
