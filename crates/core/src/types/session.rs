//! Opaque shopper session token.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur when parsing a [`SessionToken`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionTokenError {
    /// The input string is empty.
    #[error("session token cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("session token must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("session token contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// An opaque token scoping cart and wishlist lines to one shopper.
///
/// Tokens carry no authority: the server treats an unrecognized token as the
/// start of a fresh, empty scope. The only requirement is that the value can
/// travel safely in an HTTP header and a database column.
///
/// ## Constraints
///
/// - Length: 1-128 characters
/// - Characters: ASCII alphanumerics, `-` and `_`
///
/// ## Examples
///
/// ```
/// use atelier_core::SessionToken;
///
/// assert!(SessionToken::parse("3f0c9c1e-8d5b-4a52-9d7e-0a4c2f1b7e11").is_ok());
/// assert!(SessionToken::parse("").is_err());
/// assert!(SessionToken::parse("has space").is_err());
///
/// let minted = SessionToken::generate();
/// assert_eq!(minted.as_str().len(), 36);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(String);

impl SessionToken {
    /// Maximum length of a session token.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `SessionToken` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 128 characters, or
    /// contains anything other than ASCII alphanumerics, `-` and `_`.
    pub fn parse(s: &str) -> Result<Self, SessionTokenError> {
        if s.is_empty() {
            return Err(SessionTokenError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SessionTokenError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(SessionTokenError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Mint a new random token (UUID v4, hyphenated).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Resolve the token for a request.
    ///
    /// Reuses the presented token when it parses; otherwise mints a new one.
    /// Returns the token and whether it was freshly minted. Never fails: an
    /// absent or malformed token simply starts a new, empty scope.
    #[must_use]
    pub fn resolve(presented: Option<&str>) -> (Self, bool) {
        match presented.map(str::trim).map(Self::parse) {
            Some(Ok(token)) => (token, false),
            _ => (Self::generate(), true),
        }
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionToken {
    type Err = SessionTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionToken {
    type Error = SessionTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionToken> for String {
    fn from(token: SessionToken) -> Self {
        token.0
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for SessionToken {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for SessionToken {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for SessionToken {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_tokens() {
        assert!(SessionToken::parse("abc").is_ok());
        assert!(SessionToken::parse("A_b-9").is_ok());
        assert!(SessionToken::parse(&"x".repeat(128)).is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(SessionToken::parse(""), Err(SessionTokenError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            SessionToken::parse(&"x".repeat(129)),
            Err(SessionTokenError::TooLong { max: 128 })
        ));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            SessionToken::parse("abc;def"),
            Err(SessionTokenError::InvalidCharacter(';'))
        );
    }

    #[test]
    fn test_generate_is_unique_and_valid() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();
        assert_ne!(a, b);
        assert!(SessionToken::parse(a.as_str()).is_ok());
    }

    #[test]
    fn test_resolve_reuses_presented_token() {
        let (token, minted) = SessionToken::resolve(Some("existing-token"));
        assert_eq!(token.as_str(), "existing-token");
        assert!(!minted);
    }

    #[test]
    fn test_resolve_mints_when_absent_or_invalid() {
        let (_, minted) = SessionToken::resolve(None);
        assert!(minted);

        let (token, minted) = SessionToken::resolve(Some("not valid!"));
        assert!(minted);
        assert_ne!(token.as_str(), "not valid!");

        let (_, minted) = SessionToken::resolve(Some("   "));
        assert!(minted);
    }

    #[test]
    fn test_serde_rejects_invalid_token() {
        let parsed: Result<SessionToken, _> = serde_json::from_str("\"bad token\"");
        assert!(parsed.is_err());

        let token: SessionToken = serde_json::from_str("\"good-token\"").unwrap();
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"good-token\"");
    }
}
