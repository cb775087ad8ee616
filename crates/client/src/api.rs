//! Storefront API addressing and error bodies.

use serde::Deserialize;
use url::Url;

use crate::error::SyncError;

/// Base URL of a storefront API, e.g. `http://127.0.0.1:8787`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(Url);

impl ApiBase {
    /// Parse a base URL. A path prefix is kept, with or without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not an absolute URL.
    pub fn parse(base: &str) -> Result<Self, url::ParseError> {
        let mut url = Url::parse(base)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self(url))
    }

    /// URL of an API route, e.g. `endpoint("cart/3")` → `<base>/api/cart/3`.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn endpoint(&self, route: &str) -> Result<Url, url::ParseError> {
        self.0.join("api/")?.join(route)
    }

    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }
}

/// The `{error, code}` body every storefront error carries.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

/// Turn a non-success response into [`SyncError::Api`].
pub(crate) async fn api_error(response: reqwest::Response) -> SyncError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.code, body.error),
        Err(_) => (
            "unknown".to_string(),
            text.chars().take(200).collect::<String>(),
        ),
    };

    tracing::warn!(status = %status, code = %code, message = %message, "Storefront API error");

    SyncError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_without_prefix() {
        let base = ApiBase::parse("http://127.0.0.1:8787").unwrap();
        assert_eq!(
            base.endpoint("cart").unwrap().as_str(),
            "http://127.0.0.1:8787/api/cart"
        );
        assert_eq!(
            base.endpoint("cart/12").unwrap().as_str(),
            "http://127.0.0.1:8787/api/cart/12"
        );
    }

    #[test]
    fn test_endpoint_keeps_prefix() {
        for raw in ["https://shop.example/store", "https://shop.example/store/"] {
            let base = ApiBase::parse(raw).unwrap();
            assert_eq!(
                base.endpoint("wishlist").unwrap().as_str(),
                "https://shop.example/store/api/wishlist"
            );
        }
    }

    #[test]
    fn test_rejects_relative_base() {
        assert!(ApiBase::parse("/api").is_err());
    }
}
