//! Shopper session resolution.
//!
//! Every cart and wishlist request is scoped by an opaque token carried in the
//! `x-session-id` header. The middleware resolves it (minting a fresh token
//! when none, or a malformed one, is presented), makes it available to
//! handlers through the [`ShopperSession`] extractor, and echoes it on the
//! response so clients can overwrite their stored copy.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderValue, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::Span;

use atelier_core::SessionToken;

/// The HTTP header carrying the session token in both directions.
pub const SESSION_HEADER: &str = "x-session-id";

/// The session token resolved for the current request.
#[derive(Clone, Debug)]
pub struct ShopperSession {
    token: SessionToken,
    minted: bool,
}

impl ShopperSession {
    /// Resolve the session from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let presented = headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok());
        let (token, minted) = SessionToken::resolve(presented);
        Self { token, minted }
    }

    /// The session token.
    #[must_use]
    pub const fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Whether the token was minted for this request.
    #[must_use]
    pub const fn minted(&self) -> bool {
        self.minted
    }
}

/// Middleware that resolves the shopper session and echoes it on the response.
///
/// The header is set on every response, including errors, because a client
/// presenting no token learns its new one from whichever response comes back
/// first.
pub async fn shopper_session_middleware(mut request: Request, next: Next) -> Response {
    let session = ShopperSession::from_headers(request.headers());

    if session.minted {
        tracing::debug!("Minted new shopper session");
    }
    Span::current().record("session_minted", session.minted);

    let token = session.token.clone();
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(token.as_str()) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }

    response
}

/// Extractor to get the shopper session from request extensions.
///
/// # Example
///
/// ```ignore
/// async fn handler(session: ShopperSession) -> impl IntoResponse {
///     state.carts().list(session.token()).await
/// }
/// ```
impl<S> FromRequestParts<S> for ShopperSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!(
                "Shopper session not found in request extensions - middleware may be misconfigured"
            );
            Self::from_headers(&parts.headers)
        }))
    }
}
