//! Atelier Storefront library.
//!
//! The catalog read API and the session-scoped cart and wishlist API, as a
//! library so the router can be tested in-process and embedded by the
//! integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{
    Router,
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request, header::CONTENT_TYPE},
    middleware::from_fn,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::{SESSION_HEADER, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Build the storefront router with its middleware stack.
///
/// Rate limiting and Sentry layers are added by the binary so tests can drive
/// the router without a client IP or a Sentry hub.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().allowed_origins);

    routes::routes()
        .with_state(state)
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    session_minted = tracing::field::Empty,
                )
            }),
        )
}

/// CORS policy: browsers may send and read the session header.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let session_header = HeaderName::from_static(SESSION_HEADER);

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, session_header.clone()])
        .expose_headers([session_header]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
