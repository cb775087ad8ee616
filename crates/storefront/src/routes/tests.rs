//! Router tests over the in-memory store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header::CONTENT_TYPE},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::config::StorefrontConfig;
use crate::db::MemoryStore;
use crate::db::memory::tests::seeded;
use crate::middleware::SESSION_HEADER;
use crate::state::AppState;

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl Reply {
    fn session(&self) -> &str {
        self.headers[SESSION_HEADER].to_str().unwrap()
    }
}

fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(seeded());
    let config = StorefrontConfig::for_local("postgres://localhost/unused");
    (crate::app(AppState::in_memory(config, store.clone())), store)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    session: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = session {
        builder = builder.header(SESSION_HEADER, token);
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    Reply {
        status,
        headers,
        body,
    }
}

async fn get(app: &Router, uri: &str, session: Option<&str>) -> Reply {
    send(app, Method::GET, uri, session, None).await
}

async fn post(app: &Router, uri: &str, session: &str, body: Value) -> Reply {
    send(app, Method::POST, uri, Some(session), Some(body)).await
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
async fn test_first_cart_read_mints_session() {
    let (app, _) = test_app();

    let reply = get(&app, "/api/cart", None).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.session().len(), 36);
    assert_eq!(reply.body, json!([]));
}

#[tokio::test]
async fn test_presented_session_is_echoed() {
    let (app, _) = test_app();

    let reply = get(&app, "/api/wishlist", Some("shopper-1")).await;
    assert_eq!(reply.session(), "shopper-1");
}

#[tokio::test]
async fn test_errors_also_carry_session() {
    let (app, _) = test_app();

    let reply = post(&app, "/api/cart", "shopper-1", json!({"artwork_id": 999})).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.session(), "shopper-1");
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let (app, _) = test_app();

    post(&app, "/api/cart", "alice", json!({"artwork_id": 1})).await;
    let alice = get(&app, "/api/cart", Some("alice")).await;
    let line_id = alice.body[0]["id"].as_i64().unwrap();

    let bob = get(&app, "/api/cart", Some("bob")).await;
    assert_eq!(bob.body, json!([]));

    // Bob's delete of Alice's line is a silent no-op
    let reply = send(&app, Method::DELETE, &format!("/api/cart/{line_id}"), Some("bob"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(get(&app, "/api/cart", Some("alice")).await.body.as_array().unwrap().len(), 1);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_merges_same_artwork_and_size() {
    let (app, _) = test_app();
    let s = "shopper-1";

    let first = post(&app, "/api/cart", s, json!({"artwork_id": 1, "size_option": "Medium"})).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body, json!({"success": true}));

    post(
        &app,
        "/api/cart",
        s,
        json!({"artwork_id": 1, "size_option": "Medium", "quantity": 2}),
    )
    .await;

    let lines = get(&app, "/api/cart", Some(s)).await.body;
    assert_eq!(lines.as_array().unwrap().len(), 1);
    assert_eq!(lines[0]["quantity"], 3);
    assert_eq!(lines[0]["title"], "Artwork 1");
    assert_eq!(lines[0]["size_option"], "Medium");

    post(&app, "/api/cart", s, json!({"artwork_id": 1, "size_option": "Large"})).await;
    let lines = get(&app, "/api/cart", Some(s)).await.body;
    assert_eq!(lines.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cart_add_unknown_artwork() {
    let (app, _) = test_app();

    let reply = post(&app, "/api/cart", "s", json!({"artwork_id": 404})).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["code"], "artwork_not_found");
    assert_eq!(get(&app, "/api/cart", Some("s")).await.body, json!([]));
}

#[tokio::test]
async fn test_cart_add_rejects_non_positive_quantity() {
    let (app, _) = test_app();

    for quantity in [0, -1] {
        let reply = post(
            &app,
            "/api/cart",
            "s",
            json!({"artwork_id": 1, "quantity": quantity}),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["code"], "invalid_quantity");
    }
    assert_eq!(get(&app, "/api/cart", Some("s")).await.body, json!([]));
}

#[tokio::test]
async fn test_cart_add_requires_artwork_id() {
    let (app, _) = test_app();

    let reply = post(&app, "/api/cart", "s", json!({"quantity": 1})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "bad_request");

    let reply = send(&app, Method::POST, "/api/cart", Some("s"), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_quantity() {
    let (app, _) = test_app();
    post(&app, "/api/cart", "s", json!({"artwork_id": 2, "quantity": 4})).await;
    let id = get(&app, "/api/cart", Some("s")).await.body[0]["id"].as_i64().unwrap();
    let uri = format!("/api/cart/{id}");

    for bad in [json!({"quantity": 0}), json!({"quantity": -1}), json!({})] {
        let reply = send(&app, Method::PATCH, &uri, Some("s"), Some(bad)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["code"], "invalid_quantity");
    }
    assert_eq!(get(&app, "/api/cart", Some("s")).await.body[0]["quantity"], 4);

    let reply = send(&app, Method::PATCH, &uri, Some("s"), Some(json!({"quantity": 2}))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(get(&app, "/api/cart", Some("s")).await.body[0]["quantity"], 2);
}

#[tokio::test]
async fn test_remove_missing_line_is_noop() {
    let (app, _) = test_app();

    let reply = send(&app, Method::DELETE, "/api/cart/12345", Some("s"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"success": true}));
}

#[tokio::test]
async fn test_snapshot_is_not_refreshed() {
    let (app, store) = test_app();
    post(&app, "/api/cart", "s", json!({"artwork_id": 5})).await;

    let mut repriced = crate::db::memory::tests::artwork(5, 1, atelier_core::Category::LippanArt, 999);
    repriced.title = "Renamed".to_string();
    store.put_artwork(repriced);

    let lines = get(&app, "/api/cart", Some("s")).await.body;
    assert_eq!(lines[0]["title"], "Artwork 5");
    assert_eq!(lines[0]["price"], "150");
}

// =============================================================================
// Wishlist
// =============================================================================

#[tokio::test]
async fn test_wishlist_add_twice() {
    let (app, _) = test_app();

    let first = post(&app, "/api/wishlist", "s", json!({"artwork_id": 3})).await;
    assert_eq!(first.body, json!({"success": true}));

    let second = post(&app, "/api/wishlist", "s", json!({"artwork_id": 3})).await;
    assert_eq!(second.body, json!({"success": true, "already_exists": true}));

    let lines = get(&app, "/api/wishlist", Some("s")).await.body;
    assert_eq!(lines.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_wishlist_remove_by_line_id() {
    let (app, _) = test_app();
    post(&app, "/api/wishlist", "s", json!({"artwork_id": 3})).await;
    let line_id = get(&app, "/api/wishlist", Some("s")).await.body[0]["id"].as_i64().unwrap();

    let reply = send(&app, Method::DELETE, &format!("/api/wishlist/{line_id}"), Some("s"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(get(&app, "/api/wishlist", Some("s")).await.body, json!([]));
}

#[tokio::test]
async fn test_wishlist_add_unknown_artwork() {
    let (app, _) = test_app();

    let reply = post(&app, "/api/wishlist", "s", json!({"artwork_id": 404})).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["code"], "artwork_not_found");
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_catalog_listing_and_detail() {
    let (app, _) = test_app();

    let list = get(&app, "/api/artworks?category=WallArt&sort=price-high", None).await;
    assert_eq!(list.status, StatusCode::OK);
    let ids: Vec<i64> = list
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let detail = get(&app, "/api/artworks/1", None).await;
    assert_eq!(detail.body["artist_bio"], "Sophia Martinez makes art");

    let missing = get(&app, "/api/artworks/99", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["code"], "not_found");
}

#[tokio::test]
async fn test_catalog_rejects_unknown_category() {
    let (app, _) = test_app();

    let reply = get(&app, "/api/artworks?category=Sculpture", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "bad_request");
}

#[tokio::test]
async fn test_catalog_responses_carry_no_session() {
    let (app, _) = test_app();

    let reply = get(&app, "/api/artists", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(!reply.headers.contains_key(SESSION_HEADER));
    assert_eq!(reply.body[0]["name"], "James Chen");
}

#[tokio::test]
async fn test_related_and_stats() {
    let (app, _) = test_app();

    let related = get(&app, "/api/artworks/1/related", None).await;
    assert_eq!(related.body.as_array().unwrap().len(), 2);
    assert_eq!(get(&app, "/api/artworks/99/related", None).await.status, StatusCode::NOT_FOUND);

    let stats = get(&app, "/api/categories/stats", None).await;
    assert_eq!(stats.body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_search() {
    let (app, _) = test_app();

    assert_eq!(get(&app, "/api/search?q=", None).await.body, json!([]));

    let hits = get(&app, "/api/search?q=ocean", None).await.body;
    assert_eq!(hits[0]["title"], "Ocean Whisper");
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app();

    let reply = get(&app, "/health", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, Value::String("ok".to_string()));
    assert!(reply.headers.contains_key("x-request-id"));

    assert_eq!(get(&app, "/health/ready", None).await.status, StatusCode::OK);
}
