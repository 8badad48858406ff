//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use prio_cache::{
    api::create_router,
    cache::{EvictionCache, ManualClock},
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

const NOW: i64 = 1_700_000_000;

// == Helper Functions ==

fn create_test_app() -> Router {
    let cache = EvictionCache::new(100).unwrap();
    create_router(AppState::new(cache))
}

fn create_clocked_app(capacity: usize) -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(NOW));
    let cache = EvictionCache::new(capacity)
        .unwrap()
        .with_clock(clock.clone());
    (create_router(AppState::new(cache)), clock)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn put_set(app: &Router, body: &'static str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn send(app: &Router, method: &str, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let response = put_set(&app, r#"{"key":"test_key","value":"test_value"}"#).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
    assert_eq!(json["evicted"], false);
}

#[tokio::test]
async fn test_set_endpoint_with_priority_and_ttl() {
    let (app, _) = create_clocked_app(10);

    let response = put_set(&app, r#"{"key":"k","value":"v","priority":42,"ttl":60}"#).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/get/k").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["priority"], 42);
    assert_eq!(json["expiry"], NOW + 60);
    assert_eq!(json["ttl_remaining"], 60);
}

#[tokio::test]
async fn test_set_endpoint_with_absolute_expiry() {
    let (app, _) = create_clocked_app(10);

    put_set(&app, r#"{"key":"k","value":"v","expiry":1234}"#).await;

    let json = body_to_json(send(&app, "GET", "/get/k").await.into_body()).await;
    assert_eq!(json["expiry"], 1234);
    assert_eq!(json["ttl_remaining"], 0);
}

#[tokio::test]
async fn test_set_endpoint_rejects_ttl_with_expiry() {
    let app = create_test_app();

    let response = put_set(&app, r#"{"key":"k","value":"v","ttl":5,"expiry":99}"#).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();

    let set_response = put_set(&app, r#"{"key":"get_key","value":"get_value"}"#).await;
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = send(&app, "GET", "/get/get_key").await;

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["key"].as_str().unwrap(), "get_key");
    assert_eq!(json["value"].as_str().unwrap(), "get_value");
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let response = send(&app, "GET", "/get/nonexistent_key").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = create_test_app();

    put_set(&app, r#"{"key":"delete_key","value":"delete_value"}"#).await;

    let del_response = send(&app, "DELETE", "/del/delete_key").await;
    assert_eq!(del_response.status(), StatusCode::OK);

    let get_response = send(&app, "GET", "/get/delete_key").await;
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_not_found() {
    let app = create_test_app();

    let response = send(&app, "DELETE", "/del/nonexistent_key").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == CONTAINS Endpoint Tests ==

#[tokio::test]
async fn test_contains_endpoint() {
    let app = create_test_app();
    put_set(&app, r#"{"key":"here","value":"v"}"#).await;

    let json = body_to_json(send(&app, "GET", "/contains/here").await.into_body()).await;
    assert_eq!(json["present"], true);

    let json = body_to_json(send(&app, "GET", "/contains/missing").await.into_body()).await;
    assert_eq!(json["present"], false);
}

// == Eviction via API Tests ==

#[tokio::test]
async fn test_lowest_priority_evicted_when_full() {
    let (app, clock) = create_clocked_app(2);

    put_set(&app, r#"{"key":"low","value":"1","priority":1}"#).await;
    put_set(&app, r#"{"key":"high","value":"2","priority":9}"#).await;
    clock.advance(1);

    let response = put_set(&app, r#"{"key":"new","value":"3","priority":5}"#).await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["evicted"], true);

    assert_eq!(send(&app, "GET", "/get/low").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, "GET", "/get/high").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_entry_visible_until_reaped() {
    let (app, clock) = create_clocked_app(2);

    put_set(&app, r#"{"key":"stale","value":"1","priority":100,"ttl":1}"#).await;
    put_set(&app, r#"{"key":"keep","value":"2","priority":1}"#).await;
    clock.advance(10);

    // Lazy expiry: still served after its TTL
    assert_eq!(send(&app, "GET", "/get/stale").await.status(), StatusCode::OK);

    put_set(&app, r#"{"key":"new","value":"3","priority":1}"#).await;

    assert_eq!(send(&app, "GET", "/get/stale").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, "GET", "/get/keep").await.status(), StatusCode::OK);

    let json = body_to_json(send(&app, "GET", "/stats").await.into_body()).await;
    assert_eq!(json["expirations"], 1);
    assert_eq!(json["evictions"], 0);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    put_set(&app, r#"{"key":"stats_key","value":"stats_value"}"#).await;
    send(&app, "GET", "/get/stats_key").await; // hit
    send(&app, "GET", "/get/nonexistent").await; // miss

    let response = send(&app, "GET", "/stats").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert_eq!(json["capacity"].as_u64().unwrap(), 100);
    assert!(json.get("hit_rate").is_some());
}

// == DUMP Endpoint Tests ==

#[tokio::test]
async fn test_dump_endpoint() {
    let app = create_test_app();
    put_set(&app, r#"{"key":"d","value":"x","priority":3,"expiry":77}"#).await;

    let response = send(&app, "GET", "/dump").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text, r#"key: "d", value: "x", priority: 3, expiry: 77"#);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = send(&app, "GET", "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Error Response Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = put_set(&app, r#"{"invalid json"#).await;

    // Axum returns 400 or 422 for JSON parsing errors
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_empty_key_request() {
    let app = create_test_app();

    let response = put_set(&app, r#"{"key":"","value":"test"}"#).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}
