//! HTTP API behavior
//!
//! Drives the warp filters directly with `warp::test`: creation
//! validation, listing order, the manual trigger, and error replies.

mod common;

use chrono::{Duration, Utc};
use common::mock_notifiers::SuccessNotifier;
use common::{capsule, due_capsule};
use postdate::config::SchedulerConfig;
use postdate::http;
use postdate::scheduler::DeliveryScheduler;
use postdate::store::{CapsuleStore, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;

fn api(
    store: Arc<MemoryStore>,
) -> impl warp::Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
    let scheduler = Arc::new(DeliveryScheduler::new(
        store.clone(),
        Arc::new(SuccessNotifier),
        SchedulerConfig::default(),
    ));
    http::routes(store, scheduler)
}

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("response body is not JSON")
}

#[tokio::test]
async fn test_health() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .method("GET")
        .path("/api/health")
        .reply(&api)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(body_json(response.body()), json!({"status": "ok"}));
}

#[tokio::test]
async fn test_create_capsule() {
    let store = Arc::new(MemoryStore::new());
    let api = api(store.clone());

    let unlock_at = (Utc::now() + Duration::days(30)).to_rfc3339();
    let response = warp::test::request()
        .method("POST")
        .path("/api/capsules")
        .json(&json!({
            "senderName": "Past Me",
            "receiverEmail": "Future@Example.com",
            "message": "open on your birthday",
            "unlockAt": unlock_at,
            "category": "birthday",
            "password": "hunter2",
        }))
        .reply(&api)
        .await;

    assert_eq!(response.status(), 200);
    let body = body_json(response.body());
    assert_eq!(body["message"], "Saved");
    assert_eq!(body["capsule"]["receiverEmail"], "future@example.com");
    assert_eq!(body["capsule"]["status"], "pending");
    assert!(body["capsule"]["credentialDigest"].is_string());

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_create_rejects_missing_fields() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .method("POST")
        .path("/api/capsules")
        .json(&json!({
            "senderName": "Past Me",
            "receiverEmail": "future@example.com",
            "unlockAt": Utc::now().to_rfc3339(),
        }))
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
    let body = body_json(response.body());
    assert!(body["error"].as_str().unwrap().contains("message"));
}

#[tokio::test]
async fn test_create_rejects_bad_unlock_date() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .method("POST")
        .path("/api/capsules")
        .json(&json!({
            "senderName": "Past Me",
            "receiverEmail": "future@example.com",
            "message": "hello",
            "unlockAt": "next tuesday",
        }))
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(body_json(response.body())["error"], "invalid unlock date");
}

#[tokio::test]
async fn test_create_rejects_past_unlock_date() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .method("POST")
        .path("/api/capsules")
        .json(&json!({
            "senderName": "Past Me",
            "receiverEmail": "future@example.com",
            "message": "hello",
            "unlockAt": (Utc::now() - Duration::days(1)).to_rfc3339(),
        }))
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(
        body_json(response.body())["error"],
        "unlock date must not be in the past"
    );
}

#[tokio::test]
async fn test_create_requires_unlock_date() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .method("POST")
        .path("/api/capsules")
        .json(&json!({
            "senderName": "Past Me",
            "receiverEmail": "future@example.com",
            "message": "hello",
        }))
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
    assert!(body_json(response.body())["error"]
        .as_str()
        .unwrap()
        .contains("unlock"));
}

#[tokio::test]
async fn test_list_newest_first() {
    let store = Arc::new(MemoryStore::new());
    let api = api(store.clone());

    let mut older = capsule("old@example.com", Utc::now());
    older.created_at = Utc::now() - Duration::minutes(10);
    store.create(older).await.unwrap();
    store.create(capsule("new@example.com", Utc::now())).await.unwrap();

    let response = warp::test::request()
        .method("GET")
        .path("/api/capsules")
        .reply(&api)
        .await;

    assert_eq!(response.status(), 200);
    let body = body_json(response.body());
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["receiverEmail"], "new@example.com");
    assert_eq!(listed[1]["receiverEmail"], "old@example.com");
}

#[tokio::test]
async fn test_trigger_send_returns_pass_summary() {
    let store = Arc::new(MemoryStore::new());
    let api = api(store.clone());
    store.create(due_capsule("future@example.com")).await.unwrap();

    let response = warp::test::request()
        .method("POST")
        .path("/api/capsules/trigger-send")
        .reply(&api)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        body_json(response.body()),
        json!({"checked": 1, "sent": 1, "failed": 0, "errors": null})
    );

    // Nothing left to do on a second trigger
    let response = warp::test::request()
        .method("POST")
        .path("/api/capsules/trigger-send")
        .reply(&api)
        .await;
    assert_eq!(
        body_json(response.body()),
        json!({"checked": 0, "sent": 0, "failed": 0, "errors": null})
    );
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .method("GET")
        .path("/api/unknown")
        .reply(&api)
        .await;

    assert_eq!(response.status(), 404);
    assert_eq!(body_json(response.body()), json!({"error": "not found"}));
}

#[tokio::test]
async fn test_malformed_body_is_json_400() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .method("POST")
        .path("/api/capsules")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(
        body_json(response.body()),
        json!({"error": "invalid request body"})
    );
}
