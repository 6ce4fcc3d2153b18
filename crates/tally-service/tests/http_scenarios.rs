//! End-to-end request flows against a file-backed store.

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use tally_service::{AppState, api};
use tally_store::Store;

const DEVICE: &str = "123e4567-e89b-12d3-a456-426614174000";
const OTHER_DEVICE: &str = "6f9619ff-8b86-4d11-b42d-00c04fc964ff";

fn app_at(path: &Path) -> Router {
    let store = Store::open(path).unwrap();
    api::router().with_state(AppState::new(store))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_event(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/events")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn stats(app: &Router, device_id: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(format!("/stats/{device_id}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn reset(app: &Router) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/reset")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn fractional_duration_is_truncated() {
    let temp_dir = tempfile::tempdir().unwrap();
    let app = app_at(&temp_dir.path().join("events_db.json"));

    let (status, ack) = post_event(
        &app,
        json!({
            "type": "transportation",
            "device_id": DEVICE,
            "duration": 120.9,
            "message": "x",
            "mode": "bike",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["deviceId"], DEVICE);

    let (status, body) = stats(&app, DEVICE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transportation"], json!({"bike": 120}));
    assert_eq!(body["air_conditioner"], 0);
}

#[tokio::test]
async fn air_conditioner_durations_accumulate() {
    let temp_dir = tempfile::tempdir().unwrap();
    let app = app_at(&temp_dir.path().join("events_db.json"));

    for _ in 0..2 {
        let (status, _) = post_event(
            &app,
            json!({
                "type": "air-conditioner",
                "device_id": DEVICE,
                "duration": 30,
                "message": "x",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = stats(&app, DEVICE).await;
    assert_eq!(body["air_conditioner"], 60);
    assert_eq!(body["transportation"], json!({}));
}

#[tokio::test]
async fn unknown_event_type_leaves_file_unchanged() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("events_db.json");
    let app = app_at(&path);
    let before = std::fs::read_to_string(&path).unwrap();

    let (status, body) = post_event(
        &app,
        json!({
            "type": "heater",
            "device_id": DEVICE,
            "duration": 30,
            "message": "x",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid event type");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn validation_messages() {
    let temp_dir = tempfile::tempdir().unwrap();
    let app = app_at(&temp_dir.path().join("events_db.json"));

    let cases = [
        (json!({"type": "transportation"}), "Missing required fields"),
        (
            json!({"type": "air-conditioner", "device_id": "abc", "duration": 1, "message": "x"}),
            "Invalid device_id format",
        ),
        (
            json!({"type": "air-conditioner", "device_id": DEVICE, "duration": "1", "message": "x"}),
            "Duration must be a number",
        ),
        (
            json!({"type": "transportation", "device_id": DEVICE, "duration": 1, "message": "x"}),
            "Missing mode for transportation event",
        ),
        (
            json!({"type": "transportation", "device_id": DEVICE, "duration": 1, "message": "x", "mode": "Car"}),
            "Invalid transportation mode",
        ),
    ];

    for (payload, expected) in cases {
        let (status, body) = post_event(&app, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{expected}");
        assert_eq!(body["error"], expected);
    }

    let (_, body) = stats(&app, DEVICE).await;
    assert_eq!(body["transportation"], json!({}));
    assert_eq!(body["air_conditioner"], 0);
}

#[tokio::test]
async fn reset_clears_every_device() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("events_db.json");
    let app = app_at(&path);

    for device in [DEVICE, OTHER_DEVICE] {
        post_event(
            &app,
            json!({"type": "transportation", "device_id": device, "duration": 5, "message": "x", "mode": "train"}),
        )
        .await;
        post_event(
            &app,
            json!({"type": "air-conditioner", "device_id": device, "duration": 5, "message": "x"}),
        )
        .await;
    }

    let (status, body) = reset(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Database reset successfully"}));

    for device in [DEVICE, OTHER_DEVICE] {
        let (_, body) = stats(&app, device).await;
        assert_eq!(body["transportation"], json!({}));
        assert_eq!(body["air_conditioner"], 0);
    }

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({"transportation": {}, "air_conditioner": {}}));
}

#[tokio::test]
async fn counters_survive_restart() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("events_db.json");

    {
        let app = app_at(&path);
        post_event(
            &app,
            json!({"type": "transportation", "device_id": DEVICE, "duration": 12.7, "message": "x", "mode": "walk"}),
        )
        .await;
    }

    let app = app_at(&path);
    post_event(
        &app,
        json!({"type": "transportation", "device_id": DEVICE, "duration": 3.2, "message": "x", "mode": "walk"}),
    )
    .await;

    let (_, body) = stats(&app, DEVICE).await;
    assert_eq!(body["transportation"]["walk"], 15);
}

#[tokio::test]
async fn concurrent_events_are_all_counted() {
    let temp_dir = tempfile::tempdir().unwrap();
    let app = Arc::new(app_at(&temp_dir.path().join("events_db.json")));

    let mut handles = Vec::new();
    for _ in 0..20 {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            post_event(
                &app,
                json!({"type": "air-conditioner", "device_id": DEVICE, "duration": 2, "message": "x"}),
            )
            .await
        }));
    }
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = stats(&app, DEVICE).await;
    assert_eq!(body["air_conditioner"], 40);
}

#[tokio::test]
async fn corrupt_store_file_yields_internal_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("events_db.json");
    let app = app_at(&path);
    std::fs::write(&path, "{ not json").unwrap();

    let (status, body) = post_event(
        &app,
        json!({"type": "air-conditioner", "device_id": DEVICE, "duration": 1, "message": "x"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    let (status, _) = stats(&app, DEVICE).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // reset recovers from any prior content
    let (status, _) = reset(&app).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = stats(&app, DEVICE).await;
    assert_eq!(status, StatusCode::OK);
}
