//! Delivery tests for `TelegramNotifier` against a local HTTP server.
//!
//! A small axum app stands in for the Bot API: it records every request
//! path and JSON body and answers with a configurable status.

use std::sync::{Arc, Mutex};

use aquaalert_db::models::device::Device;
use aquaalert_db::models::reading::Reading;
use aquaalert_notify::{AlertNotifier, TelegramConfig, TelegramNotifier};
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Fake Bot API
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct FakeApi {
    status: StatusCode,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn record(State(api): State<FakeApi>, uri: Uri, Json(body): Json<Value>) -> StatusCode {
    api.requests
        .lock()
        .unwrap()
        .push((uri.path().to_string(), body));
    api.status
}

/// Serve the fake API on an ephemeral port and return its base URL.
async fn spawn_api(status: StatusCode) -> (String, Arc<Mutex<Vec<(String, Value)>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(record).with_state(FakeApi {
        status,
        requests: Arc::clone(&requests),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), requests)
}

fn notifier(api_base: &str, token: &str, chat_id: &str) -> TelegramNotifier {
    let mut config = TelegramConfig::new(token, chat_id);
    config.api_base = api_base.to_string();
    TelegramNotifier::new(config).unwrap()
}

fn device() -> Device {
    let now = Utc::now();
    Device {
        device_eui: "A1B2C3D4E5F60708".into(),
        name: "Puente Norte".into(),
        description: None,
        location_name: None,
        latitude: None,
        longitude: None,
        bridge_height_cm: 300.0,
        threshold_watch_pct: 50.0,
        threshold_warning_pct: 70.0,
        threshold_critical_pct: 85.0,
        is_active: true,
        last_seen: None,
        created_at: now,
        updated_at: now,
    }
}

fn reading(level: &str) -> Reading {
    Reading {
        id: Uuid::new_v4(),
        time: Utc::now(),
        device_eui: "A1B2C3D4E5F60708".into(),
        distance_cm: Some(40.0),
        water_level_cm: Some(260.0),
        fill_pct: Some(86.67),
        battery_mv: Some(3800),
        battery_pct: Some(66),
        rssi: Some(-97),
        snr: Some(7.5),
        alert_level: level.into(),
    }
}

// ---------------------------------------------------------------------------
// Test: an alerting reading produces one sendMessage call
// ---------------------------------------------------------------------------

#[tokio::test]
async fn critical_alert_posts_once() {
    let (base, requests) = spawn_api(StatusCode::OK).await;
    let notifier = notifier(&base, "123:abc", "-1001");

    let sent = notifier.send_alert(&device(), &reading("CRITICAL")).await;

    assert!(sent);
    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);

    let (path, body) = &requests[0];
    assert_eq!(path, "/bot123:abc/sendMessage");
    assert_eq!(body["chat_id"], "-1001");
    assert_eq!(body["parse_mode"], "Markdown");
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("CRITICAL"));
    assert!(text.contains("A1B2C3D4E5F60708"));
    assert!(text.contains("No location"));
}

// ---------------------------------------------------------------------------
// Test: NORMAL readings never reach the network
// ---------------------------------------------------------------------------

#[tokio::test]
async fn normal_reading_is_not_sent() {
    let (base, requests) = spawn_api(StatusCode::OK).await;
    let notifier = notifier(&base, "123:abc", "-1001");

    assert!(!notifier.send_alert(&device(), &reading("NORMAL")).await);
    assert!(requests.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: missing credentials skip delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unconfigured_bot_is_skipped() {
    let (base, requests) = spawn_api(StatusCode::OK).await;
    let notifier = notifier(&base, "", "-1001");

    assert!(!notifier.notify(&device(), &reading("WARNING")).await);
    assert!(requests.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: a non-2xx response reports failure without retrying
// ---------------------------------------------------------------------------

#[tokio::test]
async fn http_error_returns_false_without_retry() {
    let (base, requests) = spawn_api(StatusCode::UNAUTHORIZED).await;
    let notifier = notifier(&base, "bad-token", "-1001");

    assert!(!notifier.send_alert(&device(), &reading("WATCH")).await);
    assert_eq!(requests.lock().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: an unreachable endpoint reports failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_endpoint_returns_false() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let notifier = notifier(&format!("http://{addr}"), "123:abc", "-1001");
    assert!(!notifier.send_alert(&device(), &reading("CRITICAL")).await);
}
