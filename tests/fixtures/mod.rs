//! Test fixtures and helpers for integration testing

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use mergington_activities::config::AppConfig;
use mergington_activities::registry::{ActivitySeed, StaticCatalogProvider};
use mergington_activities::types::Activity;
use mergington_activities::{create_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Running service with the built-in catalog
pub async fn seeded_app() -> (Arc<AppState>, Router) {
    let mut config = AppConfig::default();
    config.web.serve_static = false;
    let state = Arc::new(AppState::new(config).await.expect("seed catalog is valid"));
    state.start().await;
    let router = create_router(state.clone());
    (state, router)
}

/// Running service with a single activity of the given capacity
pub async fn single_activity_app(name: &str, capacity: usize) -> (Arc<AppState>, Router) {
    let mut config = AppConfig::default();
    config.web.serve_static = false;
    let provider = StaticCatalogProvider::with_seeds(vec![ActivitySeed::new(
        name,
        "Integration test activity",
        "Daily",
        capacity,
    )]);
    let state = Arc::new(
        AppState::with_provider(config, &provider)
            .await
            .expect("test catalog is valid"),
    );
    state.start().await;
    let router = create_router(state.clone());
    (state, router)
}

/// Percent-encode a path segment or query value
pub fn encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'@' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// POST a signup and return the status and JSON body
pub async fn signup(app: &Router, activity: &str, email: &str) -> (StatusCode, Value) {
    let uri = format!(
        "/activities/{}/signup?email={}",
        encode(activity),
        encode(email)
    );
    send(app, Request::builder().method("POST").uri(uri)).await
}

/// GET /activities
pub async fn list_activities(app: &Router) -> Vec<Activity> {
    let (status, body) = send(app, Request::builder().uri("/activities")).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body).expect("activity list deserializes")
}

/// Participant count of one activity as reported by the list endpoint
pub async fn participant_count(app: &Router, activity: &str) -> usize {
    list_activities(app)
        .await
        .into_iter()
        .find(|a| a.name == activity)
        .map(|a| a.participants.len())
        .expect("activity is listed")
}

async fn send(app: &Router, builder: axum::http::request::Builder) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
