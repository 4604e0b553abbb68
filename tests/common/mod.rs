// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use gym_tracker::config::Config;
use gym_tracker::db::SqliteDb;
use gym_tracker::routes::create_router;
use gym_tracker::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app backed by a fresh in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    create_test_app_with_config(config)
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (Router, Arc<AppState>) {
    let db = SqliteDb::open_in_memory().expect("Failed to open in-memory database");
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

/// Send a request and decode the JSON response (Null for empty bodies).
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Register a user and return (token, user id).
#[allow(dead_code)]
pub async fn register_user(app: &Router, email: &str) -> (String, i64) {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": "squat-rack-42",
            "display_name": "Test Lifter",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_i64().unwrap(),
    )
}

/// Create an assessment and return its JSON.
#[allow(dead_code)]
pub async fn assess(app: &Router, token: &str, frequency: i64, focus: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/assessments",
        Some(token),
        Some(serde_json::json!({ "frequency": frequency, "training_focus": focus })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "assessment failed: {body}");
    body
}

/// Start a session from a split and return its JSON.
#[allow(dead_code)]
pub async fn start_split_session(app: &Router, token: &str, split_id: i64) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/sessions",
        Some(token),
        Some(serde_json::json!({ "split_id": split_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "start session failed: {body}");
    body
}
