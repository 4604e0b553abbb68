// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Register, login, and /api/me work end to end
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use gym_tracker::middleware::auth::create_jwt;
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = common::create_test_app();

    let (status, body) = common::send(&app, Method::GET, "/api/dashboard", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _) = common::create_test_app();

    let (status, body) = common::send(
        &app,
        Method::GET,
        "/api/sessions/active",
        Some("invalid.token.here"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_token_signed_with_other_key_rejected() {
    let (app, _) = common::create_test_app();
    let token = create_jwt(1, b"a_completely_different_32b_key!!").unwrap();

    let (status, _) = common::send(&app, Method::GET, "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_me() {
    let (app, _) = common::create_test_app();
    let (token, user_id) = common::register_user(&app, "Sam@Example.com").await;

    let (status, me) = common::send(&app, Method::GET, "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user_id);
    assert_eq!(me["email"], "sam@example.com");
    assert!(me.get("password_hash").is_none());

    let (status, login) = common::send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "sam@example.com", "password": "squat-rack-42" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user"]["id"], user_id);
    assert!(login["token"].as_str().is_some());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _) = common::create_test_app();
    common::register_user(&app, "sam@example.com").await;

    let (wrong_pw, wrong_body) = common::send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "sam@example.com", "password": "not-my-password" })),
    )
    .await;
    let (unknown, unknown_body) = common::send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "not-my-password" })),
    )
    .await;

    assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_register_validation_and_duplicate() {
    let (app, _) = common::create_test_app();

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "sam@example.com", "password": "short", "display_name": "Sam" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], "password");

    common::register_user(&app, "sam@example.com").await;
    let (status, body) = common::send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "SAM@example.com", "password": "long-enough-pw", "display_name": "Sam" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_register_sets_http_only_cookie() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "email": "cookie@example.com",
                        "password": "squat-rack-42",
                        "display_name": "Cookie"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("gym_token="));
    assert!(cookie.contains("HttpOnly"));
    // Local frontend runs over plain HTTP.
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_cookie_auth_accepted() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "jar@example.com").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::COOKIE, format!("gym_token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_removes_cookie() {
    let (app, _) = common::create_test_app_with_frontend_url("https://gym.example.com");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, "gym_token=test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("gym_token="));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Secure"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/sessions")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _) = common::create_test_app();

    let (status, body) = common::send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}
