// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard caching, streaks, and the completion calendar.

use axum::http::{Method, StatusCode};
use chrono::{Datelike, Utc};
use serde_json::json;

mod common;

#[tokio::test]
async fn test_dashboard_for_new_user() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "fresh@example.com").await;

    let (status, dashboard) =
        common::send(&app, Method::GET, "/api/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["display_name"], "Test Lifter");
    assert!(dashboard["next_split"].is_null());
    assert!(dashboard["active_session"].is_null());
    assert_eq!(dashboard["streak"]["current_streak"], 0);
    assert!(dashboard["recent_sessions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_dashboard_cache_invalidated_by_writes() {
    let (app, state) = common::create_test_app();
    let (token, user_id) = common::register_user(&app, "cache@example.com").await;

    common::send(&app, Method::GET, "/api/dashboard", Some(&token), None).await;
    assert!(state.dashboard_cache.get(user_id).is_some());

    let plan = common::assess(&app, &token, 4, "ARMS").await;
    assert!(state.dashboard_cache.get(user_id).is_none());

    let (_, dashboard) =
        common::send(&app, Method::GET, "/api/dashboard", Some(&token), None).await;
    assert_eq!(dashboard["assessment_id"], plan["id"]);
    assert_eq!(dashboard["next_split"]["label"], "A");

    let session =
        common::start_split_session(&app, &token, plan["splits"][0]["id"].as_i64().unwrap())
            .await;
    let (_, dashboard) =
        common::send(&app, Method::GET, "/api/dashboard", Some(&token), None).await;
    assert_eq!(dashboard["active_session"]["session_id"], session["id"]);
    assert_eq!(dashboard["active_session"]["completion_percentage"], 0);

    common::send(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/complete", session["id"]),
        Some(&token),
        Some(json!({ "rating": 5 })),
    )
    .await;
    let (_, dashboard) =
        common::send(&app, Method::GET, "/api/dashboard", Some(&token), None).await;
    assert!(dashboard["active_session"].is_null());
    assert_eq!(dashboard["next_split"]["label"], "B");
    assert_eq!(dashboard["streak"]["current_streak"], 1);
    assert_eq!(dashboard["streak"]["total_completed"], 1);
    assert_eq!(dashboard["sessions_this_week"], 1);
    assert_eq!(dashboard["recent_sessions"][0]["rating"], 5);
}

#[tokio::test]
async fn test_streak_counts_days_not_sessions() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "streak@example.com").await;

    for _ in 0..3 {
        let (_, session) =
            common::send(&app, Method::POST, "/api/sessions", Some(&token), Some(json!({}))).await;
        common::send(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/complete", session["id"]),
            Some(&token),
            Some(json!({})),
        )
        .await;
    }

    let (status, streak) =
        common::send(&app, Method::GET, "/api/progress/streak", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(streak["current_streak"], 1);
    assert_eq!(streak["longest_streak"], 1);
    assert_eq!(streak["total_completed"], 3);
}

#[tokio::test]
async fn test_calendar_month() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "calendar@example.com").await;

    let (_, session) =
        common::send(&app, Method::POST, "/api/sessions", Some(&token), Some(json!({}))).await;
    common::send(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/complete", session["id"]),
        Some(&token),
        Some(json!({})),
    )
    .await;

    let today = Utc::now().date_naive();
    let month = format!("{:04}-{:02}", today.year(), today.month());
    let (status, calendar) = common::send(
        &app,
        Method::GET,
        &format!("/api/progress/calendar?month={}", month),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calendar["month"], month.as_str());
    assert_eq!(calendar["total_completed"], 1);
    let days = calendar["days"].as_array().unwrap();
    let today_str = today.format("%Y-%m-%d").to_string();
    let entry = days.iter().find(|d| d["date"] == today_str.as_str()).unwrap();
    assert_eq!(entry["completed_sessions"], 1);

    let (status, calendar) = common::send(
        &app,
        Method::GET,
        "/api/progress/calendar?month=2020-02",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calendar["total_completed"], 0);
}

#[tokio::test]
async fn test_calendar_rejects_bad_month() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "badmonth@example.com").await;

    for month in ["2026-13", "June", "2026-1-1"] {
        let (status, body) = common::send(
            &app,
            Method::GET,
            &format!("/api/progress/calendar?month={}", month),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{month}");
        assert_eq!(body["error"], "bad_request");
    }
}
