// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise library and routines: archive instead of delete once used.

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

mod common;

async fn create_exercise(app: &axum::Router, token: &str, name: &str) -> Value {
    let (status, body) = common::send(
        app,
        Method::POST,
        "/api/exercises",
        Some(token),
        Some(json!({ "name": name, "muscle_group": "CHEST", "equipment": "Cable" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn create_routine(app: &axum::Router, token: &str, name: &str, exercise_id: i64) -> Value {
    let (status, body) = common::send(
        app,
        Method::POST,
        "/api/routines",
        Some(token),
        Some(json!({
            "name": name,
            "divisions": [
                {
                    "name": "Push",
                    "exercises": [
                        { "exercise_id": exercise_id, "target_sets": 3, "target_reps": "8-12" }
                    ]
                },
                { "name": "Pull" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn test_list_exercises_filters_by_muscle_group() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "filter@example.com").await;

    let (status, legs) = common::send(
        &app,
        Method::GET,
        "/api/exercises?muscle_group=QUADS",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let legs = legs.as_array().unwrap();
    assert!(!legs.is_empty());
    assert!(legs.iter().all(|e| e["muscle_group"] == "QUADS"));

    let (status, body) = common::send(
        &app,
        Method::GET,
        "/api/exercises?muscle_group=TAIL",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "muscle_group");
}

#[tokio::test]
async fn test_custom_exercise_visible_only_to_owner() {
    let (app, _) = common::create_test_app();
    let (alice, alice_id) = common::register_user(&app, "alice@example.com").await;
    let (bob, _) = common::register_user(&app, "bob@example.com").await;

    let exercise = create_exercise(&app, &alice, "Cable Fly").await;
    assert_eq!(exercise["owner_id"], alice_id);
    assert_eq!(exercise["archived"], false);

    let (_, bobs) = common::send(&app, Method::GET, "/api/exercises", Some(&bob), None).await;
    assert!(bobs
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["id"] != exercise["id"]));

    let (status, _) = common::send(
        &app,
        Method::DELETE,
        &format!("/api/exercises/{}", exercise["id"]),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_exercise_name_needs_letters_or_digits() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "punct@example.com").await;

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/exercises",
        Some(&token),
        Some(json!({ "name": "!!!", "muscle_group": "CHEST" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], "name");
}

#[tokio::test]
async fn test_unused_exercise_can_be_deleted() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "unused@example.com").await;
    let exercise = create_exercise(&app, &token, "Landmine Press").await;

    let (status, _) = common::send(
        &app,
        Method::DELETE,
        &format!("/api/exercises/{}", exercise["id"]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_exercise_with_history_must_be_archived() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "history@example.com").await;
    let exercise = create_exercise(&app, &token, "Pec Deck").await;
    let exercise_id = exercise["id"].as_i64().unwrap();

    let (_, session) =
        common::send(&app, Method::POST, "/api/sessions", Some(&token), Some(json!({}))).await;
    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/exercises", session["id"]),
        Some(&token),
        Some(json!({ "exercise_id": exercise_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = common::send(
        &app,
        Method::DELETE,
        &format!("/api/exercises/{}", exercise_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["details"].as_str().unwrap().contains("archive"));

    let (status, archived) = common::send(
        &app,
        Method::POST,
        &format!("/api/exercises/{}/archive", exercise_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(archived["archived"], true);

    let (_, listed) = common::send(&app, Method::GET, "/api/exercises", Some(&token), None).await;
    assert!(listed
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["id"] != exercise_id));
    let (_, all) = common::send(
        &app,
        Method::GET,
        "/api/exercises?include_archived=true",
        Some(&token),
        None,
    )
    .await;
    assert!(all.as_array().unwrap().iter().any(|e| e["id"] == exercise_id));
}

#[tokio::test]
async fn test_builtin_exercise_cannot_be_archived() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "builtin@example.com").await;
    let (_, exercises) = common::send(&app, Method::GET, "/api/exercises", Some(&token), None).await;
    let builtin = exercises
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["owner_id"].is_null())
        .unwrap()
        .clone();

    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/api/exercises/{}/archive", builtin["id"]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_routine_labels_and_activation() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "routine@example.com").await;
    let exercise = create_exercise(&app, &token, "Cable Crossover").await;
    let exercise_id = exercise["id"].as_i64().unwrap();

    let first = create_routine(&app, &token, "Upper Lower", exercise_id).await;
    assert_eq!(first["divisions"][0]["label"], "A");
    assert_eq!(first["divisions"][1]["label"], "B");
    assert_eq!(first["divisions"][0]["exercises"][0]["exercise_name"], "Cable Crossover");
    let second = create_routine(&app, &token, "Bro Split", exercise_id).await;

    for routine in [&first, &second, &first] {
        let (status, activated) = common::send(
            &app,
            Method::POST,
            &format!("/api/routines/{}/activate", routine["id"]),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(activated["is_active"], true);

        let (_, list) = common::send(&app, Method::GET, "/api/routines", Some(&token), None).await;
        let active: Vec<_> = list
            .as_array()
            .unwrap()
            .iter()
            .filter(|r| r["is_active"] == true)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0]["id"], routine["id"]);
    }
}

#[tokio::test]
async fn test_routine_rejects_nested_invalid_field() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "nested@example.com").await;

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/routines",
        Some(&token),
        Some(json!({
            "name": "Broken",
            "divisions": [
                { "name": "Legs", "exercises": [
                    { "exercise_id": 1, "target_sets": 0, "target_reps": "5" }
                ] }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "divisions[0].exercises[0].target_sets");
}

#[tokio::test]
async fn test_used_routine_must_be_archived() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::register_user(&app, "usedroutine@example.com").await;
    let exercise = create_exercise(&app, &token, "Chest Dip").await;
    let routine = create_routine(&app, &token, "Push Day", exercise["id"].as_i64().unwrap()).await;
    let unused = create_routine(&app, &token, "Never Trained", exercise["id"].as_i64().unwrap()).await;

    let division_id = routine["divisions"][0]["id"].as_i64().unwrap();
    let (status, session) = common::send(
        &app,
        Method::POST,
        "/api/sessions",
        Some(&token),
        Some(json!({ "division_id": division_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["exercises"].as_array().unwrap().len(), 1);

    let (status, _) = common::send(
        &app,
        Method::DELETE,
        &format!("/api/routines/{}", routine["id"]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, archived) = common::send(
        &app,
        Method::POST,
        &format!("/api/routines/{}/archive", routine["id"]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(archived["archived"], true);

    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/api/routines/{}/activate", routine["id"]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = common::send(
        &app,
        Method::DELETE,
        &format!("/api/routines/{}", unused["id"]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = common::send(
        &app,
        Method::GET,
        &format!("/api/routines/{}", unused["id"]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
