// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise library routes.

use crate::db::sqlite::NewExercise;
use crate::error::{AppError, JsonBody, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Exercise, MuscleGroup, PersonalRecords, WeightHistoryEntry, WeightTrend};
use crate::services::progress::{personal_records, weight_trend};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/exercises", get(list_exercises).post(create_exercise))
        .route("/api/exercises/{id}", delete(delete_exercise))
        .route("/api/exercises/{id}/archive", post(archive_exercise))
        .route("/api/exercises/{id}/progress", get(get_exercise_progress))
}

#[derive(Deserialize)]
struct ExercisesQuery {
    muscle_group: Option<String>,
    #[serde(default)]
    include_archived: bool,
}

async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ExercisesQuery>,
) -> Result<Json<Vec<Exercise>>> {
    let muscle_group = params
        .muscle_group
        .as_deref()
        .map(|raw| {
            raw.parse::<MuscleGroup>()
                .map_err(|e| AppError::validation("muscle_group", e))
        })
        .transpose()?;

    let exercises = state
        .db
        .list_exercises(user.user_id, muscle_group, params.include_archived)
        .await?;
    Ok(Json(exercises))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExerciseRequest {
    #[validate(length(min = 1, max = 80, message = "must be between 1 and 80 characters"))]
    pub name: String,
    pub muscle_group: String,
    #[validate(length(max = 40, message = "must be at most 40 characters"))]
    pub equipment: Option<String>,
}

async fn create_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(body), _): JsonBody<CreateExerciseRequest>,
) -> Result<(StatusCode, Json<Exercise>)> {
    body.validate()?;
    if body.name.trim().is_empty() {
        return Err(AppError::validation("name", "must not be blank"));
    }
    let muscle_group = body
        .muscle_group
        .parse::<MuscleGroup>()
        .map_err(|e| AppError::validation("muscle_group", e))?;

    let exercise = state
        .db
        .create_exercise(
            user.user_id,
            NewExercise {
                name: body.name,
                muscle_group,
                equipment: body.equipment.filter(|e| !e.trim().is_empty()),
            },
        )
        .await?;

    tracing::info!(user_id = user.user_id, exercise_id = exercise.id, "Created custom exercise");
    Ok((StatusCode::CREATED, Json(exercise)))
}

async fn archive_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Exercise>> {
    let exercise = state.db.archive_exercise(user.user_id, id).await?;
    Ok(Json(exercise))
}

/// Delete a custom exercise. Rejected with 409 when it has history.
async fn delete_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.db.delete_exercise(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct ExerciseProgressResponse {
    pub exercise: Exercise,
    pub history: Vec<WeightHistoryEntry>,
    pub trend: WeightTrend,
    pub records: PersonalRecords,
}

/// Weight history with trend and personal records.
async fn get_exercise_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ExerciseProgressResponse>> {
    let exercise = state
        .db
        .get_exercise(user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", id)))?;
    let history = state.db.weight_history(user.user_id, id).await?;

    Ok(Json(ExerciseProgressResponse {
        trend: weight_trend(&history),
        records: personal_records(&history),
        exercise,
        history,
    }))
}
