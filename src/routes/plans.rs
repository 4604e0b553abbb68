// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan routes: assessments with their generated splits, and routines.

use crate::db::plans::{NewDivision, NewDivisionExercise, NewRoutine, SplitUpdate};
use crate::error::{AppError, JsonBody, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    AssessmentDetail, Routine, RoutineDetail, TargetReps, WorkoutAssessment, WorkoutSplit,
};
use crate::models::session::MAX_SET_WEIGHT;
use crate::services::split_generator::generate_splits_from_input;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

const MAX_DIVISIONS: usize = 7;
const MAX_EXERCISES_PER_DIVISION: usize = 20;
const MAX_TARGET_SETS: u32 = 10;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/assessments", get(list_assessments).post(create_assessment))
        .route("/api/assessments/active", get(get_active_assessment))
        .route("/api/splits/{id}", patch(update_split))
        .route("/api/routines", get(list_routines).post(create_routine))
        .route("/api/routines/{id}", get(get_routine).delete(delete_routine))
        .route("/api/routines/{id}/activate", post(activate_routine))
        .route("/api/routines/{id}/archive", post(archive_routine))
}

// ─── Assessments ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssessmentRequest {
    pub frequency: i64,
    pub training_focus: String,
}

/// Run the assessment: generate splits and make them the active plan.
async fn create_assessment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(body), _): JsonBody<AssessmentRequest>,
) -> Result<(StatusCode, Json<AssessmentDetail>)> {
    // Nothing is written unless generation succeeds.
    let (focus, splits) = generate_splits_from_input(body.frequency, &body.training_focus)?;
    let frequency = splits.len() as u8;

    let detail = state
        .db
        .create_assessment(user.user_id, frequency, focus, splits)
        .await?;
    state.dashboard_cache.invalidate(user.user_id);

    Ok((StatusCode::CREATED, Json(detail)))
}

async fn get_active_assessment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AssessmentDetail>> {
    state
        .db
        .get_active_assessment(user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound("No active assessment; complete an assessment first".to_string())
        })
}

async fn list_assessments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<WorkoutAssessment>>> {
    Ok(Json(state.db.list_assessments(user.user_id).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSplitRequest {
    #[validate(length(min = 1, max = 60, message = "must be between 1 and 60 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 120, message = "must be at most 120 characters"))]
    pub subtitle: Option<String>,
}

async fn update_split(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    WithRejection(Json(body), _): JsonBody<UpdateSplitRequest>,
) -> Result<Json<WorkoutSplit>> {
    body.validate()?;
    let split = state
        .db
        .update_split(
            user.user_id,
            id,
            SplitUpdate {
                name: body.name.map(|n| n.trim().to_string()),
                subtitle: body.subtitle.map(|s| s.trim().to_string()),
            },
        )
        .await?;
    state.dashboard_cache.invalidate(user.user_id);
    Ok(Json(split))
}

// ─── Routines ────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct DivisionExerciseRequest {
    pub exercise_id: i64,
    pub target_sets: u32,
    pub target_reps: String,
    pub target_weight: Option<f64>,
    pub rest_seconds: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DivisionRequest {
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<DivisionExerciseRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoutineRequest {
    #[validate(length(min = 1, max = 80, message = "must be between 1 and 80 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub divisions: Vec<DivisionRequest>,
}

impl CreateRoutineRequest {
    /// Validate nested divisions and convert, reporting the exact field path.
    fn into_new_routine(self) -> Result<NewRoutine> {
        self.validate()?;
        if self.divisions.len() > MAX_DIVISIONS {
            return Err(AppError::validation(
                "divisions",
                format!("a routine has at most {} divisions", MAX_DIVISIONS),
            ));
        }

        let mut divisions = Vec::with_capacity(self.divisions.len());
        for (d, division) in self.divisions.into_iter().enumerate() {
            let name = division.name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::validation(
                    format!("divisions[{}].name", d),
                    "must not be blank",
                ));
            }
            if division.exercises.len() > MAX_EXERCISES_PER_DIVISION {
                return Err(AppError::validation(
                    format!("divisions[{}].exercises", d),
                    format!("at most {} exercises per division", MAX_EXERCISES_PER_DIVISION),
                ));
            }

            let mut exercises = Vec::with_capacity(division.exercises.len());
            for (e, ex) in division.exercises.into_iter().enumerate() {
                let field = |name: &str| format!("divisions[{}].exercises[{}].{}", d, e, name);

                if !(1..=MAX_TARGET_SETS).contains(&ex.target_sets) {
                    return Err(AppError::validation(
                        field("target_sets"),
                        format!("must be between 1 and {}", MAX_TARGET_SETS),
                    ));
                }
                let target_reps = ex
                    .target_reps
                    .parse::<TargetReps>()
                    .map_err(|err| AppError::validation(field("target_reps"), err.to_string()))?;
                if let Some(w) = ex.target_weight {
                    if !w.is_finite() || !(0.0..=MAX_SET_WEIGHT).contains(&w) {
                        return Err(AppError::validation(
                            field("target_weight"),
                            format!("must be between 0 and {}", MAX_SET_WEIGHT),
                        ));
                    }
                }

                exercises.push(NewDivisionExercise {
                    exercise_id: ex.exercise_id,
                    target_sets: ex.target_sets,
                    target_reps,
                    target_weight: ex.target_weight,
                    rest_seconds: ex.rest_seconds,
                    notes: ex.notes.filter(|n| !n.trim().is_empty()),
                });
            }
            divisions.push(NewDivision { name, exercises });
        }

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("name", "must not be blank"));
        }
        Ok(NewRoutine {
            name,
            description: self.description.filter(|d| !d.trim().is_empty()),
            divisions,
        })
    }
}

async fn create_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(body), _): JsonBody<CreateRoutineRequest>,
) -> Result<(StatusCode, Json<RoutineDetail>)> {
    let routine = body.into_new_routine()?;
    let detail = state.db.create_routine(user.user_id, routine).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[derive(Deserialize)]
struct RoutinesQuery {
    #[serde(default)]
    include_archived: bool,
}

async fn list_routines(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<RoutinesQuery>,
) -> Result<Json<Vec<Routine>>> {
    Ok(Json(
        state
            .db
            .list_routines(user.user_id, params.include_archived)
            .await?,
    ))
}

async fn get_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<RoutineDetail>> {
    state
        .db
        .get_routine(user.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Routine {} not found", id)))
}

async fn activate_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Routine>> {
    let routine = state.db.activate_routine(user.user_id, id).await?;
    state.dashboard_cache.invalidate(user.user_id);
    Ok(Json(routine))
}

async fn archive_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Routine>> {
    let routine = state.db.archive_routine(user.user_id, id).await?;
    state.dashboard_cache.invalidate(user.user_id);
    Ok(Json(routine))
}

/// Delete a routine. Rejected with 409 once sessions reference it.
async fn delete_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.db.delete_routine(user.user_id, id).await?;
    state.dashboard_cache.invalidate(user.user_id);
    Ok(StatusCode::NO_CONTENT)
}
