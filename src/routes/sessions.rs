// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout session routes, including the set auto-save endpoints.

use crate::db::sessions::{AdHocExercise, CompletedSession};
use crate::db::SessionCursor;
use crate::error::{AppError, JsonBody, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    SessionDetail, SessionExercise, SessionSource, SetInput, SetLog, TargetReps, WorkoutSession,
};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(start_session))
        .route("/api/sessions/active", get(get_active_session))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/complete", post(complete_session))
        .route("/api/sessions/{id}/cancel", post(cancel_session))
        .route("/api/sessions/{id}/exercises", post(add_exercise))
        .route(
            "/api/sessions/{id}/exercises/{instance}/toggle",
            post(toggle_exercise),
        )
        .route(
            "/api/sessions/{id}/exercises/{instance}/sets/{set_number}",
            put(save_set).delete(delete_set),
        )
}

// ─── Lifecycle ───────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct StartSessionRequest {
    pub split_id: Option<i64>,
    pub division_id: Option<i64>,
    pub name: Option<String>,
}

impl StartSessionRequest {
    fn source(&self) -> Result<SessionSource> {
        match (self.split_id, self.division_id) {
            (Some(_), Some(_)) => Err(AppError::BadRequest(
                "Specify at most one of 'split_id' and 'division_id'".to_string(),
            )),
            (Some(id), None) => Ok(SessionSource::Split(id)),
            (None, Some(id)) => Ok(SessionSource::Division(id)),
            (None, None) => Ok(SessionSource::Free),
        }
    }
}

/// Start a session. 409 if one is already in progress.
async fn start_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(body), _): JsonBody<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionDetail>)> {
    let source = body.source()?;
    let detail = state
        .db
        .start_session(user.user_id, source, body.name)
        .await?;
    state.dashboard_cache.invalidate(user.user_id);
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn get_active_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SessionDetail>> {
    state
        .db
        .get_active_session(user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No workout in progress".to_string()))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<SessionDetail>> {
    state
        .db
        .get_session(user.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
}

#[derive(Debug, Deserialize, Default)]
pub struct CompleteSessionRequest {
    pub rating: Option<u8>,
    pub notes: Option<String>,
}

async fn complete_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    WithRejection(Json(body), _): JsonBody<CompleteSessionRequest>,
) -> Result<Json<CompletedSession>> {
    let notes = body.notes.filter(|n| !n.trim().is_empty());
    let completed = state
        .db
        .complete_session(user.user_id, id, body.rating, notes)
        .await?;
    state.dashboard_cache.invalidate(user.user_id);
    Ok(Json(completed))
}

async fn cancel_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<WorkoutSession>> {
    let session = state.db.cancel_session(user.user_id, id).await?;
    state.dashboard_cache.invalidate(user.user_id);
    Ok(Json(session))
}

// ─── Exercises & Sets ────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddExerciseRequest {
    pub exercise_id: i64,
    #[serde(default = "default_target_sets")]
    pub target_sets: u32,
    #[serde(default = "default_target_reps")]
    pub target_reps: String,
    pub target_weight: Option<f64>,
}

fn default_target_sets() -> u32 {
    3
}
fn default_target_reps() -> String {
    "8-12".to_string()
}

async fn add_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    WithRejection(Json(body), _): JsonBody<AddExerciseRequest>,
) -> Result<(StatusCode, Json<SessionExercise>)> {
    if !(1..=10).contains(&body.target_sets) {
        return Err(AppError::validation("target_sets", "must be between 1 and 10"));
    }
    let target_reps = body
        .target_reps
        .parse::<TargetReps>()
        .map_err(|e| AppError::validation("target_reps", e.to_string()))?;

    let exercise = state
        .db
        .add_session_exercise(
            user.user_id,
            id,
            AdHocExercise {
                exercise_id: body.exercise_id,
                target_sets: body.target_sets,
                target_reps,
                target_weight: body.target_weight,
            },
        )
        .await?;
    state.dashboard_cache.invalidate(user.user_id);
    Ok((StatusCode::CREATED, Json(exercise)))
}

async fn toggle_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, instance)): Path<(i64, i64)>,
) -> Result<Json<SessionExercise>> {
    let exercise = state.db.toggle_exercise(user.user_id, id, instance).await?;
    state.dashboard_cache.invalidate(user.user_id);
    Ok(Json(exercise))
}

/// Auto-save one set. Idempotent: repeating the request leaves one record.
///
/// Invalid input is rejected before anything is written.
async fn save_set(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, instance, set_number)): Path<(i64, i64, u32)>,
    WithRejection(Json(body), _): JsonBody<SetInput>,
) -> Result<Json<SetLog>> {
    body.validate(set_number)?;
    let set = state
        .db
        .upsert_set(user.user_id, id, instance, set_number, body)
        .await?;
    Ok(Json(set))
}

async fn delete_set(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, instance, set_number)): Path<(i64, i64, u32)>,
) -> Result<StatusCode> {
    let deleted = state
        .db
        .delete_set(user.user_id, id, instance, set_number)
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Set {} not found", set_number)))
    }
}

// ─── History ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct SessionsQuery {
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    /// Items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    20
}

const MAX_PER_PAGE: u32 = 100;
const CURSOR_PARTS: usize = 3;

fn parse_cursor(cursor: Option<&str>) -> Result<Option<SessionCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor = || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            let parts: Vec<&str> = decoded_str.split(':').collect();
            if parts.len() != CURSOR_PARTS {
                return Err(invalid_cursor());
            }

            let seconds = parts[0].parse::<i64>().map_err(|_| invalid_cursor())?;
            let nanos = parts[1].parse::<u32>().map_err(|_| invalid_cursor())?;
            let id = parts[2].parse::<i64>().map_err(|_| invalid_cursor())?;
            let started_at =
                chrono::DateTime::from_timestamp(seconds, nanos).ok_or_else(invalid_cursor)?;

            Ok(SessionCursor { started_at, id })
        })
        .transpose()
}

fn encode_cursor(cursor: &SessionCursor) -> String {
    let payload = format!(
        "{}:{}:{}",
        cursor.started_at.timestamp(),
        cursor.started_at.timestamp_subsec_nanos(),
        cursor.id
    );
    URL_SAFE_NO_PAD.encode(payload)
}

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub name: String,
    pub status: String,
    pub started_at: String,
    pub completed_at: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub duration_seconds: Option<i64>,
    pub rating: Option<u8>,
}

impl From<WorkoutSession> for SessionSummary {
    fn from(s: WorkoutSession) -> Self {
        Self {
            id: s.id,
            name: s.name,
            status: s.status.as_str().to_string(),
            started_at: format_utc_rfc3339(s.started_at),
            completed_at: s.completed_at.map(format_utc_rfc3339),
            duration_seconds: s.duration_seconds,
            rating: s.rating,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
    pub per_page: u32,
    pub next_cursor: Option<String>,
}

/// Session history, newest first.
async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SessionsQuery>,
) -> Result<Json<SessionsResponse>> {
    tracing::debug!(
        user_id = user.user_id,
        cursor = ?params.cursor,
        per_page = params.per_page,
        "Fetching session history"
    );

    if params.per_page == 0 {
        return Err(AppError::BadRequest(
            "'per_page' must be greater than 0".to_string(),
        ));
    }
    let limit = params.per_page.min(MAX_PER_PAGE);
    let cursor = parse_cursor(params.cursor.as_deref())?;

    let (sessions, next) = state.db.list_sessions(user.user_id, cursor, limit).await?;

    Ok(Json(SessionsResponse {
        sessions: sessions.into_iter().map(SessionSummary::from).collect(),
        per_page: limit,
        next_cursor: next.as_ref().map(encode_cursor),
    }))
}
