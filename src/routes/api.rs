// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: profile, dashboard, and progress.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::dashboard::{ActiveSessionSummary, NextSplit, RecentSession};
use crate::models::{CalendarDay, Dashboard, StreakSummary};
use crate::routes::auth::UserResponse;
use crate::services::progress::{calendar, sessions_in_week, streak_summary};
use crate::time_utils::{format_utc_rfc3339, parse_month, today_utc};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Number of completed sessions shown on the dashboard.
const RECENT_SESSIONS: u32 = 5;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/progress/streak", get(get_streak))
        .route("/api/progress/calendar", get(get_calendar))
}

// ─── User Profile ────────────────────────────────────────────

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;
    Ok(Json(profile.into()))
}

// ─── Dashboard ───────────────────────────────────────────────

/// Get the dashboard, from cache when fresh.
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Dashboard>> {
    if let Some(dashboard) = state.dashboard_cache.get(user.user_id) {
        tracing::debug!(user_id = user.user_id, "Dashboard cache hit");
        return Ok(Json(dashboard));
    }

    // Read before building so a write during the build keeps this result
    // out of the cache.
    let generation = state.dashboard_cache.generation(user.user_id);
    let dashboard = build_dashboard(&state, user.user_id).await?;
    state
        .dashboard_cache
        .insert(user.user_id, generation, dashboard.clone());
    Ok(Json(dashboard))
}

/// Assemble the dashboard from the database.
pub async fn build_dashboard(state: &AppState, user_id: i64) -> Result<Dashboard> {
    let profile = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    let assessment = state.db.get_active_assessment(user_id).await?;
    let next_split = assessment
        .as_ref()
        .and_then(|a| a.current_split())
        .map(|s| NextSplit {
            split_id: s.split.id,
            label: s.split.label.clone(),
            name: s.split.name.clone(),
            exercise_count: s.exercises.len() as u32,
        });

    let active_session = state
        .db
        .get_active_session(user_id)
        .await?
        .map(|s| ActiveSessionSummary {
            session_id: s.session.id,
            name: s.session.name,
            started_at: format_utc_rfc3339(s.session.started_at),
            completion_percentage: s.completion_percentage,
        });

    let completions = state.db.completion_dates(user_id).await?;
    let today = today_utc();

    let recent_sessions = state
        .db
        .recent_completed_sessions(user_id, RECENT_SESSIONS)
        .await?
        .into_iter()
        .filter_map(|s| {
            Some(RecentSession {
                session_id: s.id,
                name: s.name,
                completed_at: format_utc_rfc3339(s.completed_at?),
                duration_seconds: s.duration_seconds,
                rating: s.rating,
            })
        })
        .collect();

    Ok(Dashboard {
        display_name: profile.display_name,
        assessment_id: assessment.map(|a| a.assessment.id),
        next_split,
        active_session,
        streak: streak_summary(&completions, today),
        sessions_this_week: sessions_in_week(&completions, today),
        recent_sessions,
    })
}

// ─── Progress ────────────────────────────────────────────────

/// Current and longest streaks.
async fn get_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakSummary>> {
    let completions = state.db.completion_dates(user.user_id).await?;
    Ok(Json(streak_summary(&completions, today_utc())))
}

#[derive(Deserialize)]
struct CalendarQuery {
    /// Month as `YYYY-MM`; defaults to the current month
    month: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarResponse {
    pub month: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "Array<{ date: string, completed_sessions: number }>"))]
    pub days: Vec<CalendarDay>,
    pub total_completed: u32,
}

/// Completed sessions per day for one month.
async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>> {
    let (year, month) = match params.month.as_deref() {
        Some(raw) => parse_month(raw).ok_or_else(|| {
            AppError::BadRequest("Invalid 'month' parameter: expected YYYY-MM".to_string())
        })?,
        None => {
            let today = today_utc();
            (chrono::Datelike::year(&today), chrono::Datelike::month(&today))
        }
    };

    let completions = state.db.completion_dates(user.user_id).await?;
    let days = calendar(&completions, year, month)
        .ok_or_else(|| AppError::BadRequest("Invalid 'month' parameter".to_string()))?;
    let total_completed = days.iter().map(|d| d.completed_sessions).sum();

    Ok(Json(CalendarResponse {
        month: format!("{:04}-{:02}", year, month),
        days,
        total_completed,
    }))
}
