// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User-built routines made of divisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-authored training plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

/// One training day of a routine (a split, in assessment terms).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Division {
    pub id: i64,
    pub routine_id: i64,
    pub position: u32,
    pub label: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivisionExercise {
    pub id: i64,
    pub division_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub position: u32,
    pub target_sets: u32,
    pub target_reps: String,
    pub target_weight: Option<f64>,
    pub rest_seconds: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DivisionDetail {
    #[serde(flatten)]
    pub division: Division,
    pub exercises: Vec<DivisionExercise>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutineDetail {
    #[serde(flatten)]
    pub routine: Routine,
    pub divisions: Vec<DivisionDetail>,
}
