// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout session, exercise instance and set log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Heaviest load accepted for a single set, in kilograms.
pub const MAX_SET_WEIGHT: f64 = 1000.0;
/// Most reps accepted for a single set.
pub const MAX_SET_REPS: u32 = 1000;
/// Highest set number accepted per exercise instance.
pub const MAX_SET_NUMBER: u32 = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "IN_PROGRESS",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_PROGRESS" => Ok(SessionStatus::InProgress),
            "COMPLETED" => Ok(SessionStatus::Completed),
            "CANCELLED" => Ok(SessionStatus::Cancelled),
            other => Err(format!("unknown session status '{}'", other)),
        }
    }
}

/// What a session was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    Split(i64),
    Division(i64),
    /// Ad-hoc session with no prescribed exercises
    Free,
}

/// A timed record of one training occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: i64,
    pub user_id: i64,
    pub split_id: Option<i64>,
    pub division_id: Option<i64>,
    pub name: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    /// 1..=5, set on completion
    pub rating: Option<u8>,
    pub notes: Option<String>,
}

/// An exercise performed within a session; sets are logged against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExercise {
    pub id: i64,
    pub session_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub split_exercise_id: Option<i64>,
    pub position: u32,
    pub target_sets: u32,
    pub target_reps: String,
    pub target_weight: Option<f64>,
    pub completed: bool,
}

/// One logged set. Unique per (session exercise, set number).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetLog {
    pub id: i64,
    pub session_exercise_id: i64,
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl SetLog {
    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }
}

/// Values submitted by the auto-save endpoint for one set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SetInput {
    pub weight: f64,
    /// Signed so that negative input reaches validation instead of failing to parse
    pub reps: i64,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SetValidationError {
    #[error("weight must be a number between 0 and {}", MAX_SET_WEIGHT)]
    Weight,

    #[error("reps must be between 1 and {}", MAX_SET_REPS)]
    Reps,

    #[error("set number must be between 1 and {}", MAX_SET_NUMBER)]
    SetNumber,
}

impl SetValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            SetValidationError::Weight => "weight",
            SetValidationError::Reps => "reps",
            SetValidationError::SetNumber => "set_number",
        }
    }
}

impl From<SetValidationError> for crate::error::AppError {
    fn from(err: SetValidationError) -> Self {
        crate::error::AppError::validation(err.field(), err.to_string())
    }
}

impl SetInput {
    /// Reject values that must never reach storage.
    pub fn validate(&self, set_number: u32) -> Result<(), SetValidationError> {
        if set_number == 0 || set_number > MAX_SET_NUMBER {
            return Err(SetValidationError::SetNumber);
        }
        if !self.weight.is_finite() || self.weight < 0.0 || self.weight > MAX_SET_WEIGHT {
            return Err(SetValidationError::Weight);
        }
        if self.reps < 1 || self.reps > MAX_SET_REPS as i64 {
            return Err(SetValidationError::Reps);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExerciseDetail {
    #[serde(flatten)]
    pub exercise: SessionExercise,
    pub sets: Vec<SetLog>,
}

/// Session with its exercises, sets and completion percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: WorkoutSession,
    pub exercises: Vec<SessionExerciseDetail>,
    pub completion_percentage: u8,
}
