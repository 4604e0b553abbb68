// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod assessment;
pub mod dashboard;
pub mod exercise;
pub mod progress;
pub mod routine;
pub mod session;
pub mod user;

pub use assessment::{
    AssessmentDetail, SplitDetail, SplitExercise, TrainingFocus, WorkoutAssessment, WorkoutSplit,
};
pub use dashboard::Dashboard;
pub use exercise::{Exercise, MuscleGroup, TargetReps, TargetRepsError};
pub use progress::{
    CalendarDay, PersonalRecord, PersonalRecords, StreakSummary, WeightHistoryEntry, WeightTrend,
};
pub use routine::{Division, DivisionDetail, DivisionExercise, Routine, RoutineDetail};
pub use session::{
    SessionDetail, SessionExercise, SessionExerciseDetail, SessionSource, SessionStatus, SetInput,
    SetLog, SetValidationError, WorkoutSession,
};
pub use user::User;
