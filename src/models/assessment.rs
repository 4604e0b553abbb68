// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Assessment, split and split-exercise models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Training focus chosen during the assessment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingFocus {
    Legs,
    Arms,
    FullBody,
    Core,
}

impl TrainingFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingFocus::Legs => "LEGS",
            TrainingFocus::Arms => "ARMS",
            TrainingFocus::FullBody => "FULL_BODY",
            TrainingFocus::Core => "CORE",
        }
    }

    pub fn all() -> &'static [TrainingFocus] {
        &[
            TrainingFocus::Legs,
            TrainingFocus::Arms,
            TrainingFocus::FullBody,
            TrainingFocus::Core,
        ]
    }
}

impl FromStr for TrainingFocus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LEGS" => Ok(TrainingFocus::Legs),
            "ARMS" => Ok(TrainingFocus::Arms),
            "FULL_BODY" => Ok(TrainingFocus::FullBody),
            "CORE" => Ok(TrainingFocus::Core),
            other => Err(format!(
                "unknown training focus '{}'; expected one of LEGS, ARMS, FULL_BODY, CORE",
                other
            )),
        }
    }
}

/// A user's stated preferences and the plan generated from them.
///
/// Superseded rather than edited: a new assessment deactivates the previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutAssessment {
    pub id: i64,
    pub user_id: i64,
    /// Sessions per week (3..=6), equal to the number of splits
    pub frequency: u8,
    pub training_focus: TrainingFocus,
    /// Index of the split the user should train next
    pub current_split_index: u8,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub superseded_at: Option<DateTime<Utc>>,
}

/// One lettered day of a generated plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSplit {
    pub id: i64,
    pub assessment_id: i64,
    pub position: u8,
    /// "A", "B", ...
    pub label: String,
    pub name: String,
    pub subtitle: Option<String>,
}

/// Prescribed exercise within a split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitExercise {
    pub id: i64,
    pub split_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub position: u32,
    pub target_sets: u32,
    /// "8", "8-12" or "AMRAP"
    pub target_reps: String,
    pub target_weight: Option<f64>,
    pub rest_seconds: Option<u32>,
    pub notes: Option<String>,
    pub video_url: Option<String>,
}

/// Split with its exercises and how often it has been completed.
#[derive(Debug, Clone, Serialize)]
pub struct SplitDetail {
    #[serde(flatten)]
    pub split: WorkoutSplit,
    pub exercises: Vec<SplitExercise>,
    pub completed_sessions: u32,
    pub is_current: bool,
}

/// Assessment -> splits -> exercises tree returned to the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentDetail {
    #[serde(flatten)]
    pub assessment: WorkoutAssessment,
    pub splits: Vec<SplitDetail>,
}

impl AssessmentDetail {
    /// The split the user should train next, if the plan has any.
    pub fn current_split(&self) -> Option<&SplitDetail> {
        self.splits
            .get(self.assessment.current_split_index as usize)
            .or_else(|| self.splits.first())
    }
}
