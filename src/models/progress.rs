//! Weight history and derived progress statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Append-only per-exercise summary written when a session completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightHistoryEntry {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub session_id: i64,
    /// Heaviest completed set
    pub top_weight: f64,
    /// Reps performed at the top weight
    pub top_reps: u32,
    /// Sum of weight x reps over completed sets
    pub total_volume: f64,
    pub set_count: u32,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeightTrend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PersonalRecord {
    pub value: f64,
    pub achieved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonalRecords {
    pub max_weight: Option<PersonalRecord>,
    pub max_reps: Option<PersonalRecord>,
    /// Best single-session volume
    pub max_volume: Option<PersonalRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub completed_sessions: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completed: u32,
}
