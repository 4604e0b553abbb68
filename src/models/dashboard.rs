//! Dashboard view model (cached per user).

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::progress::StreakSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NextSplit {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub split_id: i64,
    pub label: String,
    pub name: String,
    pub exercise_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActiveSessionSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub session_id: i64,
    pub name: String,
    pub started_at: String,
    pub completion_percentage: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecentSession {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub session_id: i64,
    pub name: String,
    pub completed_at: String,
    pub duration_seconds: Option<i64>,
    pub rating: Option<u8>,
}

/// Everything the home screen needs in one response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Dashboard {
    pub display_name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub assessment_id: Option<i64>,
    pub next_split: Option<NextSplit>,
    pub active_session: Option<ActiveSessionSummary>,
    pub streak: StreakSummary,
    pub sessions_this_week: u32,
    pub recent_sessions: Vec<RecentSession>,
}
