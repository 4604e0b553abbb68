// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak, trend and personal-record aggregation.
//!
//! Everything here is a pure function over rows already read from the
//! database. Calendar days are UTC days.

use crate::models::{
    CalendarDay, PersonalRecord, PersonalRecords, SetLog, StreakSummary, WeightHistoryEntry,
    WeightTrend,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Relative slope (per session, as a fraction of the mean top weight) below
/// which a trend counts as stable.
const TREND_THRESHOLD: f64 = 0.01;

/// Distinct completion days, most recent first.
fn distinct_days_desc(completions: &[DateTime<Utc>]) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = completions.iter().map(|c| c.date_naive()).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();
    days
}

/// Consecutive calendar days with at least one completion, counting back
/// from `today`.
///
/// The streak may start today or yesterday (a workout not yet done today does
/// not break it) and stops at the first gap greater than one day.
pub fn current_streak(completions: &[DateTime<Utc>], today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut anchor = today;

    for day in distinct_days_desc(completions) {
        if day > anchor {
            // Completions in the future relative to `today` are ignored.
            continue;
        }
        if (anchor - day).num_days() > 1 {
            break;
        }
        streak += 1;
        anchor = day;
    }

    streak
}

/// Longest run of consecutive completion days ever recorded.
pub fn longest_streak(completions: &[DateTime<Utc>]) -> u32 {
    let days = distinct_days_desc(completions);
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous {
            Some(prev) if (prev - day).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    longest
}

pub fn streak_summary(completions: &[DateTime<Utc>], today: NaiveDate) -> StreakSummary {
    StreakSummary {
        current_streak: current_streak(completions, today),
        longest_streak: longest_streak(completions),
        total_completed: completions.len() as u32,
    }
}

/// Completions in the Monday-based week containing `today`.
pub fn sessions_in_week(completions: &[DateTime<Utc>], today: NaiveDate) -> u32 {
    let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let week_end = week_start + Duration::days(7);
    completions
        .iter()
        .map(|c| c.date_naive())
        .filter(|d| *d >= week_start && *d < week_end)
        .count() as u32
}

/// Per-day completion counts for every day of a month.
///
/// Returns `None` for an invalid year/month.
pub fn calendar(completions: &[DateTime<Utc>], year: i32, month: u32) -> Option<Vec<CalendarDay>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for c in completions {
        let day = c.date_naive();
        if day >= first && day < next_month {
            *counts.entry(day).or_insert(0) += 1;
        }
    }

    Some(
        first
            .iter_days()
            .take_while(|d| *d < next_month)
            .map(|date| CalendarDay {
                date,
                completed_sessions: counts.get(&date).copied().unwrap_or(0),
            })
            .collect(),
    )
}

/// Integer completion percentage, 0 when there is nothing to complete.
pub fn completion_percentage(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done.min(total) * 100) / total) as u8
}

/// Summary of one exercise's completed sets within a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetSummary {
    pub top_weight: f64,
    pub top_reps: u32,
    pub total_volume: f64,
    pub set_count: u32,
}

/// Summarise the completed sets of an exercise. `None` if no set was completed.
pub fn summarize_sets<'a, I>(sets: I) -> Option<SetSummary>
where
    I: IntoIterator<Item = &'a SetLog>,
{
    let mut summary: Option<SetSummary> = None;

    for set in sets.into_iter().filter(|s| s.completed) {
        let s = summary.get_or_insert(SetSummary {
            top_weight: set.weight,
            top_reps: set.reps,
            total_volume: 0.0,
            set_count: 0,
        });
        if set.weight > s.top_weight || (set.weight == s.top_weight && set.reps > s.top_reps) {
            s.top_weight = set.weight;
            s.top_reps = set.reps;
        }
        s.total_volume += set.volume();
        s.set_count += 1;
    }

    summary
}

/// Direction of the top weight over the history (oldest first).
///
/// Uses the least-squares slope of top weight against session order,
/// relative to the mean.
pub fn weight_trend(history: &[WeightHistoryEntry]) -> WeightTrend {
    let n = history.len();
    if n < 2 {
        return WeightTrend::Stable;
    }

    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = history.iter().map(|h| h.top_weight).sum::<f64>() / n_f;

    let (mut cov, mut var) = (0.0, 0.0);
    for (i, h) in history.iter().enumerate() {
        let dx = i as f64 - mean_x;
        cov += dx * (h.top_weight - mean_y);
        var += dx * dx;
    }
    let slope = cov / var;

    // Bodyweight-only history: compare absolute slope instead.
    let relative = if mean_y.abs() > f64::EPSILON {
        slope / mean_y
    } else {
        slope
    };

    if relative > TREND_THRESHOLD {
        WeightTrend::Increasing
    } else if relative < -TREND_THRESHOLD {
        WeightTrend::Decreasing
    } else {
        WeightTrend::Stable
    }
}

fn best_by<F>(history: &[WeightHistoryEntry], value: F) -> Option<PersonalRecord>
where
    F: Fn(&WeightHistoryEntry) -> f64,
{
    // Earliest entry wins ties so a record keeps the date it was first set.
    history.iter().fold(None, |best: Option<PersonalRecord>, h| {
        let v = value(h);
        match best {
            Some(b) if b.value >= v => Some(b),
            _ => Some(PersonalRecord {
                value: v,
                achieved_at: h.recorded_at,
            }),
        }
    })
}

/// Max weight, max reps at top weight, and best session volume.
pub fn personal_records(history: &[WeightHistoryEntry]) -> PersonalRecords {
    PersonalRecords {
        max_weight: best_by(history, |h| h.top_weight),
        max_reps: best_by(history, |h| h.top_reps as f64),
        max_volume: best_by(history, |h| h.total_volume),
    }
}
