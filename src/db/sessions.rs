// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout sessions, auto-saved set logs, and weight history.

use crate::db::plans::active_assessment;
use crate::db::sqlite::visible_exercise;
use crate::db::{is_constraint_violation, FromSqliteRow, SqliteDb};
use crate::error::AppError;
use crate::models::{
    SessionDetail, SessionExercise, SessionExerciseDetail, SessionSource, SessionStatus, SetInput,
    SetLog, TargetReps, WeightHistoryEntry, WorkoutSession,
};
use crate::services::progress::{completion_percentage, summarize_sets};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

/// Position in the session history: the last row of the previous page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCursor {
    pub started_at: DateTime<Utc>,
    pub id: i64,
}

/// Exercise added to a session by hand.
#[derive(Debug, Clone)]
pub struct AdHocExercise {
    pub exercise_id: i64,
    pub target_sets: u32,
    pub target_reps: TargetReps,
    pub target_weight: Option<f64>,
}

/// Result of finishing a session.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedSession {
    #[serde(flatten)]
    pub detail: SessionDetail,
    /// Rows appended to the weight history
    pub history_entries: usize,
    /// Index of the split that is now current, if the session advanced it
    pub next_split_index: Option<u8>,
}

impl FromSqliteRow for WorkoutSession {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            split_id: row.get("split_id")?,
            division_id: row.get("division_id")?,
            name: row.get("name")?,
            status: row.get("status")?,
            started_at: row.get("started_at")?,
            completed_at: row.get("completed_at")?,
            duration_seconds: row.get("duration_seconds")?,
            rating: row.get("rating")?,
            notes: row.get("notes")?,
        })
    }
}

impl FromSqliteRow for SessionExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            session_id: row.get("session_id")?,
            exercise_id: row.get("exercise_id")?,
            exercise_name: row.get("exercise_name")?,
            split_exercise_id: row.get("split_exercise_id")?,
            position: row.get("position")?,
            target_sets: row.get("target_sets")?,
            target_reps: row.get("target_reps")?,
            target_weight: row.get("target_weight")?,
            completed: row.get("completed")?,
        })
    }
}

impl FromSqliteRow for SetLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            session_exercise_id: row.get("session_exercise_id")?,
            set_number: row.get("set_number")?,
            weight: row.get("weight")?,
            reps: row.get("reps")?,
            completed: row.get("completed")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl FromSqliteRow for WeightHistoryEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            exercise_id: row.get("exercise_id")?,
            session_id: row.get("session_id")?,
            top_weight: row.get("top_weight")?,
            top_reps: row.get("top_reps")?,
            total_volume: row.get("total_volume")?,
            set_count: row.get("set_count")?,
            recorded_at: row.get("recorded_at")?,
        })
    }
}

const ACTIVE_SESSION_CONFLICT: &str =
    "You already have an active session; finish or cancel it before starting another";

impl SqliteDb {
    // ─── Session Lifecycle ───────────────────────────────────────

    /// Start a session, copying the planned exercises of its source.
    ///
    /// The one-in-progress-session rule is checked inside an IMMEDIATE
    /// transaction and backed by a partial unique index.
    pub async fn start_session(
        &self,
        user_id: i64,
        source: SessionSource,
        name: Option<String>,
    ) -> Result<SessionDetail, AppError> {
        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let active: Option<i64> = tx
                .query_row(
                    "SELECT id FROM workout_sessions WHERE user_id = ?1 AND status = 'IN_PROGRESS'",
                    params![user_id],
                    |r| r.get(0),
                )
                .optional()?;
            if let Some(active_id) = active {
                tracing::debug!(user_id, active_id, "Rejected second active session");
                return Err(AppError::Conflict(ACTIVE_SESSION_CONFLICT.to_string()));
            }

            let (split_id, division_id, default_name) = match source {
                SessionSource::Split(split_id) => {
                    let (label, split_name): (String, String) = tx
                        .query_row(
                            "SELECT s.label, s.name FROM splits s
                             JOIN assessments a ON a.id = s.assessment_id
                             WHERE s.id = ?1 AND a.user_id = ?2",
                            params![split_id, user_id],
                            |r| Ok((r.get(0)?, r.get(1)?)),
                        )
                        .optional()?
                        .ok_or_else(|| AppError::NotFound(format!("Split {} not found", split_id)))?;
                    (Some(split_id), None, format!("Split {}: {}", label, split_name))
                }
                SessionSource::Division(division_id) => {
                    let (label, division_name, archived): (String, String, bool) = tx
                        .query_row(
                            "SELECT d.label, d.name, r.archived FROM divisions d
                             JOIN routines r ON r.id = d.routine_id
                             WHERE d.id = ?1 AND r.user_id = ?2",
                            params![division_id, user_id],
                            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
                        )
                        .optional()?
                        .ok_or_else(|| {
                            AppError::NotFound(format!("Division {} not found", division_id))
                        })?;
                    if archived {
                        return Err(AppError::Conflict(
                            "This routine is archived; activate another routine to train from it"
                                .to_string(),
                        ));
                    }
                    (None, Some(division_id), format!("Division {}: {}", label, division_name))
                }
                SessionSource::Free => (None, None, "Free workout".to_string()),
            };

            let name = name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or(default_name);

            let inserted = tx.execute(
                "INSERT INTO workout_sessions (user_id, split_id, division_id, name, status, started_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![user_id, split_id, division_id, name, SessionStatus::InProgress, Utc::now()],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => {
                    return Err(AppError::Conflict(ACTIVE_SESSION_CONFLICT.to_string()))
                }
                Err(e) => return Err(e.into()),
            }
            let session_id = tx.last_insert_rowid();

            if let Some(split_id) = split_id {
                tx.execute(
                    "INSERT INTO session_exercises
                         (session_id, exercise_id, split_exercise_id, position, target_sets, target_reps, target_weight, completed)
                     SELECT ?1, exercise_id, id, position, target_sets, target_reps, target_weight, 0
                     FROM split_exercises WHERE split_id = ?2 ORDER BY position",
                    params![session_id, split_id],
                )?;
            }
            if let Some(division_id) = division_id {
                tx.execute(
                    "INSERT INTO session_exercises
                         (session_id, exercise_id, split_exercise_id, position, target_sets, target_reps, target_weight, completed)
                     SELECT ?1, exercise_id, NULL, position, target_sets, target_reps, target_weight, 0
                     FROM division_exercises WHERE division_id = ?2 ORDER BY position",
                    params![session_id, division_id],
                )?;
            }

            let session = session_by_id(&tx, user_id, session_id)?
                .ok_or_else(|| AppError::Database(format!("Session {} vanished after insert", session_id)))?;
            let detail = load_session_detail(&tx, session)?;
            tx.commit()?;

            tracing::info!(
                user_id,
                session_id,
                ?split_id,
                ?division_id,
                exercises = detail.exercises.len(),
                "Started workout session"
            );
            Ok(detail)
        })
        .await
    }

    pub async fn get_active_session(&self, user_id: i64) -> Result<Option<SessionDetail>, AppError> {
        self.call(move |conn| {
            let session = conn
                .query_row(
                    "SELECT * FROM workout_sessions WHERE user_id = ?1 AND status = 'IN_PROGRESS'",
                    params![user_id],
                    WorkoutSession::from_row,
                )
                .optional()?;
            session.map(|s| load_session_detail(conn, s)).transpose()
        })
        .await
    }

    pub async fn get_session(
        &self,
        user_id: i64,
        session_id: i64,
    ) -> Result<Option<SessionDetail>, AppError> {
        self.call(move |conn| {
            session_by_id(conn, user_id, session_id)?
                .map(|s| load_session_detail(conn, s))
                .transpose()
        })
        .await
    }

    /// Finish a session: record duration and rating, append weight history,
    /// and advance the assessment's current split when this was it.
    pub async fn complete_session(
        &self,
        user_id: i64,
        session_id: i64,
        rating: Option<u8>,
        notes: Option<String>,
    ) -> Result<CompletedSession, AppError> {
        if let Some(rating) = rating {
            if !(1..=5).contains(&rating) {
                return Err(AppError::validation("rating", "rating must be between 1 and 5"));
            }
        }

        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let session = in_progress_session(&tx, user_id, session_id)?;

            let now = Utc::now();
            let duration = (now - session.started_at).num_seconds().max(0);
            tx.execute(
                "UPDATE workout_sessions
                 SET status = ?2, completed_at = ?3, duration_seconds = ?4, rating = ?5, notes = ?6
                 WHERE id = ?1",
                params![session_id, SessionStatus::Completed, now, duration, rating, notes],
            )?;

            let session = session_by_id(&tx, user_id, session_id)?
                .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))?;
            let detail = load_session_detail(&tx, session)?;

            let mut history_entries = 0;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO weight_history
                         (user_id, exercise_id, session_id, top_weight, top_reps, total_volume, set_count, recorded_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;
                // An exercise may appear twice (planned plus ad hoc); one row per exercise.
                let mut exercise_ids: Vec<i64> =
                    detail.exercises.iter().map(|e| e.exercise.exercise_id).collect();
                exercise_ids.sort_unstable();
                exercise_ids.dedup();

                for exercise_id in exercise_ids {
                    let sets = detail
                        .exercises
                        .iter()
                        .filter(|e| e.exercise.exercise_id == exercise_id)
                        .flat_map(|e| e.sets.iter());
                    if let Some(summary) = summarize_sets(sets) {
                        insert.execute(params![
                            user_id,
                            exercise_id,
                            session_id,
                            summary.top_weight,
                            summary.top_reps,
                            summary.total_volume,
                            summary.set_count,
                            now
                        ])?;
                        history_entries += 1;
                    }
                }
            }

            let next_split_index = match detail.session.split_id {
                Some(split_id) => advance_current_split(&tx, user_id, split_id)?,
                None => None,
            };

            tx.commit()?;
            tracing::info!(
                user_id,
                session_id,
                duration_seconds = duration,
                history_entries,
                ?next_split_index,
                "Completed workout session"
            );
            Ok(CompletedSession {
                detail,
                history_entries,
                next_split_index,
            })
        })
        .await
    }

    /// Abandon a session. Nothing is written to the weight history.
    pub async fn cancel_session(
        &self,
        user_id: i64,
        session_id: i64,
    ) -> Result<WorkoutSession, AppError> {
        self.call(move |conn| {
            let session = in_progress_session(conn, user_id, session_id)?;
            conn.execute(
                "UPDATE workout_sessions SET status = ?2 WHERE id = ?1",
                params![session_id, SessionStatus::Cancelled],
            )?;
            tracing::info!(user_id, session_id, "Cancelled workout session");
            Ok(WorkoutSession {
                status: SessionStatus::Cancelled,
                ..session
            })
        })
        .await
    }

    /// One page of session history, newest first.
    ///
    /// Returns the cursor for the next page when more rows exist.
    pub async fn list_sessions(
        &self,
        user_id: i64,
        cursor: Option<SessionCursor>,
        limit: u32,
    ) -> Result<(Vec<WorkoutSession>, Option<SessionCursor>), AppError> {
        self.call(move |conn| {
            let (after_started, after_id) = match &cursor {
                Some(c) => (Some(c.started_at), Some(c.id)),
                None => (None, None),
            };
            let mut stmt = conn.prepare(
                "SELECT * FROM workout_sessions
                 WHERE user_id = ?1
                   AND (?2 IS NULL OR started_at < ?2 OR (started_at = ?2 AND id < ?3))
                 ORDER BY started_at DESC, id DESC
                 LIMIT ?4",
            )?;
            // Fetch one extra row to learn whether another page exists.
            let mut sessions = stmt
                .query_map(
                    params![user_id, after_started, after_id, limit + 1],
                    WorkoutSession::from_row,
                )?
                .collect::<Result<Vec<_>, _>>()?;

            let next = if sessions.len() > limit as usize {
                sessions.truncate(limit as usize);
                sessions.last().map(|s| SessionCursor {
                    started_at: s.started_at,
                    id: s.id,
                })
            } else {
                None
            };
            Ok((sessions, next))
        })
        .await
    }

    /// Most recent completed sessions.
    pub async fn recent_completed_sessions(
        &self,
        user_id: i64,
        limit: u32,
    ) -> Result<Vec<WorkoutSession>, AppError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM workout_sessions
                 WHERE user_id = ?1 AND status = 'COMPLETED'
                 ORDER BY completed_at DESC, id DESC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![user_id, limit], WorkoutSession::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Completion timestamps of every completed session.
    pub async fn completion_dates(&self, user_id: i64) -> Result<Vec<DateTime<Utc>>, AppError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT completed_at FROM workout_sessions
                 WHERE user_id = ?1 AND status = 'COMPLETED' AND completed_at IS NOT NULL
                 ORDER BY completed_at",
            )?;
            let rows = stmt
                .query_map(params![user_id], |r| r.get(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Weight history for one exercise, oldest first.
    pub async fn weight_history(
        &self,
        user_id: i64,
        exercise_id: i64,
    ) -> Result<Vec<WeightHistoryEntry>, AppError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM weight_history
                 WHERE user_id = ?1 AND exercise_id = ?2
                 ORDER BY recorded_at, id",
            )?;
            let rows = stmt
                .query_map(params![user_id, exercise_id], WeightHistoryEntry::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    // ─── Set Logging ─────────────────────────────────────────────

    /// Create or replace the set keyed by (exercise instance, set number).
    ///
    /// Repeating the same write leaves exactly one row.
    pub async fn upsert_set(
        &self,
        user_id: i64,
        session_id: i64,
        session_exercise_id: i64,
        set_number: u32,
        input: SetInput,
    ) -> Result<SetLog, AppError> {
        input.validate(set_number)?;

        self.call(move |conn| {
            let tx = conn.transaction()?;
            in_progress_session(&tx, user_id, session_id)?;
            session_exercise(&tx, session_id, session_exercise_id)?;

            let set = tx.query_row(
                "INSERT INTO set_logs (session_exercise_id, set_number, weight, reps, completed, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (session_exercise_id, set_number) DO UPDATE SET
                     weight = excluded.weight,
                     reps = excluded.reps,
                     completed = excluded.completed,
                     updated_at = excluded.updated_at
                 RETURNING *",
                params![
                    session_exercise_id,
                    set_number,
                    input.weight,
                    input.reps,
                    input.completed,
                    Utc::now()
                ],
                SetLog::from_row,
            )?;
            tx.commit()?;

            tracing::debug!(
                session_id,
                session_exercise_id,
                set_number,
                weight = set.weight,
                reps = set.reps,
                "Saved set"
            );
            Ok(set)
        })
        .await
    }

    /// Remove a set. Returns false if it did not exist.
    pub async fn delete_set(
        &self,
        user_id: i64,
        session_id: i64,
        session_exercise_id: i64,
        set_number: u32,
    ) -> Result<bool, AppError> {
        self.call(move |conn| {
            in_progress_session(conn, user_id, session_id)?;
            session_exercise(conn, session_id, session_exercise_id)?;
            let deleted = conn.execute(
                "DELETE FROM set_logs WHERE session_exercise_id = ?1 AND set_number = ?2",
                params![session_exercise_id, set_number],
            )?;
            Ok(deleted > 0)
        })
        .await
    }

    /// Flip an exercise instance's completed flag.
    pub async fn toggle_exercise(
        &self,
        user_id: i64,
        session_id: i64,
        session_exercise_id: i64,
    ) -> Result<SessionExercise, AppError> {
        self.call(move |conn| {
            in_progress_session(conn, user_id, session_id)?;
            let exercise = session_exercise(conn, session_id, session_exercise_id)?;
            conn.execute(
                "UPDATE session_exercises SET completed = ?2 WHERE id = ?1",
                params![session_exercise_id, !exercise.completed],
            )?;
            Ok(SessionExercise {
                completed: !exercise.completed,
                ..exercise
            })
        })
        .await
    }

    /// Append an exercise to an in-progress session.
    pub async fn add_session_exercise(
        &self,
        user_id: i64,
        session_id: i64,
        exercise: AdHocExercise,
    ) -> Result<SessionExercise, AppError> {
        self.call(move |conn| {
            let tx = conn.transaction()?;
            in_progress_session(&tx, user_id, session_id)?;

            match visible_exercise(&tx, user_id, exercise.exercise_id)? {
                Some(e) if !e.archived => {}
                Some(e) => {
                    return Err(AppError::validation(
                        "exercise_id",
                        format!("'{}' is archived", e.name),
                    ))
                }
                None => {
                    return Err(AppError::NotFound(format!(
                        "Exercise {} not found",
                        exercise.exercise_id
                    )))
                }
            }

            let position: u32 = tx.query_row(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM session_exercises WHERE session_id = ?1",
                params![session_id],
                |r| r.get(0),
            )?;
            tx.execute(
                "INSERT INTO session_exercises
                     (session_id, exercise_id, split_exercise_id, position, target_sets, target_reps, target_weight, completed)
                 VALUES (?1, ?2, NULL, ?3, ?4, ?5, ?6, 0)",
                params![
                    session_id,
                    exercise.exercise_id,
                    position,
                    exercise.target_sets,
                    exercise.target_reps.to_string(),
                    exercise.target_weight
                ],
            )?;
            let id = tx.last_insert_rowid();
            let added = session_exercise(&tx, session_id, id)?;
            tx.commit()?;
            Ok(added)
        })
        .await
    }
}

fn session_by_id(
    conn: &Connection,
    user_id: i64,
    session_id: i64,
) -> Result<Option<WorkoutSession>, AppError> {
    Ok(conn
        .query_row(
            "SELECT * FROM workout_sessions WHERE id = ?1 AND user_id = ?2",
            params![session_id, user_id],
            WorkoutSession::from_row,
        )
        .optional()?)
}

/// The user's session, which must still be in progress.
fn in_progress_session(
    conn: &Connection,
    user_id: i64,
    session_id: i64,
) -> Result<WorkoutSession, AppError> {
    let session = session_by_id(conn, user_id, session_id)?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))?;
    if session.status != SessionStatus::InProgress {
        return Err(AppError::Conflict(format!(
            "Session {} is {}; only sessions in progress can be changed",
            session_id,
            session.status.as_str().to_lowercase()
        )));
    }
    Ok(session)
}

fn session_exercise(
    conn: &Connection,
    session_id: i64,
    session_exercise_id: i64,
) -> Result<SessionExercise, AppError> {
    conn.query_row(
        "SELECT se.*, e.name AS exercise_name FROM session_exercises se
         JOIN exercises e ON e.id = se.exercise_id
         WHERE se.id = ?1 AND se.session_id = ?2",
        params![session_exercise_id, session_id],
        SessionExercise::from_row,
    )
    .optional()?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "Exercise {} is not part of session {}",
            session_exercise_id, session_id
        ))
    })
}

fn load_session_detail(
    conn: &Connection,
    session: WorkoutSession,
) -> Result<SessionDetail, AppError> {
    let mut exercise_stmt = conn.prepare(
        "SELECT se.*, e.name AS exercise_name FROM session_exercises se
         JOIN exercises e ON e.id = se.exercise_id
         WHERE se.session_id = ?1 ORDER BY se.position, se.id",
    )?;
    let exercises = exercise_stmt
        .query_map(params![session.id], SessionExercise::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut set_stmt = conn.prepare(
        "SELECT * FROM set_logs WHERE session_exercise_id = ?1 ORDER BY set_number",
    )?;
    let mut details = Vec::with_capacity(exercises.len());
    for exercise in exercises {
        let sets = set_stmt
            .query_map(params![exercise.id], SetLog::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        details.push(SessionExerciseDetail { exercise, sets });
    }

    let done = details.iter().filter(|e| e.exercise.completed).count();
    Ok(SessionDetail {
        completion_percentage: completion_percentage(done, details.len()),
        session,
        exercises: details,
    })
}

/// Move the active assessment past `split_id` if it is the current split.
fn advance_current_split(
    conn: &Connection,
    user_id: i64,
    split_id: i64,
) -> Result<Option<u8>, AppError> {
    let Some(assessment) = active_assessment(conn, user_id)? else {
        return Ok(None);
    };
    let position: Option<u8> = conn
        .query_row(
            "SELECT position FROM splits WHERE id = ?1 AND assessment_id = ?2",
            params![split_id, assessment.id],
            |r| r.get(0),
        )
        .optional()?;
    if position != Some(assessment.current_split_index) {
        return Ok(None);
    }

    let next = (assessment.current_split_index + 1) % assessment.frequency.max(1);
    conn.execute(
        "UPDATE assessments SET current_split_index = ?2 WHERE id = ?1",
        params![assessment.id, next],
    )?;
    Ok(Some(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrainingFocus;
    use crate::services::split_generator::generate_splits;

    async fn setup() -> (SqliteDb, i64, Vec<i64>) {
        let db = SqliteDb::open_in_memory().unwrap();
        let user = db.create_user("lifter@example.com", "Lifter", "hash").await.unwrap();
        let detail = db
            .create_assessment(user.id, 3, TrainingFocus::Legs, generate_splits(3, TrainingFocus::Legs).unwrap())
            .await
            .unwrap();
        let split_ids = detail.splits.iter().map(|s| s.split.id).collect();
        (db, user.id, split_ids)
    }

    fn set(weight: f64, reps: i64) -> SetInput {
        SetInput {
            weight,
            reps,
            completed: true,
        }
    }

    #[tokio::test]
    async fn test_start_session_copies_split_exercises() {
        let (db, user_id, splits) = setup().await;
        let session = db
            .start_session(user_id, SessionSource::Split(splits[0]), None)
            .await
            .unwrap();
        assert_eq!(session.session.status, SessionStatus::InProgress);
        assert!(session.session.name.starts_with("Split A"));
        assert!(!session.exercises.is_empty());
        assert_eq!(session.completion_percentage, 0);
    }

    #[tokio::test]
    async fn test_second_active_session_conflicts() {
        let (db, user_id, _) = setup().await;
        let first = db.start_session(user_id, SessionSource::Free, None).await.unwrap();
        let err = db
            .start_session(user_id, SessionSource::Free, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let active = db.get_active_session(user_id).await.unwrap().unwrap();
        assert_eq!(active.session.id, first.session.id);
    }

    #[tokio::test]
    async fn test_upsert_set_is_idempotent() {
        let (db, user_id, splits) = setup().await;
        let session = db
            .start_session(user_id, SessionSource::Split(splits[0]), None)
            .await
            .unwrap();
        let instance = session.exercises[0].exercise.id;
        let id = session.session.id;

        let a = db.upsert_set(user_id, id, instance, 1, set(100.0, 5)).await.unwrap();
        let b = db.upsert_set(user_id, id, instance, 1, set(100.0, 5)).await.unwrap();
        assert_eq!(a.id, b.id);

        db.upsert_set(user_id, id, instance, 1, set(102.5, 4)).await.unwrap();
        let detail = db.get_session(user_id, id).await.unwrap().unwrap();
        assert_eq!(detail.exercises[0].sets.len(), 1);
        assert_eq!(detail.exercises[0].sets[0].weight, 102.5);
        assert_eq!(detail.exercises[0].sets[0].reps, 4);
    }

    #[tokio::test]
    async fn test_invalid_set_leaves_record_untouched() {
        let (db, user_id, splits) = setup().await;
        let session = db
            .start_session(user_id, SessionSource::Split(splits[0]), None)
            .await
            .unwrap();
        let instance = session.exercises[0].exercise.id;
        let id = session.session.id;

        db.upsert_set(user_id, id, instance, 1, set(80.0, 8)).await.unwrap();
        let err = db
            .upsert_set(user_id, id, instance, 1, set(-5.0, 8))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "weight"));

        let detail = db.get_session(user_id, id).await.unwrap().unwrap();
        assert_eq!(detail.exercises[0].sets[0].weight, 80.0);
    }

    #[tokio::test]
    async fn test_complete_advances_split_and_writes_history() {
        let (db, user_id, splits) = setup().await;
        let session = db
            .start_session(user_id, SessionSource::Split(splits[0]), None)
            .await
            .unwrap();
        let id = session.session.id;
        let first = &session.exercises[0].exercise;
        db.upsert_set(user_id, id, first.id, 1, set(100.0, 5)).await.unwrap();
        db.upsert_set(user_id, id, first.id, 2, set(105.0, 3)).await.unwrap();

        let done = db.complete_session(user_id, id, Some(4), None).await.unwrap();
        assert_eq!(done.detail.session.status, SessionStatus::Completed);
        assert_eq!(done.history_entries, 1);
        assert_eq!(done.next_split_index, Some(1));

        let history = db.weight_history(user_id, first.exercise_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].top_weight, 105.0);
        assert_eq!(history[0].total_volume, 815.0);

        let active = db.get_active_assessment(user_id).await.unwrap().unwrap();
        assert_eq!(active.assessment.current_split_index, 1);
        assert_eq!(active.splits[0].completed_sessions, 1);

        // Completed sessions are read-only.
        let err = db
            .upsert_set(user_id, id, first.id, 3, set(100.0, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_cancel_writes_no_history() {
        let (db, user_id, splits) = setup().await;
        let session = db
            .start_session(user_id, SessionSource::Split(splits[0]), None)
            .await
            .unwrap();
        let id = session.session.id;
        let first = &session.exercises[0].exercise;
        db.upsert_set(user_id, id, first.id, 1, set(100.0, 5)).await.unwrap();

        let cancelled = db.cancel_session(user_id, id).await.unwrap();
        assert_eq!(cancelled.status, SessionStatus::Cancelled);
        assert!(db.weight_history(user_id, first.exercise_id).await.unwrap().is_empty());
        assert!(db.get_active_session(user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sessions_pages() {
        let (db, user_id, _) = setup().await;
        for _ in 0..3 {
            let s = db.start_session(user_id, SessionSource::Free, None).await.unwrap();
            db.cancel_session(user_id, s.session.id).await.unwrap();
        }

        let (page, next) = db.list_sessions(user_id, None, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(page[0].id > page[1].id);
        let (rest, after) = db.list_sessions(user_id, next, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert!(after.is_none());
    }

    #[tokio::test]
    async fn test_rating_out_of_range() {
        let (db, user_id, _) = setup().await;
        let s = db.start_session(user_id, SessionSource::Free, None).await.unwrap();
        let err = db
            .complete_session(user_id, s.session.id, Some(6), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "rating"));
    }
}
