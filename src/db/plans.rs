// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training plans: assessments with generated splits, and user-built routines.

use crate::db::sqlite::visible_exercise;
use crate::db::{is_constraint_violation, FromSqliteRow, SqliteDb};
use crate::error::AppError;
use crate::models::{
    AssessmentDetail, Division, DivisionDetail, DivisionExercise, Routine, RoutineDetail,
    SplitDetail, SplitExercise, TargetReps, TrainingFocus, WorkoutAssessment, WorkoutSplit,
};
use crate::services::split_generator::{split_label, GeneratedSplit};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

impl FromSqliteRow for WorkoutAssessment {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            frequency: row.get("frequency")?,
            training_focus: row.get("training_focus")?,
            current_split_index: row.get("current_split_index")?,
            is_active: row.get("is_active")?,
            created_at: row.get("created_at")?,
            superseded_at: row.get("superseded_at")?,
        })
    }
}

impl FromSqliteRow for WorkoutSplit {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            assessment_id: row.get("assessment_id")?,
            position: row.get("position")?,
            label: row.get("label")?,
            name: row.get("name")?,
            subtitle: row.get("subtitle")?,
        })
    }
}

impl FromSqliteRow for SplitExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            split_id: row.get("split_id")?,
            exercise_id: row.get("exercise_id")?,
            exercise_name: row.get("exercise_name")?,
            position: row.get("position")?,
            target_sets: row.get("target_sets")?,
            target_reps: row.get("target_reps")?,
            target_weight: row.get("target_weight")?,
            rest_seconds: row.get("rest_seconds")?,
            notes: row.get("notes")?,
            video_url: row.get("video_url")?,
        })
    }
}

impl FromSqliteRow for Routine {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            is_active: row.get("is_active")?,
            archived: row.get("archived")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl FromSqliteRow for Division {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            routine_id: row.get("routine_id")?,
            position: row.get("position")?,
            label: row.get("label")?,
            name: row.get("name")?,
        })
    }
}

impl FromSqliteRow for DivisionExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            division_id: row.get("division_id")?,
            exercise_id: row.get("exercise_id")?,
            exercise_name: row.get("exercise_name")?,
            position: row.get("position")?,
            target_sets: row.get("target_sets")?,
            target_reps: row.get("target_reps")?,
            target_weight: row.get("target_weight")?,
            rest_seconds: row.get("rest_seconds")?,
            notes: row.get("notes")?,
        })
    }
}

/// Partial edit of a split's display fields.
#[derive(Debug, Clone, Default)]
pub struct SplitUpdate {
    pub name: Option<String>,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDivisionExercise {
    pub exercise_id: i64,
    pub target_sets: u32,
    pub target_reps: TargetReps,
    pub target_weight: Option<f64>,
    pub rest_seconds: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDivision {
    pub name: String,
    pub exercises: Vec<NewDivisionExercise>,
}

#[derive(Debug, Clone)]
pub struct NewRoutine {
    pub name: String,
    pub description: Option<String>,
    pub divisions: Vec<NewDivision>,
}

impl SqliteDb {
    // ─── Assessment Operations ───────────────────────────────────

    /// Persist a new assessment and its generated splits.
    ///
    /// The previous active assessment (if any) is superseded in the same
    /// transaction.
    pub async fn create_assessment(
        &self,
        user_id: i64,
        frequency: u8,
        focus: TrainingFocus,
        splits: Vec<GeneratedSplit>,
    ) -> Result<AssessmentDetail, AppError> {
        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let now = Utc::now();

            let superseded = tx.execute(
                "UPDATE assessments SET is_active = 0, superseded_at = ?2
                 WHERE user_id = ?1 AND is_active = 1",
                params![user_id, now],
            )?;

            tx.execute(
                "INSERT INTO assessments (user_id, frequency, training_focus, current_split_index, is_active, created_at)
                 VALUES (?1, ?2, ?3, 0, 1, ?4)",
                params![user_id, frequency, focus, now],
            )?;
            let assessment_id = tx.last_insert_rowid();

            for (position, split) in splits.iter().enumerate() {
                tx.execute(
                    "INSERT INTO splits (assessment_id, position, label, name, subtitle)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![assessment_id, position as u32, split.label, split.name, split.subtitle],
                )?;
                let split_id = tx.last_insert_rowid();

                for (ex_position, exercise) in split.exercises.iter().enumerate() {
                    let exercise_id: i64 = tx
                        .query_row(
                            "SELECT id FROM exercises WHERE slug = ?1 AND owner_id IS NULL",
                            params![exercise.slug],
                            |r| r.get(0),
                        )
                        .optional()?
                        .ok_or_else(|| {
                            AppError::Internal(anyhow::anyhow!(
                                "Template exercise '{}' missing from catalog",
                                exercise.slug
                            ))
                        })?;
                    tx.execute(
                        "INSERT INTO split_exercises
                             (split_id, exercise_id, position, target_sets, target_reps, rest_seconds)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![
                            split_id,
                            exercise_id,
                            ex_position as u32,
                            exercise.sets,
                            exercise.reps,
                            exercise.rest_seconds
                        ],
                    )?;
                }
            }

            let assessment = tx.query_row(
                "SELECT * FROM assessments WHERE id = ?1",
                params![assessment_id],
                WorkoutAssessment::from_row,
            )?;
            let detail = load_assessment_detail(&tx, assessment)?;
            tx.commit()?;

            tracing::info!(
                user_id,
                assessment_id,
                frequency,
                focus = focus.as_str(),
                superseded,
                "Created assessment"
            );
            Ok(detail)
        })
        .await
    }

    /// The user's active assessment with its splits and exercises.
    pub async fn get_active_assessment(
        &self,
        user_id: i64,
    ) -> Result<Option<AssessmentDetail>, AppError> {
        self.call(move |conn| active_assessment_detail(conn, user_id))
            .await
    }

    /// All assessments, newest first.
    pub async fn list_assessments(&self, user_id: i64) -> Result<Vec<WorkoutAssessment>, AppError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM assessments WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map(params![user_id], WorkoutAssessment::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Rename a split or change its subtitle.
    pub async fn update_split(
        &self,
        user_id: i64,
        split_id: i64,
        update: SplitUpdate,
    ) -> Result<WorkoutSplit, AppError> {
        self.call(move |conn| {
            let split = conn
                .query_row(
                    "SELECT s.* FROM splits s
                     JOIN assessments a ON a.id = s.assessment_id
                     WHERE s.id = ?1 AND a.user_id = ?2",
                    params![split_id, user_id],
                    WorkoutSplit::from_row,
                )
                .optional()?
                .ok_or_else(|| AppError::NotFound(format!("Split {} not found", split_id)))?;

            let name = update.name.unwrap_or(split.name);
            let subtitle = update.subtitle.or(split.subtitle);
            conn.execute(
                "UPDATE splits SET name = ?2, subtitle = ?3 WHERE id = ?1",
                params![split_id, name, subtitle],
            )?;

            Ok(WorkoutSplit {
                name,
                subtitle,
                ..split
            })
        })
        .await
    }

    // ─── Routine Operations ──────────────────────────────────────

    pub async fn create_routine(
        &self,
        user_id: i64,
        routine: NewRoutine,
    ) -> Result<RoutineDetail, AppError> {
        self.call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO routines (user_id, name, description, is_active, archived, created_at)
                 VALUES (?1, ?2, ?3, 0, 0, ?4)",
                params![user_id, routine.name.trim(), routine.description, Utc::now()],
            )?;
            let routine_id = tx.last_insert_rowid();

            for (position, division) in routine.divisions.iter().enumerate() {
                tx.execute(
                    "INSERT INTO divisions (routine_id, position, label, name) VALUES (?1, ?2, ?3, ?4)",
                    params![routine_id, position as u32, split_label(position), division.name.trim()],
                )?;
                let division_id = tx.last_insert_rowid();

                for (ex_position, exercise) in division.exercises.iter().enumerate() {
                    match visible_exercise(&tx, user_id, exercise.exercise_id)? {
                        Some(e) if !e.archived => {}
                        Some(e) => {
                            return Err(AppError::validation(
                                "exercise_id",
                                format!("'{}' is archived", e.name),
                            ))
                        }
                        None => {
                            return Err(AppError::validation(
                                "exercise_id",
                                format!("exercise {} does not exist", exercise.exercise_id),
                            ))
                        }
                    }
                    tx.execute(
                        "INSERT INTO division_exercises
                             (division_id, exercise_id, position, target_sets, target_reps,
                              target_weight, rest_seconds, notes)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        params![
                            division_id,
                            exercise.exercise_id,
                            ex_position as u32,
                            exercise.target_sets,
                            exercise.target_reps.to_string(),
                            exercise.target_weight,
                            exercise.rest_seconds,
                            exercise.notes
                        ],
                    )?;
                }
            }

            let detail = routine_detail(&tx, user_id, routine_id)?
                .ok_or_else(|| AppError::Database(format!("Routine {} vanished after insert", routine_id)))?;
            tx.commit()?;
            tracing::info!(user_id, routine_id, divisions = detail.divisions.len(), "Created routine");
            Ok(detail)
        })
        .await
    }

    pub async fn list_routines(
        &self,
        user_id: i64,
        include_archived: bool,
    ) -> Result<Vec<Routine>, AppError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM routines
                 WHERE user_id = ?1 AND (?2 = 1 OR archived = 0)
                 ORDER BY is_active DESC, created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map(params![user_id, include_archived], Routine::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    pub async fn get_routine(
        &self,
        user_id: i64,
        routine_id: i64,
    ) -> Result<Option<RoutineDetail>, AppError> {
        self.call(move |conn| routine_detail(conn, user_id, routine_id))
            .await
    }

    /// Make a routine the user's active one, deactivating any other.
    pub async fn activate_routine(&self, user_id: i64, routine_id: i64) -> Result<Routine, AppError> {
        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let routine = owned_routine(&tx, user_id, routine_id)?;
            if routine.archived {
                return Err(AppError::Conflict(
                    "Archived routines cannot be activated".to_string(),
                ));
            }

            tx.execute(
                "UPDATE routines SET is_active = 0 WHERE user_id = ?1 AND is_active = 1 AND id != ?2",
                params![user_id, routine_id],
            )?;
            match tx.execute(
                "UPDATE routines SET is_active = 1 WHERE id = ?1",
                params![routine_id],
            ) {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => {
                    return Err(AppError::Conflict(
                        "Another routine is already active".to_string(),
                    ))
                }
                Err(e) => return Err(e.into()),
            }
            tx.commit()?;

            tracing::info!(user_id, routine_id, "Activated routine");
            Ok(Routine {
                is_active: true,
                ..routine
            })
        })
        .await
    }

    /// Archive a routine. Archived routines are never active.
    pub async fn archive_routine(&self, user_id: i64, routine_id: i64) -> Result<Routine, AppError> {
        self.call(move |conn| {
            let routine = owned_routine(conn, user_id, routine_id)?;
            conn.execute(
                "UPDATE routines SET archived = 1, is_active = 0 WHERE id = ?1",
                params![routine_id],
            )?;
            Ok(Routine {
                archived: true,
                is_active: false,
                ..routine
            })
        })
        .await
    }

    /// Delete a routine that no session was ever started from.
    pub async fn delete_routine(&self, user_id: i64, routine_id: i64) -> Result<(), AppError> {
        self.call(move |conn| {
            let tx = conn.transaction()?;
            let routine = owned_routine(&tx, user_id, routine_id)?;

            let sessions: i64 = tx.query_row(
                "SELECT COUNT(*) FROM workout_sessions ws
                 JOIN divisions d ON d.id = ws.division_id
                 WHERE d.routine_id = ?1",
                params![routine_id],
                |r| r.get(0),
            )?;
            if sessions > 0 {
                return Err(AppError::Conflict(format!(
                    "Routine '{}' has workout history and cannot be deleted; archive it instead",
                    routine.name
                )));
            }

            tx.execute("DELETE FROM routines WHERE id = ?1", params![routine_id])?;
            tx.commit()?;
            tracing::info!(user_id, routine_id, "Deleted routine");
            Ok(())
        })
        .await
    }
}

pub(crate) fn active_assessment(
    conn: &Connection,
    user_id: i64,
) -> Result<Option<WorkoutAssessment>, AppError> {
    Ok(conn
        .query_row(
            "SELECT * FROM assessments WHERE user_id = ?1 AND is_active = 1",
            params![user_id],
            WorkoutAssessment::from_row,
        )
        .optional()?)
}

pub(crate) fn active_assessment_detail(
    conn: &Connection,
    user_id: i64,
) -> Result<Option<AssessmentDetail>, AppError> {
    match active_assessment(conn, user_id)? {
        Some(assessment) => Ok(Some(load_assessment_detail(conn, assessment)?)),
        None => Ok(None),
    }
}

fn load_assessment_detail(
    conn: &Connection,
    assessment: WorkoutAssessment,
) -> Result<AssessmentDetail, AppError> {
    let splits = {
        let mut stmt =
            conn.prepare("SELECT * FROM splits WHERE assessment_id = ?1 ORDER BY position")?;
        let rows = stmt
            .query_map(params![assessment.id], WorkoutSplit::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    let mut exercise_stmt = conn.prepare(
        "SELECT se.*, e.name AS exercise_name FROM split_exercises se
         JOIN exercises e ON e.id = se.exercise_id
         WHERE se.split_id = ?1 ORDER BY se.position",
    )?;
    let mut count_stmt = conn.prepare(
        "SELECT COUNT(*) FROM workout_sessions WHERE split_id = ?1 AND status = 'COMPLETED'",
    )?;

    let mut details = Vec::with_capacity(splits.len());
    for split in splits {
        let exercises = exercise_stmt
            .query_map(params![split.id], SplitExercise::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        let completed_sessions: u32 = count_stmt.query_row(params![split.id], |r| r.get(0))?;
        details.push(SplitDetail {
            is_current: split.position == assessment.current_split_index,
            split,
            exercises,
            completed_sessions,
        });
    }

    Ok(AssessmentDetail {
        assessment,
        splits: details,
    })
}

fn owned_routine(conn: &Connection, user_id: i64, routine_id: i64) -> Result<Routine, AppError> {
    conn.query_row(
        "SELECT * FROM routines WHERE id = ?1 AND user_id = ?2",
        params![routine_id, user_id],
        Routine::from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("Routine {} not found", routine_id)))
}

fn routine_detail(
    conn: &Connection,
    user_id: i64,
    routine_id: i64,
) -> Result<Option<RoutineDetail>, AppError> {
    let Some(routine) = conn
        .query_row(
            "SELECT * FROM routines WHERE id = ?1 AND user_id = ?2",
            params![routine_id, user_id],
            Routine::from_row,
        )
        .optional()?
    else {
        return Ok(None);
    };

    let mut division_stmt =
        conn.prepare("SELECT * FROM divisions WHERE routine_id = ?1 ORDER BY position")?;
    let divisions = division_stmt
        .query_map(params![routine_id], Division::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut exercise_stmt = conn.prepare(
        "SELECT de.*, e.name AS exercise_name FROM division_exercises de
         JOIN exercises e ON e.id = de.exercise_id
         WHERE de.division_id = ?1 ORDER BY de.position",
    )?;
    let mut details = Vec::with_capacity(divisions.len());
    for division in divisions {
        let exercises = exercise_stmt
            .query_map(params![division.id], DivisionExercise::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        details.push(DivisionDetail {
            division,
            exercises,
        });
    }

    Ok(Some(RoutineDetail {
        routine,
        divisions: details,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::split_generator::generate_splits;

    async fn db_with_user() -> (SqliteDb, i64) {
        let db = SqliteDb::open_in_memory().unwrap();
        let user = db.create_user("lifter@example.com", "Lifter", "hash").await.unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_reassessment_supersedes_previous() {
        let (db, user_id) = db_with_user().await;

        let first = db
            .create_assessment(user_id, 3, TrainingFocus::Legs, generate_splits(3, TrainingFocus::Legs).unwrap())
            .await
            .unwrap();
        let second = db
            .create_assessment(user_id, 4, TrainingFocus::Core, generate_splits(4, TrainingFocus::Core).unwrap())
            .await
            .unwrap();

        let active = db.get_active_assessment(user_id).await.unwrap().unwrap();
        assert_eq!(active.assessment.id, second.assessment.id);
        assert_eq!(active.splits.len(), 4);
        assert!(active.splits[0].is_current);

        let all = db.list_assessments(user_id).await.unwrap();
        assert_eq!(all.len(), 2);
        let old = all.iter().find(|a| a.id == first.assessment.id).unwrap();
        assert!(!old.is_active);
        assert!(old.superseded_at.is_some());
    }

    #[tokio::test]
    async fn test_update_split_keeps_unspecified_fields() {
        let (db, user_id) = db_with_user().await;
        let detail = db
            .create_assessment(user_id, 3, TrainingFocus::Arms, generate_splits(3, TrainingFocus::Arms).unwrap())
            .await
            .unwrap();
        let split = &detail.splits[1].split;

        let updated = db
            .update_split(
                user_id,
                split.id,
                SplitUpdate {
                    name: Some("Arm Day".to_string()),
                    subtitle: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Arm Day");
        assert_eq!(updated.subtitle, split.subtitle);
        assert_eq!(updated.label, "B");

        let err = db
            .update_split(user_id + 1, split.id, SplitUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_only_one_active_routine() {
        let (db, user_id) = db_with_user().await;
        let new = |name: &str| NewRoutine {
            name: name.to_string(),
            description: None,
            divisions: vec![],
        };
        let a = db.create_routine(user_id, new("Push Pull")).await.unwrap();
        let b = db.create_routine(user_id, new("Upper Lower")).await.unwrap();

        db.activate_routine(user_id, a.routine.id).await.unwrap();
        db.activate_routine(user_id, b.routine.id).await.unwrap();

        let routines = db.list_routines(user_id, false).await.unwrap();
        let active: Vec<_> = routines.iter().filter(|r| r.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.routine.id);
    }
}
