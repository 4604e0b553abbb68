// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite client wrapper with typed operations.
//!
//! Provides the connection, schema, and high-level operations for:
//! - Users (accounts)
//! - Exercises (built-in catalog plus custom exercises)
//!
//! Plans (assessments, routines) live in `db::plans`, sessions and set logs
//! in `db::sessions`.

use crate::db::{is_constraint_violation, FromSqliteRow};
use crate::error::AppError;
use crate::models::{Exercise, MuscleGroup, User};
use crate::services::catalog::CATALOG;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS exercises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    muscle_group TEXT NOT NULL,
    equipment TEXT,
    owner_id INTEGER REFERENCES users(id) ON DELETE CASCADE,
    archived INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assessments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    frequency INTEGER NOT NULL CHECK (frequency BETWEEN 3 AND 6),
    training_focus TEXT NOT NULL,
    current_split_index INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    superseded_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS one_active_assessment_per_user
    ON assessments(user_id) WHERE is_active = 1;

CREATE TABLE IF NOT EXISTS splits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    assessment_id INTEGER NOT NULL REFERENCES assessments(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    label TEXT NOT NULL,
    name TEXT NOT NULL,
    subtitle TEXT,
    UNIQUE (assessment_id, position)
);

CREATE TABLE IF NOT EXISTS split_exercises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    split_id INTEGER NOT NULL REFERENCES splits(id) ON DELETE CASCADE,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id),
    position INTEGER NOT NULL,
    target_sets INTEGER NOT NULL,
    target_reps TEXT NOT NULL,
    target_weight REAL,
    rest_seconds INTEGER,
    notes TEXT,
    video_url TEXT
);

CREATE TABLE IF NOT EXISTS routines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT,
    is_active INTEGER NOT NULL DEFAULT 0,
    archived INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS one_active_routine_per_user
    ON routines(user_id) WHERE is_active = 1;

CREATE TABLE IF NOT EXISTS divisions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    routine_id INTEGER NOT NULL REFERENCES routines(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    label TEXT NOT NULL,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS division_exercises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    division_id INTEGER NOT NULL REFERENCES divisions(id) ON DELETE CASCADE,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id),
    position INTEGER NOT NULL,
    target_sets INTEGER NOT NULL,
    target_reps TEXT NOT NULL,
    target_weight REAL,
    rest_seconds INTEGER,
    notes TEXT
);

CREATE TABLE IF NOT EXISTS workout_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    split_id INTEGER REFERENCES splits(id),
    division_id INTEGER REFERENCES divisions(id),
    name TEXT NOT NULL,
    status TEXT NOT NULL,
    started_at TEXT NOT NULL,
    completed_at TEXT,
    duration_seconds INTEGER,
    rating INTEGER,
    notes TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS one_in_progress_session_per_user
    ON workout_sessions(user_id) WHERE status = 'IN_PROGRESS';
CREATE INDEX IF NOT EXISTS sessions_by_completion
    ON workout_sessions(user_id, status, completed_at);

CREATE TABLE IF NOT EXISTS session_exercises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL REFERENCES workout_sessions(id) ON DELETE CASCADE,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id),
    split_exercise_id INTEGER REFERENCES split_exercises(id),
    position INTEGER NOT NULL,
    target_sets INTEGER NOT NULL,
    target_reps TEXT NOT NULL,
    target_weight REAL,
    completed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS set_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_exercise_id INTEGER NOT NULL REFERENCES session_exercises(id) ON DELETE CASCADE,
    set_number INTEGER NOT NULL,
    weight REAL NOT NULL,
    reps INTEGER NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL,
    UNIQUE (session_exercise_id, set_number)
);

CREATE TABLE IF NOT EXISTS weight_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id),
    session_id INTEGER NOT NULL REFERENCES workout_sessions(id),
    top_weight REAL NOT NULL,
    top_reps INTEGER NOT NULL,
    total_volume REAL NOT NULL,
    set_count INTEGER NOT NULL,
    recorded_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS weight_history_by_exercise
    ON weight_history(user_id, exercise_id, recorded_at);
"#;

/// SQLite database client.
///
/// A single connection behind a mutex; every operation runs on the blocking
/// thread pool. Cloning shares the connection.
#[derive(Clone)]
pub struct SqliteDb {
    conn: Arc<Mutex<Connection>>,
}

impl FromSqliteRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            display_name: row.get("display_name")?,
            password_hash: row.get("password_hash")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            slug: row.get("slug")?,
            name: row.get("name")?,
            muscle_group: row.get("muscle_group")?,
            equipment: row.get("equipment")?,
            owner_id: row.get("owner_id")?,
            archived: row.get("archived")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// New custom exercise.
#[derive(Debug, Clone)]
pub struct NewExercise {
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub equipment: Option<String>,
}

impl SqliteDb {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: &str) -> Result<Self, AppError> {
        let conn = Connection::open(path)
            .map_err(|e| AppError::Database(format!("Failed to open {}: {}", path, e)))?;
        let db = Self::from_connection(conn)?;
        tracing::info!(path, "Opened SQLite database");
        Ok(db)
    }

    /// Private in-memory database (tests, ephemeral runs).
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        let seeded = seed_catalog(&conn)?;
        if seeded > 0 {
            tracing::info!(count = seeded, "Seeded built-in exercise catalog");
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` with exclusive access to the connection on the blocking pool.
    pub(crate) async fn call<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Connection) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| AppError::Database("Connection mutex poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Database task failed: {}", e)))?
    }

    /// Cheap round trip used by the health check.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.call(|conn| {
            conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Create a user. Fails with a conflict if the email is taken.
    pub async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();
        let display_name = display_name.trim().to_string();
        let password_hash = password_hash.to_string();

        self.call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO users (email, display_name, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![email, display_name, password_hash, Utc::now()],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => {
                    return Err(AppError::Conflict(
                        "An account with this email already exists; log in instead".to_string(),
                    ))
                }
                Err(e) => return Err(e.into()),
            }
            let id = conn.last_insert_rowid();
            get_user_by_id(conn, id)?
                .ok_or_else(|| AppError::Database(format!("User {} vanished after insert", id)))
        })
        .await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        self.call(move |conn| get_user_by_id(conn, user_id)).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.trim().to_lowercase();
        self.call(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT * FROM users WHERE email = ?1",
                    params![email],
                    User::from_row,
                )
                .optional()?)
        })
        .await
    }

    // ─── Exercise Operations ─────────────────────────────────────

    /// Built-in exercises plus the user's own, by name.
    pub async fn list_exercises(
        &self,
        user_id: i64,
        muscle_group: Option<MuscleGroup>,
        include_archived: bool,
    ) -> Result<Vec<Exercise>, AppError> {
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM exercises
                 WHERE (owner_id IS NULL OR owner_id = ?1)
                   AND (?2 IS NULL OR muscle_group = ?2)
                   AND (?3 = 1 OR archived = 0)
                 ORDER BY name, id",
            )?;
            let exercises = stmt
                .query_map(
                    params![user_id, muscle_group, include_archived],
                    Exercise::from_row,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(exercises)
        })
        .await
    }

    pub async fn get_exercise(
        &self,
        user_id: i64,
        exercise_id: i64,
    ) -> Result<Option<Exercise>, AppError> {
        self.call(move |conn| visible_exercise(conn, user_id, exercise_id))
            .await
    }

    /// Create a custom exercise owned by the user.
    pub async fn create_exercise(
        &self,
        user_id: i64,
        exercise: NewExercise,
    ) -> Result<Exercise, AppError> {
        let base = slugify(&exercise.name);
        if base.is_empty() {
            return Err(AppError::validation(
                "name",
                "must contain at least one letter or digit",
            ));
        }
        let slug = format!("u{}-{}", user_id, base);

        self.call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO exercises (slug, name, muscle_group, equipment, owner_id, archived, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
                params![
                    slug,
                    exercise.name.trim(),
                    exercise.muscle_group,
                    exercise.equipment,
                    user_id,
                    Utc::now()
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => {
                    return Err(AppError::Conflict(format!(
                        "You already have an exercise named '{}'",
                        exercise.name.trim()
                    )))
                }
                Err(e) => return Err(e.into()),
            }
            let id = conn.last_insert_rowid();
            visible_exercise(conn, user_id, id)?
                .ok_or_else(|| AppError::Database(format!("Exercise {} vanished after insert", id)))
        })
        .await
    }

    /// Archive a custom exercise; it stays in history but is hidden from lists.
    pub async fn archive_exercise(&self, user_id: i64, exercise_id: i64) -> Result<Exercise, AppError> {
        self.call(move |conn| {
            let exercise = owned_exercise(conn, user_id, exercise_id)?;
            conn.execute(
                "UPDATE exercises SET archived = 1 WHERE id = ?1",
                params![exercise.id],
            )?;
            Ok(Exercise {
                archived: true,
                ..exercise
            })
        })
        .await
    }

    /// Delete a custom exercise that has never been used.
    ///
    /// Exercises with session history or routine references must be archived.
    pub async fn delete_exercise(&self, user_id: i64, exercise_id: i64) -> Result<(), AppError> {
        self.call(move |conn| {
            let tx = conn.transaction()?;
            let exercise = owned_exercise(&tx, user_id, exercise_id)?;

            let history: i64 = tx.query_row(
                "SELECT COUNT(*) FROM session_exercises WHERE exercise_id = ?1",
                params![exercise.id],
                |r| r.get(0),
            )?;
            if history > 0 {
                return Err(AppError::Conflict(format!(
                    "'{}' has workout history and cannot be deleted; archive it instead",
                    exercise.name
                )));
            }

            let routines: i64 = tx.query_row(
                "SELECT COUNT(*) FROM division_exercises WHERE exercise_id = ?1",
                params![exercise.id],
                |r| r.get(0),
            )?;
            if routines > 0 {
                return Err(AppError::Conflict(format!(
                    "'{}' is used by a routine; remove it from the routine or archive it instead",
                    exercise.name
                )));
            }

            tx.execute("DELETE FROM exercises WHERE id = ?1", params![exercise.id])?;
            tx.commit()?;
            tracing::info!(user_id, exercise_id, "Deleted custom exercise");
            Ok(())
        })
        .await
    }
}

/// Insert catalog entries that are not present yet. Returns rows inserted.
fn seed_catalog(conn: &Connection) -> Result<usize, AppError> {
    let now = Utc::now();
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO exercises (slug, name, muscle_group, equipment, owner_id, archived, created_at)
         VALUES (?1, ?2, ?3, ?4, NULL, 0, ?5)",
    )?;
    let mut inserted = 0;
    for entry in CATALOG {
        inserted += stmt.execute(params![
            entry.slug,
            entry.name,
            entry.muscle_group,
            entry.equipment,
            now
        ])?;
    }
    Ok(inserted)
}

fn get_user_by_id(conn: &Connection, user_id: i64) -> Result<Option<User>, AppError> {
    Ok(conn
        .query_row(
            "SELECT * FROM users WHERE id = ?1",
            params![user_id],
            User::from_row,
        )
        .optional()?)
}

/// An exercise the user may use: built-in or their own.
pub(crate) fn visible_exercise(
    conn: &Connection,
    user_id: i64,
    exercise_id: i64,
) -> Result<Option<Exercise>, AppError> {
    Ok(conn
        .query_row(
            "SELECT * FROM exercises WHERE id = ?1 AND (owner_id IS NULL OR owner_id = ?2)",
            params![exercise_id, user_id],
            Exercise::from_row,
        )
        .optional()?)
}

/// A custom exercise owned by the user. Built-ins cannot be modified.
fn owned_exercise(conn: &Connection, user_id: i64, exercise_id: i64) -> Result<Exercise, AppError> {
    let exercise = visible_exercise(conn, user_id, exercise_id)?
        .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", exercise_id)))?;
    if !exercise.is_custom() {
        return Err(AppError::Conflict(
            "Built-in exercises cannot be changed; create a custom exercise instead".to_string(),
        ));
    }
    Ok(exercise)
}

/// Lowercase ASCII slug: "Cable Fly (Low)" -> "cable-fly-low".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
