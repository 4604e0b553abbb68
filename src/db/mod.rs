//! Database layer (SQLite).

pub mod plans;
pub mod sessions;
pub mod sqlite;

pub use sessions::SessionCursor;
pub use sqlite::SqliteDb;

use crate::models::{MuscleGroup, SessionStatus, TrainingFocus};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;

/// Build a model from a row selected with named columns.
pub trait FromSqliteRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Enums stored as their SCREAMING_SNAKE_CASE text form.
macro_rules! sql_text_enum {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

sql_text_enum!(MuscleGroup);
sql_text_enum!(TrainingFocus);
sql_text_enum!(SessionStatus);

/// True if the error is a UNIQUE / CHECK / FOREIGN KEY constraint failure.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
