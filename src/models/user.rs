//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account stored in SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Row ID (also the JWT subject)
    pub id: i64,
    /// Email address, stored lowercased
    pub email: String,
    /// Name shown in the UI
    pub display_name: String,
    /// PBKDF2 hash in `pbkdf2-sha256$iterations$salt$hash` form
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}
