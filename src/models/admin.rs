// src/models/admin.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'econnect_admin' table.
/// Rows are seeded at startup, never created over HTTP.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub email: String,

    /// Argon2 password hash.
    #[serde(skip)]
    pub password: String,
}

/// Login form. The same form serves admins and users.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
