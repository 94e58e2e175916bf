//! Admin credential model and the auth request/response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents an admin record from the database.
///
/// # Database Table
///
/// Maps to the `admins` table. Only one row is ever created, through
/// `POST /api/init-admin`; rows are never updated or deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Admin {
    pub id: i32,

    pub username: String,

    /// argon2 PHC string. Never serialized.
    #[sqlx(rename = "password")]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// Public projection of an admin, safe to return to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminSummary {
    pub id: i32,
    pub username: String,
}

impl From<Admin> for AdminSummary {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
        }
    }
}

/// Request body for `POST /api/init-admin`.
///
/// Fields default to empty so that a missing `secretKey` is reported as a bad
/// secret rather than a malformed body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitAdminRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub secret_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitAdminResponse {
    pub message: &'static str,
    pub admin_id: i32,
}

/// Request body for `POST /api/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login: a bearer token plus who it was issued to.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub admin: AdminSummary,
}
