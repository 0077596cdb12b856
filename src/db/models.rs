use serde::Serialize;
use sqlx::FromRow;

/// Full user row. `password_hash` stays server-side; this type is never
/// serialized outward.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub attending: bool,
    pub is_admin: bool,
}

/// Public attendance list entry (`GET /users`).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendanceEntry {
    pub username: String,
    pub attending: bool,
}

/// Dish with its claimant resolved to a username; null when unclaimed, or
/// when the claimant row was deleted and the reference is orphaned.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DishWithClaimant {
    pub id: i64,
    pub name: String,
    pub claimed_by: Option<String>,
}

/// Admin view of a user (`GET /admin/users`).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminUserEntry {
    pub id: i64,
    pub username: String,
    pub attending: bool,
    pub is_admin: bool,
}
