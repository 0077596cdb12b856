use std::sync::Arc;

use axum::{Form, Json, extract::State, response::Redirect};
use serde::Deserialize;

use crate::api::server::AppState;
use crate::auth::guard::AdminUser;
use crate::db::models::AdminUserEntry;
use crate::db::repo;
use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct UserForm {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<AdminUserEntry>>> {
    Ok(Json(repo::list_admin_users(&state.db).await?))
}

pub async fn toggle_attending(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Form(form): Form<UserForm>,
) -> Result<Redirect> {
    repo::toggle_attending(&state.db, form.user_id).await?;
    Ok(Redirect::to("/admin.html"))
}

/// Flips the flag in place. There is no last-admin floor: an admin may
/// demote themselves down to a zero-admin system. Startup seeding restores
/// a default admin on the next restart if that happens.
pub async fn toggle_admin(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Form(form): Form<UserForm>,
) -> Result<Redirect> {
    repo::toggle_admin(&state.db, form.user_id).await?;
    Ok(Redirect::to("/admin.html"))
}

/// Unconditional delete, no cascade: any dish the user had claimed keeps
/// the stale `claimed_by` id and lists with a null claimant.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Form(form): Form<UserForm>,
) -> Result<Redirect> {
    repo::delete_user(&state.db, form.user_id).await?;
    Ok(Redirect::to("/admin.html"))
}
