use std::sync::Arc;

use axum::{Form, Json, extract::State, response::Redirect};
use serde::Deserialize;

use crate::api::server::AppState;
use crate::auth::guard::CurrentUser;
use crate::db::models::AttendanceEntry;
use crate::db::repo;
use crate::error::Result;

/// Public attendance list: deliberately open, no session required.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AttendanceEntry>>> {
    Ok(Json(repo::list_attendance(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct SetAttendingForm {
    /// `"1"` means attending, anything else does not.
    #[serde(default)]
    pub attending: String,
}

pub async fn set_attending(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Form(form): Form<SetAttendingForm>,
) -> Result<Redirect> {
    let attending = form.attending == "1";

    repo::set_attending(&state.db, user.session.user_id, attending).await?;
    // Refresh the snapshot so /me reflects the change without re-login.
    state.sessions.set_attending(&user.token, attending).await;

    Ok(Redirect::to("/menu.html"))
}
