use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use serde_json::json;

use crate::api::server::AppState;
use crate::auth::credentials;
use crate::auth::guard::CurrentUser;
use crate::auth::session::{self, Session};
use crate::db::repo;
use crate::error::{ApiError, Result};

/// The one message both login failure paths return, so a caller cannot
/// tell "no such user" from "wrong password".
const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox field: present and non-empty means attending.
    #[serde(default)]
    pub attending: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Landing page: logged-in browsers go straight to the menu.
pub async fn root(user: Option<CurrentUser>) -> Redirect {
    match user {
        Some(_) => Redirect::to("/menu.html"),
        None => Redirect::to("/index.html"),
    }
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> Result<Redirect> {
    if form.username.is_empty() || form.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password required".to_string(),
        ));
    }

    let hash = credentials::hash_password(&form.password)?;
    let attending = form.attending.is_some_and(|v| !v.is_empty());

    // No pre-check on the username: the store's UNIQUE constraint decides,
    // which avoids a check-then-insert race.
    repo::insert_user(&state.db, &form.username, &hash, attending, false)
        .await
        .map_err(ApiError::from_user_insert)?;

    Ok(Redirect::to("/login.html"))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse> {
    let Some(user) = repo::get_user_by_username(&state.db, &form.username).await? else {
        return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
    };

    if !credentials::verify_password(&form.password, &user.password_hash)? {
        return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
    }

    let token = state
        .sessions
        .create(Session {
            user_id: user.id,
            username: user.username,
            attending: user.attending,
            is_admin: user.is_admin,
        })
        .await;

    Ok((
        [(header::SET_COOKIE, session::session_cookie(&token))],
        Redirect::to("/menu.html"),
    ))
}

/// Idempotent: a request with no live session still clears the cookie and
/// redirects.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = session::token_from_headers(&headers) {
        state.sessions.destroy(&token).await;
    }

    (
        [(header::SET_COOKIE, session::clear_session_cookie())],
        Redirect::to("/login.html"),
    )
}

/// Identity query. The session snapshot is authoritative here; no store
/// access.
pub async fn me(user: Option<CurrentUser>) -> Json<serde_json::Value> {
    match user {
        None => Json(json!({ "loggedIn": false })),
        Some(user) => Json(json!({
            "loggedIn": true,
            "id": user.session.user_id,
            "username": user.session.username,
            "attending": user.session.attending,
            "is_admin": user.session.is_admin,
        })),
    }
}
