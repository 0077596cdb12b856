use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use crate::api::server::AppState;
use crate::auth::session::{self, Session};
use crate::error::ApiError;

/// Extractor proving the caller holds a live session. Rejection is
/// `Unauthorized`, which page routes surface as a redirect to the login
/// page. Handlers taking this run the check before touching the store.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The browser-held token, kept so handlers can update or destroy the
    /// session they came in on.
    pub token: String,
    pub session: Session,
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token =
            session::token_from_headers(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let session = state
            .sessions
            .resolve(&token)
            .await
            .ok_or(ApiError::Unauthorized)?;

        Ok(CurrentUser { token, session })
    }
}

/// `Option<CurrentUser>` for routes that branch on login state instead of
/// requiring it (the root page and `/me`).
impl OptionalFromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Option<Self>, Self::Rejection> {
        let user = <CurrentUser as FromRequestParts<Arc<AppState>>>::from_request_parts(
            parts, state,
        )
        .await
        .ok();
        Ok(user)
    }
}

/// Extractor for administrator-only routes: no session is `Unauthorized`,
/// a session without the admin flag is `Forbidden`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = <CurrentUser as FromRequestParts<Arc<AppState>>>::from_request_parts(
            parts, state,
        )
        .await?;

        if !user.session.is_admin {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
