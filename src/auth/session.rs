use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{HeaderMap, header};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

/// Per-browser snapshot of the logged-in user, taken at login time. Not
/// refreshed when the underlying row changes elsewhere: an admin toggling
/// another user's flags lands on that user's next login. The one exception
/// is [`SessionStore::set_attending`], used when a user changes their own
/// attendance.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub attending: bool,
    pub is_admin: bool,
}

/// Process-local session store keyed by an opaque browser-held token.
/// Restarting the process invalidates every session; a multi-process
/// deployment would need an external store behind this same interface.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a fresh opaque token to the given snapshot.
    pub async fn create(&self, session: Session) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(token.clone(), session);
        token
    }

    pub async fn resolve(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Idempotent: destroying an unknown token is not an error.
    pub async fn destroy(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// Keeps the snapshot consistent with the store when a user toggles
    /// their own attendance, without requiring re-login.
    pub async fn set_attending(&self, token: &str, attending: bool) {
        if let Some(session) = self.sessions.write().await.get_mut(token) {
            session.attending = attending;
        }
    }
}

/// Pulls the session token out of the request's `Cookie` header(s).
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            if let Some((name, token)) = pair.trim().split_once('=') {
                if name == SESSION_COOKIE && !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
