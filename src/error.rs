use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or empty required field.
    #[error("{0}")]
    BadRequest(String),

    /// No session where one is required. Page-serving routes surface this
    /// as a redirect to the login page rather than a status code.
    #[error("not logged in")]
    Unauthorized,

    /// Authenticated but not an administrator.
    #[error("Admins only")]
    Forbidden,

    /// Username collision on signup.
    #[error("That username is taken.")]
    UsernameTaken,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hash error: {0}")]
    PasswordHash(argon2::password_hash::Error),
}

impl ApiError {
    /// Classifies a failed user insert: a unique violation on
    /// `users.username` is the caller's fault, everything else is ours.
    pub fn from_user_insert(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => ApiError::UsernameTaken,
            _ => ApiError::Database(err),
        }
    }
}

impl From<argon2::password_hash::Error> for ApiError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ApiError::PasswordHash(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Unauthorized => Redirect::to("/login.html").into_response(),
            ApiError::Forbidden => {
                (StatusCode::FORBIDDEN, "Admins only".to_string()).into_response()
            }
            ApiError::UsernameTaken => {
                (StatusCode::CONFLICT, "That username is taken.".to_string()).into_response()
            }
            ApiError::Database(ref e) => {
                tracing::error!("database error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string()).into_response()
            }
            ApiError::PasswordHash(ref e) => {
                tracing::error!("password hash error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string()).into_response()
            }
        }
    }
}
