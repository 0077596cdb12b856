use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::{admin, auth, dishes, users};
use crate::auth::credentials;
use crate::auth::session::SessionStore;
use crate::config::AppConfig;
use crate::db::repo;
use crate::error::Result;

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub struct AppState {
    pub db: SqlitePool,
    pub sessions: SessionStore,
}

impl AppState {
    #[cfg(test)]
    pub(crate) async fn for_tests() -> Self {
        // One connection only: each `sqlite::memory:` connection is its
        // own database. Foreign keys stay unenforced so a deleted user's
        // dangling dish claim is tolerated, as in the original.
        let options = "sqlite::memory:"
            .parse::<SqliteConnectOptions>()
            .expect("invalid database URL")
            .foreign_keys(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("failed to open in-memory database");
        repo::init_schema(&pool)
            .await
            .expect("failed to init schema");

        Self {
            db: pool,
            sessions: SessionStore::new(),
        }
    }
}

pub fn router(state: Arc<AppState>, public_dir: &str) -> Router {
    Router::new()
        .route("/", get(auth::root))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/me", get(auth::me))
        .route("/users", get(users::list_users))
        .route("/dishes", get(dishes::list_dishes))
        .route("/add-dish", post(dishes::add_dish))
        .route("/claim-dish", post(dishes::claim_dish))
        .route("/unclaim-dish", post(dishes::unclaim_dish))
        .route("/delete-dish", post(dishes::delete_dish))
        .route("/set-attending", post(users::set_attending))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/toggle-attending", post(admin::toggle_attending))
        .route("/admin/toggle-admin", post(admin::toggle_admin))
        .route("/admin/delete-user", post(admin::delete_user))
        .fallback_service(ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates a default administrator account on first start so the admin
/// pages are reachable before anyone has been promoted by hand.
pub async fn seed_admin(pool: &SqlitePool) -> Result<()> {
    if repo::admin_exists(pool).await? {
        tracing::info!("admin user already exists, skipping seed");
        return Ok(());
    }

    let hash = credentials::hash_password(DEFAULT_ADMIN_PASSWORD)?;
    repo::insert_user(pool, DEFAULT_ADMIN_USERNAME, &hash, true, true).await?;
    tracing::info!(
        "created default admin user {DEFAULT_ADMIN_USERNAME:?} with password {DEFAULT_ADMIN_PASSWORD:?}"
    );
    Ok(())
}

pub async fn start_server(config: AppConfig) {
    // Foreign keys stay unenforced so a deleted user's dangling dish
    // claim is tolerated, as in the original.
    let options = config
        .database_url
        .parse::<SqliteConnectOptions>()
        .expect("invalid database URL")
        .foreign_keys(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("failed to connect to SQLite");

    repo::init_schema(&pool)
        .await
        .expect("failed to initialize database schema");
    seed_admin(&pool).await.expect("failed to seed admin user");

    let state = Arc::new(AppState {
        db: pool,
        sessions: SessionStore::new(),
    });

    let app = router(state, &config.public_dir);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .expect("failed to bind listener");

    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app).await.expect("server failed");
}
