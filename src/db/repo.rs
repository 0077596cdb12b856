use sqlx::SqlitePool;

use crate::db::models::{AdminUserEntry, AttendanceEntry, DishWithClaimant, User};

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            attending INTEGER DEFAULT 0,
            is_admin INTEGER DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dishes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            claimed_by INTEGER,
            FOREIGN KEY (claimed_by) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Inserts a user and returns the assigned id. A `UNIQUE` violation on
/// `username` comes back as `sqlx::Error::Database`; callers decide how to
/// surface it.
pub async fn insert_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    attending: bool,
    is_admin: bool,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, attending, is_admin) VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(password_hash)
    .bind(attending)
    .bind(is_admin)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, attending, is_admin FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn admin_exists(pool: &SqlitePool) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_admin = 1")
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Public attendance list, ordered by username.
pub async fn list_attendance(pool: &SqlitePool) -> Result<Vec<AttendanceEntry>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceEntry>(
        "SELECT username, attending FROM users ORDER BY username ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn list_admin_users(pool: &SqlitePool) -> Result<Vec<AdminUserEntry>, sqlx::Error> {
    sqlx::query_as::<_, AdminUserEntry>(
        "SELECT id, username, attending, is_admin FROM users ORDER BY username ASC",
    )
    .fetch_all(pool)
    .await
}

/// Dishes with claimant usernames resolved server-side. The outer join
/// tolerates a `claimed_by` pointing at a deleted user: the claimant just
/// renders as null.
pub async fn list_dishes(pool: &SqlitePool) -> Result<Vec<DishWithClaimant>, sqlx::Error> {
    sqlx::query_as::<_, DishWithClaimant>(
        r#"
        SELECT dishes.id, dishes.name, users.username AS claimed_by
        FROM dishes
        LEFT JOIN users ON dishes.claimed_by = users.id
        ORDER BY dishes.id ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn insert_dish(pool: &SqlitePool, name: &str) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO dishes (name, claimed_by) VALUES (?, NULL)")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Unconditional claim: last writer wins, an existing claimant is silently
/// overwritten.
pub async fn claim_dish(pool: &SqlitePool, dish_id: i64, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE dishes SET claimed_by = ? WHERE id = ?")
        .bind(user_id)
        .bind(dish_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Conditional release: only clears the claim if `user_id` holds it.
/// Returns the number of rows affected; zero is not an error.
pub async fn unclaim_dish(
    pool: &SqlitePool,
    dish_id: i64,
    user_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE dishes SET claimed_by = NULL WHERE id = ? AND claimed_by = ?")
        .bind(dish_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Deleting a nonexistent dish is a no-op.
pub async fn delete_dish(pool: &SqlitePool, dish_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM dishes WHERE id = ?")
        .bind(dish_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn set_attending(
    pool: &SqlitePool,
    user_id: i64,
    attending: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET attending = ? WHERE id = ?")
        .bind(attending)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn toggle_attending(pool: &SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET attending = NOT attending WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn toggle_admin(pool: &SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET is_admin = NOT is_admin WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Unconditional delete. Does not cascade to `dishes.claimed_by`; the
/// dish listing's outer join tolerates the orphaned reference.
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    async fn setup_pool() -> SqlitePool {
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

        init_schema(&pool).await.expect("failed to init schema");
        pool
    }

    #[tokio::test]
    async fn test_insert_and_fetch_user() {
        let pool = setup_pool().await;

        let id = insert_user(&pool, "alice", "hash", false, false)
            .await
            .unwrap();

        let user = get_user_by_username(&pool, "alice").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "hash");
        assert!(!user.attending);
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_unique_violation() {
        let pool = setup_pool().await;

        insert_user(&pool, "alice", "h1", false, false)
            .await
            .unwrap();
        let err = insert_user(&pool, "alice", "h2", true, false)
            .await
            .unwrap_err();

        let db_err = err.as_database_error().expect("expected database error");
        assert!(db_err.is_unique_violation());

        // First row untouched.
        let user = get_user_by_username(&pool, "alice").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "h1");
    }

    #[tokio::test]
    async fn test_username_lookup_is_exact_match() {
        let pool = setup_pool().await;

        insert_user(&pool, "alice", "h", false, false).await.unwrap();

        assert!(get_user_by_username(&pool, "Alice").await.unwrap().is_none());
        assert!(get_user_by_username(&pool, "alice ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attendance_list_ordered_by_username() {
        let pool = setup_pool().await;

        insert_user(&pool, "carol", "h", true, false).await.unwrap();
        insert_user(&pool, "alice", "h", false, false).await.unwrap();
        insert_user(&pool, "bob", "h", true, false).await.unwrap();

        let list = list_attendance(&pool).await.unwrap();
        let names: Vec<&str> = list.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert!(!list[0].attending);
        assert!(list[1].attending);
    }

    #[tokio::test]
    async fn test_claim_is_last_writer_wins() {
        let pool = setup_pool().await;

        let alice = insert_user(&pool, "alice", "h", false, false).await.unwrap();
        let bob = insert_user(&pool, "bob", "h", false, false).await.unwrap();
        let dish = insert_dish(&pool, "Roast potatoes").await.unwrap();

        claim_dish(&pool, dish, alice).await.unwrap();
        claim_dish(&pool, dish, bob).await.unwrap();

        let dishes = list_dishes(&pool).await.unwrap();
        assert_eq!(dishes.len(), 1);
        assert_eq!(dishes[0].claimed_by.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_unclaim_requires_ownership() {
        let pool = setup_pool().await;

        let alice = insert_user(&pool, "alice", "h", false, false).await.unwrap();
        let bob = insert_user(&pool, "bob", "h", false, false).await.unwrap();
        let dish = insert_dish(&pool, "Gravy").await.unwrap();

        claim_dish(&pool, dish, alice).await.unwrap();

        // Bob cannot clear Alice's claim; zero rows match.
        let affected = unclaim_dish(&pool, dish, bob).await.unwrap();
        assert_eq!(affected, 0);
        let dishes = list_dishes(&pool).await.unwrap();
        assert_eq!(dishes[0].claimed_by.as_deref(), Some("alice"));

        let affected = unclaim_dish(&pool, dish, alice).await.unwrap();
        assert_eq!(affected, 1);
        let dishes = list_dishes(&pool).await.unwrap();
        assert_eq!(dishes[0].claimed_by, None);
    }

    #[tokio::test]
    async fn test_unclaim_unclaimed_dish_affects_nothing() {
        let pool = setup_pool().await;

        let alice = insert_user(&pool, "alice", "h", false, false).await.unwrap();
        let dish = insert_dish(&pool, "Stuffing").await.unwrap();

        let affected = unclaim_dish(&pool, dish, alice).await.unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_delete_user_orphans_claim_as_null_claimant() {
        let pool = setup_pool().await;

        let alice = insert_user(&pool, "alice", "h", false, false).await.unwrap();
        let dish = insert_dish(&pool, "Pudding").await.unwrap();
        claim_dish(&pool, dish, alice).await.unwrap();

        delete_user(&pool, alice).await.unwrap();

        // The dish survives; the join renders the dangling claimant as null.
        let dishes = list_dishes(&pool).await.unwrap();
        assert_eq!(dishes.len(), 1);
        assert_eq!(dishes[0].name, "Pudding");
        assert_eq!(dishes[0].claimed_by, None);

        // The raw foreign key is still the stale id.
        let raw: Option<i64> = sqlx::query_scalar("SELECT claimed_by FROM dishes WHERE id = ?")
            .bind(dish)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(raw, Some(alice));
    }

    #[tokio::test]
    async fn test_toggle_admin_twice_restores_original() {
        let pool = setup_pool().await;

        let id = insert_user(&pool, "alice", "h", false, false).await.unwrap();

        toggle_admin(&pool, id).await.unwrap();
        let user = get_user_by_username(&pool, "alice").await.unwrap().unwrap();
        assert!(user.is_admin);

        toggle_admin(&pool, id).await.unwrap();
        let user = get_user_by_username(&pool, "alice").await.unwrap().unwrap();
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn test_toggle_attending_flips_in_place() {
        let pool = setup_pool().await;

        let id = insert_user(&pool, "alice", "h", true, false).await.unwrap();
        toggle_attending(&pool, id).await.unwrap();

        let user = get_user_by_username(&pool, "alice").await.unwrap().unwrap();
        assert!(!user.attending);
    }

    #[tokio::test]
    async fn test_delete_dish_is_idempotent() {
        let pool = setup_pool().await;

        let dish = insert_dish(&pool, "Ham").await.unwrap();
        delete_dish(&pool, dish).await.unwrap();
        // Nonexistent id: no-op, no error.
        delete_dish(&pool, dish).await.unwrap();
        delete_dish(&pool, 9999).await.unwrap();

        assert!(list_dishes(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_exists() {
        let pool = setup_pool().await;
        assert!(!admin_exists(&pool).await.unwrap());

        insert_user(&pool, "admin", "h", true, true).await.unwrap();
        assert!(admin_exists(&pool).await.unwrap());
    }

    #[tokio::test]
    async fn test_dishes_ordered_by_id() {
        let pool = setup_pool().await;

        insert_dish(&pool, "Zucchini bake").await.unwrap();
        insert_dish(&pool, "Apple pie").await.unwrap();

        let dishes = list_dishes(&pool).await.unwrap();
        assert_eq!(dishes[0].name, "Zucchini bake");
        assert_eq!(dishes[1].name, "Apple pie");
        assert!(dishes[0].id < dishes[1].id);
    }
}
