//! User database operations

use songrate_common::db::UserRecord;
use songrate_common::Result;
use sqlx::SqlitePool;

/// Load user by unique name
pub async fn find_user_by_name(pool: &SqlitePool, name: &str) -> Result<Option<UserRecord>> {
    let user = sqlx::query_as::<_, UserRecord>("SELECT id, name, password FROM users WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Load user by id
pub async fn find_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserRecord>> {
    let user = sqlx::query_as::<_, UserRecord>("SELECT id, name, password FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Insert a user with an already-hashed password
///
/// A taken name surfaces as a UNIQUE violation (see `db::is_unique_violation`).
pub async fn insert_user(pool: &SqlitePool, name: &str, password_hash: &str) -> Result<UserRecord> {
    let user = sqlx::query_as::<_, UserRecord>(
        "INSERT INTO users (name, password) VALUES (?, ?) RETURNING id, name, password",
    )
    .bind(name)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}
