//! Rating database operations

use songrate_common::db::RatingRecord;
use songrate_common::{Error, Result};
use sqlx::SqlitePool;

use super::{ensure_ids_exist, Linked};
use crate::error::UNKNOWN_USER;

pub async fn get_rating(pool: &SqlitePool, id: i64) -> Result<Option<RatingRecord>> {
    let rating = sqlx::query_as::<_, RatingRecord>(
        "SELECT id, value, user_id, song_id FROM ratings WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(rating)
}

/// One page of a user's ratings ordered by id
pub async fn list_ratings_for_user(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<RatingRecord>> {
    let ratings = sqlx::query_as::<_, RatingRecord>(
        r#"
        SELECT id, value, user_id, song_id FROM ratings
        WHERE user_id = ?
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(ratings)
}

pub async fn count_ratings_for_user(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Bare rating values for a song; empty when the song has none (or is unknown)
pub async fn rating_values_for_song(pool: &SqlitePool, song_id: i64) -> Result<Vec<i64>> {
    let values: Vec<i64> =
        sqlx::query_scalar("SELECT value FROM ratings WHERE song_id = ? ORDER BY id")
            .bind(song_id)
            .fetch_all(pool)
            .await?;

    Ok(values)
}

/// Store a rating
///
/// Fails with `Unauthorized` if the rating user has no row (a token that
/// outlived its user) and with `NotFound` if the song does not exist.
///
/// `value` is expected to be range-checked already; the schema's CHECK
/// constraint rejects anything outside 1..=10 regardless.
pub async fn insert_rating(
    pool: &SqlitePool,
    value: i64,
    user_id: i64,
    song_id: i64,
) -> Result<RatingRecord> {
    let mut tx = pool.begin().await?;

    let user: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    if user.is_none() {
        return Err(Error::Unauthorized(UNKNOWN_USER.to_string()));
    }

    ensure_ids_exist(&mut tx, Linked::Songs, &[song_id]).await?;

    let rating = sqlx::query_as::<_, RatingRecord>(
        r#"
        INSERT INTO ratings (value, user_id, song_id)
        VALUES (?, ?, ?)
        RETURNING id, value, user_id, song_id
        "#,
    )
    .bind(value)
    .bind(user_id)
    .bind(song_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(rating)
}
