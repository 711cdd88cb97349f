//! Database initialization
//!
//! Opens (creating if necessary) the SQLite database and creates the schema.
//! Every statement is `CREATE ... IF NOT EXISTS`, so initialization is
//! idempotent and runs on every startup.

#![cfg(feature = "sqlx")]

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::Result;

/// URL of a private in-memory database, used by tests
pub const MEMORY_DATABASE_URL: &str = "sqlite::memory:";

const MAX_CONNECTIONS: u32 = 10;

/// Open the database at `database_url` and create any missing tables.
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    let in_memory = is_memory_url(database_url);

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    if !in_memory {
        // WAL lets readers proceed while a write is in flight
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    // Each connection to `:memory:` is its own database, so an in-memory pool
    // must hold exactly one connection and never recycle it.
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
    };

    let pool = pool_options.connect_with(options).await?;

    create_schema(&pool).await?;

    if in_memory {
        info!("Initialized in-memory database");
    } else {
        info!("Opened database: {}", database_url);
    }

    Ok(pool)
}

/// Open a fresh in-memory database with the full schema
pub async fn init_memory_database() -> Result<SqlitePool> {
    init_database(MEMORY_DATABASE_URL).await
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_artists_table(pool).await?;
    create_songs_table(pool).await?;
    create_artist_songs_table(pool).await?;
    create_ratings_table(pool).await?;
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            link TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            link TEXT,
            genre TEXT,
            collection TEXT,
            cover TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Song ↔ artist association; no ordering semantics
async fn create_artist_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artist_songs (
            artist_id INTEGER NOT NULL REFERENCES artists(id) ON DELETE CASCADE,
            song_id INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
            PRIMARY KEY (artist_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_artist_songs_song ON artist_songs(song_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_ratings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            value INTEGER NOT NULL CHECK (value BETWEEN 1 AND 10),
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            song_id INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ratings_user ON ratings(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ratings_song ON ratings(song_id)")
        .execute(pool)
        .await?;

    Ok(())
}
