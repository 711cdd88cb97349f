//! Integration tests for database initialization against real files
//!
//! Covers:
//! - Database file is created on first run
//! - Reopening an existing database keeps its rows
//! - File-backed databases run in WAL mode

use songrate_common::db::init_database;
use tempfile::TempDir;

fn database_url(dir: &TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("songrate.db").display())
}

#[tokio::test]
async fn test_creates_database_file() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("songrate.db");
    assert!(!db_path.exists());

    let pool = init_database(&database_url(&dir)).await.expect("Should create database");
    pool.close().await;

    assert!(db_path.exists(), "Database file should be created");
}

#[tokio::test]
async fn test_reopen_preserves_rows() {
    let dir = TempDir::new().unwrap();
    let url = database_url(&dir);

    let pool = init_database(&url).await.unwrap();
    sqlx::query("INSERT INTO artists (name, link) VALUES ('Nina Simone', NULL)")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let reopened = init_database(&url).await.expect("Should reopen database");
    let names: Vec<String> = sqlx::query_scalar("SELECT name FROM artists")
        .fetch_all(&reopened)
        .await
        .unwrap();

    assert_eq!(names, vec!["Nina Simone".to_string()]);
}

#[tokio::test]
async fn test_file_database_uses_wal() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&database_url(&dir)).await.unwrap();

    let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(mode.to_lowercase(), "wal");
}
