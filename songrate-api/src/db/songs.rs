//! Song database operations

use std::collections::HashMap;

use songrate_common::db::{Artist, Song};
use songrate_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::{ensure_ids_exist, Linked, MAX_BOUND_IDS};

const SONG_COLUMNS: &str = "id, title, link, genre, collection, cover";

/// Fields for a new song; `artist_ids` must be deduplicated
#[derive(Debug, Clone, Default)]
pub struct NewSong {
    pub title: String,
    pub link: Option<String>,
    pub genre: Option<String>,
    pub collection: Option<String>,
    pub cover: Option<String>,
    pub artist_ids: Vec<i64>,
}

/// Partial update; `None` leaves a field unchanged, `artist_ids` replaces links
///
/// For the optional text fields `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct SongChanges {
    pub title: Option<String>,
    pub link: Option<Option<String>>,
    pub genre: Option<Option<String>>,
    pub collection: Option<Option<String>>,
    pub cover: Option<Option<String>>,
    pub artist_ids: Option<Vec<i64>>,
}

/// Average and count of a song's ratings
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct RatingSummary {
    /// `None` when the song has no ratings
    pub average: Option<f64>,
    pub count: i64,
}

pub async fn get_song(pool: &SqlitePool, id: i64) -> Result<Option<Song>> {
    let song = sqlx::query_as::<_, Song>(&format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(song)
}

/// Load several songs by id; unknown ids are skipped
///
/// Sorted `ids` give id-ordered results.
pub async fn get_songs(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<Song>> {
    let mut songs = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(MAX_BOUND_IDS) {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {SONG_COLUMNS} FROM songs WHERE id IN ("));
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        songs.extend(qb.build_query_as::<Song>().fetch_all(pool).await?);
    }

    Ok(songs)
}

/// One page of songs ordered by id
pub async fn list_songs(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>(&format!(
        "SELECT {SONG_COLUMNS} FROM songs ORDER BY id LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(songs)
}

pub async fn count_songs(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Artists linked to one song
pub async fn artists_for_song(pool: &SqlitePool, song_id: i64) -> Result<Vec<Artist>> {
    let mut by_song = artists_for_songs(pool, &[song_id]).await?;
    Ok(by_song.remove(&song_id).unwrap_or_default())
}

/// Artists linked to each of `song_ids`, one query per [`MAX_BOUND_IDS`] ids
pub async fn artists_for_songs(
    pool: &SqlitePool,
    song_ids: &[i64],
) -> Result<HashMap<i64, Vec<Artist>>> {
    let mut grouped: HashMap<i64, Vec<Artist>> = HashMap::new();

    for chunk in song_ids.chunks(MAX_BOUND_IDS) {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT l.song_id, a.id, a.name, a.link
            FROM artist_songs l
            JOIN artists a ON a.id = l.artist_id
            WHERE l.song_id IN (
            "#,
        );
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY a.id");

        let rows: Vec<(i64, i64, String, Option<String>)> =
            qb.build_query_as().fetch_all(pool).await?;
        for (song_id, id, name, link) in rows {
            grouped
                .entry(song_id)
                .or_default()
                .push(Artist { id, name, link });
        }
    }

    Ok(grouped)
}

/// `AVG`/`COUNT` over a song's ratings, computed by the database
pub async fn rating_summary(pool: &SqlitePool, song_id: i64) -> Result<RatingSummary> {
    let summary = sqlx::query_as::<_, RatingSummary>(
        "SELECT AVG(value) AS average, COUNT(*) AS count FROM ratings WHERE song_id = ?",
    )
    .bind(song_id)
    .fetch_one(pool)
    .await?;

    Ok(summary)
}

/// Create a song and link it to existing artists
///
/// Fails with `NotFound` if any artist id is unknown; nothing is written then.
pub async fn insert_song(pool: &SqlitePool, new: &NewSong) -> Result<Song> {
    let mut tx = pool.begin().await?;

    ensure_ids_exist(&mut tx, Linked::Artists, &new.artist_ids).await?;

    let song = sqlx::query_as::<_, Song>(&format!(
        r#"
        INSERT INTO songs (title, link, genre, collection, cover)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {SONG_COLUMNS}
        "#
    ))
    .bind(&new.title)
    .bind(&new.link)
    .bind(&new.genre)
    .bind(&new.collection)
    .bind(&new.cover)
    .fetch_one(&mut *tx)
    .await?;

    link_artists(&mut tx, song.id, &new.artist_ids).await?;

    tx.commit().await?;
    Ok(song)
}

/// Apply `changes` to a song; `Ok(None)` if it does not exist
pub async fn update_song(
    pool: &SqlitePool,
    id: i64,
    changes: &SongChanges,
) -> Result<Option<Song>> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, Song>(&format!(
        r#"
        UPDATE songs SET
            title = COALESCE(?, title),
            link = CASE WHEN ? THEN ? ELSE link END,
            genre = CASE WHEN ? THEN ? ELSE genre END,
            collection = CASE WHEN ? THEN ? ELSE collection END,
            cover = CASE WHEN ? THEN ? ELSE cover END
        WHERE id = ?
        RETURNING {SONG_COLUMNS}
        "#
    ))
    .bind(&changes.title)
    .bind(changes.link.is_some())
    .bind(changes.link.as_ref().and_then(|v| v.as_deref()))
    .bind(changes.genre.is_some())
    .bind(changes.genre.as_ref().and_then(|v| v.as_deref()))
    .bind(changes.collection.is_some())
    .bind(changes.collection.as_ref().and_then(|v| v.as_deref()))
    .bind(changes.cover.is_some())
    .bind(changes.cover.as_ref().and_then(|v| v.as_deref()))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(song) = updated else {
        return Ok(None);
    };

    if let Some(artist_ids) = &changes.artist_ids {
        ensure_ids_exist(&mut tx, Linked::Artists, artist_ids).await?;
        sqlx::query("DELETE FROM artist_songs WHERE song_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_artists(&mut tx, id, artist_ids).await?;
    }

    tx.commit().await?;
    Ok(Some(song))
}

async fn link_artists(conn: &mut SqliteConnection, song_id: i64, artist_ids: &[i64]) -> Result<()> {
    for artist_id in artist_ids {
        sqlx::query("INSERT OR IGNORE INTO artist_songs (artist_id, song_id) VALUES (?, ?)")
            .bind(artist_id)
            .bind(song_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use songrate_common::db::init_memory_database;
    use songrate_common::Error;

    async fn seed_artist(pool: &SqlitePool, name: &str) -> i64 {
        sqlx::query_scalar("INSERT INTO artists (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn seed_rating(pool: &SqlitePool, song_id: i64, value: i64) {
        sqlx::query("INSERT OR IGNORE INTO users (id, name, password) VALUES (1, 'rater', 'h')")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO ratings (value, user_id, song_id) VALUES (?, 1, ?)")
            .bind(value)
            .bind(song_id)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_insert_song_with_artists() {
        let pool = init_memory_database().await.unwrap();
        let massive = seed_artist(&pool, "Massive Attack").await;
        let tracey = seed_artist(&pool, "Tracey Thorn").await;

        let song = insert_song(
            &pool,
            &NewSong {
                title: "Protection".to_string(),
                genre: Some("Trip-hop".to_string()),
                artist_ids: vec![massive, tracey],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let loaded = get_song(&pool, song.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Protection");
        assert_eq!(loaded.genre.as_deref(), Some("Trip-hop"));
        assert!(loaded.cover.is_none());

        let artists = artists_for_song(&pool, song.id).await.unwrap();
        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].name, "Massive Attack");
    }

    #[tokio::test]
    async fn test_insert_with_unknown_artist_writes_nothing() {
        let pool = init_memory_database().await.unwrap();

        let err = insert_song(
            &pool,
            &NewSong {
                title: "Orphan".to_string(),
                artist_ids: vec![3],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        match err {
            Error::NotFound(msg) => assert!(msg.starts_with("Artist not found!")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
        assert_eq!(count_songs(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rating_summary() {
        let pool = init_memory_database().await.unwrap();
        let song = insert_song(&pool, &NewSong { title: "Test".into(), ..Default::default() })
            .await
            .unwrap();

        let empty = rating_summary(&pool, song.id).await.unwrap();
        assert_eq!(empty.count, 0);
        assert!(empty.average.is_none());

        seed_rating(&pool, song.id, 4).await;
        seed_rating(&pool, song.id, 9).await;

        let summary = rating_summary(&pool, song.id).await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average, Some(6.5));
    }

    #[tokio::test]
    async fn test_artists_for_songs_groups_by_song() {
        let pool = init_memory_database().await.unwrap();
        let a = seed_artist(&pool, "A").await;
        let b = seed_artist(&pool, "B").await;
        let first = insert_song(&pool, &NewSong { title: "1".into(), artist_ids: vec![a], ..Default::default() })
            .await
            .unwrap();
        let second = insert_song(&pool, &NewSong { title: "2".into(), artist_ids: vec![a, b], ..Default::default() })
            .await
            .unwrap();
        let lonely = insert_song(&pool, &NewSong { title: "3".into(), ..Default::default() })
            .await
            .unwrap();

        let grouped = artists_for_songs(&pool, &[first.id, second.id, lonely.id])
            .await
            .unwrap();
        assert_eq!(grouped[&first.id].len(), 1);
        assert_eq!(grouped[&second.id].len(), 2);
        assert!(!grouped.contains_key(&lonely.id));
    }

    #[tokio::test]
    async fn test_update_song_keeps_unset_fields() {
        let pool = init_memory_database().await.unwrap();
        let a = seed_artist(&pool, "A").await;
        let b = seed_artist(&pool, "B").await;
        let song = insert_song(
            &pool,
            &NewSong {
                title: "Draft".into(),
                cover: Some("https://img.example/1.jpg".into()),
                artist_ids: vec![a],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = update_song(
            &pool,
            song.id,
            &SongChanges {
                title: Some("Final".into()),
                artist_ids: Some(vec![b]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.cover.as_deref(), Some("https://img.example/1.jpg"));

        let artists = artists_for_song(&pool, song.id).await.unwrap();
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].id, b);
    }

    #[tokio::test]
    async fn test_update_song_clears_and_sets_fields() {
        let pool = init_memory_database().await.unwrap();
        let song = insert_song(
            &pool,
            &NewSong {
                title: "Tagged".into(),
                genre: Some("Ambient".into()),
                collection: Some("Selected".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = update_song(
            &pool,
            song.id,
            &SongChanges {
                genre: Some(None),
                cover: Some(Some("https://img.example/2.jpg".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert!(updated.genre.is_none());
        assert_eq!(updated.collection.as_deref(), Some("Selected"));
        assert_eq!(updated.cover.as_deref(), Some("https://img.example/2.jpg"));
    }

    #[tokio::test]
    async fn test_bulk_lookups_span_several_chunks() {
        let pool = init_memory_database().await.unwrap();
        sqlx::query(
            r#"
            WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 1200)
            INSERT INTO songs (title) SELECT 'Song ' || i FROM n
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        let a = seed_artist(&pool, "Prolific").await;
        sqlx::query("INSERT INTO artist_songs (artist_id, song_id) VALUES (?, 1), (?, 1200)")
            .bind(a)
            .bind(a)
            .execute(&pool)
            .await
            .unwrap();

        let ids: Vec<i64> = (1..=1200).collect();
        let songs = get_songs(&pool, &ids).await.unwrap();
        assert_eq!(songs.len(), 1200);
        assert!(songs.windows(2).all(|w| w[0].id < w[1].id));

        let grouped = artists_for_songs(&pool, &ids).await.unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&1200][0].name, "Prolific");
    }

    #[tokio::test]
    async fn test_pagination_window() {
        let pool = init_memory_database().await.unwrap();
        for i in 1..=7 {
            insert_song(&pool, &NewSong { title: format!("Song {i}"), ..Default::default() })
                .await
                .unwrap();
        }

        assert_eq!(count_songs(&pool).await.unwrap(), 7);
        assert_eq!(list_songs(&pool, 3, 0).await.unwrap().len(), 3);
        assert_eq!(list_songs(&pool, 3, 6).await.unwrap().len(), 1);
        assert!(list_songs(&pool, 3, 9).await.unwrap().is_empty());
    }
}
