//! Artist database operations

use std::collections::HashMap;

use songrate_common::db::{Artist, Song};
use songrate_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::{check_id_count, ensure_ids_exist, Linked, MAX_BOUND_IDS};

/// Fields for a new artist; `song_ids` must be deduplicated
#[derive(Debug, Clone, Default)]
pub struct NewArtist {
    pub name: String,
    pub link: Option<String>,
    pub song_ids: Vec<i64>,
}

/// Partial update; `None` leaves a field unchanged, `song_ids` replaces links
#[derive(Debug, Clone, Default)]
pub struct ArtistChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the link
    pub link: Option<Option<String>>,
    pub song_ids: Option<Vec<i64>>,
}

/// Load artist by id
pub async fn get_artist(pool: &SqlitePool, id: i64) -> Result<Option<Artist>> {
    let artist = sqlx::query_as::<_, Artist>("SELECT id, name, link FROM artists WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(artist)
}

/// Load several artists by id, ordered by id; unknown ids are skipped
///
/// `ids` come from a request body and are subject to [`MAX_BOUND_IDS`].
pub async fn get_artists(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<Artist>> {
    check_id_count(ids)?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id, name, link FROM artists WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");

    let artists = qb.build_query_as::<Artist>().fetch_all(pool).await?;
    Ok(artists)
}

/// One page of artists ordered by id
pub async fn list_artists(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Artist>> {
    let artists = sqlx::query_as::<_, Artist>(
        "SELECT id, name, link FROM artists ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(artists)
}

pub async fn count_artists(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artists")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Songs linked to one artist
pub async fn songs_for_artist(pool: &SqlitePool, artist_id: i64) -> Result<Vec<Song>> {
    let mut by_artist = songs_for_artists(pool, &[artist_id]).await?;
    Ok(by_artist.remove(&artist_id).unwrap_or_default())
}

/// Songs linked to each of `artist_ids`, one query per [`MAX_BOUND_IDS`] ids
pub async fn songs_for_artists(
    pool: &SqlitePool,
    artist_ids: &[i64],
) -> Result<HashMap<i64, Vec<Song>>> {
    let mut grouped: HashMap<i64, Vec<Song>> = HashMap::new();

    for chunk in artist_ids.chunks(MAX_BOUND_IDS) {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT l.artist_id, s.id, s.title, s.link, s.genre, s.collection, s.cover
            FROM artist_songs l
            JOIN songs s ON s.id = l.song_id
            WHERE l.artist_id IN (
            "#,
        );
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY s.id");

        let rows: Vec<SongLinkRow> = qb.build_query_as().fetch_all(pool).await?;
        for row in rows {
            grouped.entry(row.artist_id).or_default().push(row.into_song());
        }
    }

    Ok(grouped)
}

#[derive(sqlx::FromRow)]
struct SongLinkRow {
    artist_id: i64,
    id: i64,
    title: String,
    link: Option<String>,
    genre: Option<String>,
    collection: Option<String>,
    cover: Option<String>,
}

impl SongLinkRow {
    fn into_song(self) -> Song {
        Song {
            id: self.id,
            title: self.title,
            link: self.link,
            genre: self.genre,
            collection: self.collection,
            cover: self.cover,
        }
    }
}

/// Create an artist and link it to existing songs
///
/// Fails with `NotFound` if any song id is unknown; nothing is written then.
pub async fn insert_artist(pool: &SqlitePool, new: &NewArtist) -> Result<Artist> {
    let mut tx = pool.begin().await?;

    ensure_ids_exist(&mut tx, Linked::Songs, &new.song_ids).await?;

    let artist = sqlx::query_as::<_, Artist>(
        "INSERT INTO artists (name, link) VALUES (?, ?) RETURNING id, name, link",
    )
    .bind(&new.name)
    .bind(&new.link)
    .fetch_one(&mut *tx)
    .await?;

    link_songs(&mut tx, artist.id, &new.song_ids).await?;

    tx.commit().await?;
    Ok(artist)
}

/// Apply `changes` to an artist; `Ok(None)` if it does not exist
pub async fn update_artist(
    pool: &SqlitePool,
    id: i64,
    changes: &ArtistChanges,
) -> Result<Option<Artist>> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, Artist>(
        r#"
        UPDATE artists SET
            name = COALESCE(?, name),
            link = CASE WHEN ? THEN ? ELSE link END
        WHERE id = ?
        RETURNING id, name, link
        "#,
    )
    .bind(&changes.name)
    .bind(changes.link.is_some())
    .bind(changes.link.as_ref().and_then(|v| v.as_deref()))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(artist) = updated else {
        return Ok(None);
    };

    if let Some(song_ids) = &changes.song_ids {
        ensure_ids_exist(&mut tx, Linked::Songs, song_ids).await?;
        sqlx::query("DELETE FROM artist_songs WHERE artist_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_songs(&mut tx, id, song_ids).await?;
    }

    tx.commit().await?;
    Ok(Some(artist))
}

async fn link_songs(conn: &mut SqliteConnection, artist_id: i64, song_ids: &[i64]) -> Result<()> {
    for song_id in song_ids {
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

    async fn seed_songs(pool: &SqlitePool, titles: &[&str]) {
        for title in titles {
            sqlx::query("INSERT INTO songs (title) VALUES (?)")
                .bind(title)
                .execute(pool)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_insert_artist_with_songs() {
        let pool = init_memory_database().await.unwrap();
        seed_songs(&pool, &["One", "Two"]).await;

        let artist = insert_artist(
            &pool,
            &NewArtist {
                name: "Portishead".to_string(),
                link: Some("https://portishead.co.uk".to_string()),
                song_ids: vec![1, 2],
            },
        )
        .await
        .unwrap();

        let loaded = get_artist(&pool, artist.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Portishead");

        let songs = songs_for_artist(&pool, artist.id).await.unwrap();
        let titles: Vec<_> = songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[tokio::test]
    async fn test_insert_with_unknown_song_writes_nothing() {
        let pool = init_memory_database().await.unwrap();
        seed_songs(&pool, &["One"]).await;

        let err = insert_artist(
            &pool,
            &NewArtist {
                name: "Ghost".to_string(),
                link: None,
                song_ids: vec![1, 42],
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(count_artists(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let pool = init_memory_database().await.unwrap();
        for i in 0..5 {
            insert_artist(
                &pool,
                &NewArtist {
                    name: format!("Artist {}", i),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(count_artists(&pool).await.unwrap(), 5);

        let page = list_artists(&pool, 2, 2).await.unwrap();
        let names: Vec<_> = page.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Artist 2", "Artist 3"]);

        assert!(list_artists(&pool, 2, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_artist_replaces_links() {
        let pool = init_memory_database().await.unwrap();
        seed_songs(&pool, &["One", "Two", "Three"]).await;
        let artist = insert_artist(
            &pool,
            &NewArtist {
                name: "Old".to_string(),
                link: Some("https://old.example".to_string()),
                song_ids: vec![1, 2],
            },
        )
        .await
        .unwrap();

        let updated = update_artist(
            &pool,
            artist.id,
            &ArtistChanges {
                name: Some("New".to_string()),
                link: None,
                song_ids: Some(vec![3]),
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.name, "New");
        assert_eq!(updated.link.as_deref(), Some("https://old.example"));

        let songs = songs_for_artist(&pool, artist.id).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Three");
    }

    #[tokio::test]
    async fn test_update_artist_clears_link() {
        let pool = init_memory_database().await.unwrap();
        let artist = insert_artist(
            &pool,
            &NewArtist {
                name: "Linked".to_string(),
                link: Some("https://linked.example".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = update_artist(
            &pool,
            artist.id,
            &ArtistChanges {
                link: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.name, "Linked");
        assert!(updated.link.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_artist() {
        let pool = init_memory_database().await.unwrap();
        let result = update_artist(&pool, 77, &ArtistChanges::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_artists_skips_unknown() {
        let pool = init_memory_database().await.unwrap();
        insert_artist(&pool, &NewArtist { name: "A".into(), ..Default::default() })
            .await
            .unwrap();

        let found = get_artists(&pool, &[1, 5]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(get_artists(&pool, &[]).await.unwrap().is_empty());
    }
}
