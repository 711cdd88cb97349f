//! Song endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use songrate_common::api::Page;
use songrate_common::db::{Artist, Song};
use tracing::{debug, info, warn};

use super::extract::{
    clearable_text, optional_text, parse_flag, parse_id, required_text, unique_ids, ListQuery,
    ValidJson, ValidQuery,
};
use crate::db::artists;
use crate::db::songs::{self, NewSong, SongChanges};
use crate::error::{ApiError, ApiResult};
use crate::services::{apply_match, search_term, CatalogLookup};
use crate::AppState;

const NOT_FOUND: &str = "Song not found!";
const ARTIST_NOT_FOUND: &str = "Artist not found!";

/// Song, optionally with its artists
#[derive(Debug, Clone, Serialize)]
pub struct SongResponse {
    #[serde(flatten)]
    pub song: Song,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artists: Option<Vec<Artist>>,
}

/// Song with artists and rating aggregate
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetail {
    #[serde(flatten)]
    pub song: Song,
    pub artists: Vec<Artist>,
    pub rating_avg: Option<f64>,
    pub rating_count: i64,
}

#[derive(Debug, Serialize)]
pub struct SongList {
    pub songs: Vec<SongResponse>,
    #[serde(flatten)]
    pub page: Page,
}

/// Body of POST /api/songs/add
#[derive(Debug, Deserialize)]
pub struct NewSongBody {
    #[serde(default)]
    pub title: String,
    pub link: Option<String>,
    pub genre: Option<String>,
    pub collection: Option<String>,
    pub cover: Option<String>,
    /// Artist ids
    #[serde(default)]
    pub artists: Vec<i64>,
}

/// Body of PUT /api/songs/update/:id
#[derive(Debug, Deserialize)]
pub struct SongUpdateBody {
    pub title: Option<String>,
    pub link: Option<String>,
    pub genre: Option<String>,
    pub collection: Option<String>,
    pub cover: Option<String>,
    pub artists: Option<Vec<i64>>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/songs/get/:id", get(get_song))
        .route("/api/songs/getAll", get(list_songs))
        .route("/api/songs/add", post(add_song))
        .route("/api/songs/update/:id", put(update_song))
}

/// GET /api/songs/get/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SongDetail>> {
    let id = parse_id(&id, "song")?;
    debug!(song_id = id, "Fetching song");

    let song = songs::get_song(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    let artists = songs::artists_for_song(&state.db, id).await?;
    let summary = songs::rating_summary(&state.db, id).await?;

    Ok(Json(SongDetail {
        song,
        artists,
        rating_avg: summary.average,
        rating_count: summary.count,
    }))
}

/// GET /api/songs/getAll?size=&page=&omitArtists=
pub async fn list_songs(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> ApiResult<Json<SongList>> {
    let request = query.page_request()?;
    let omit_artists = parse_flag("omitArtists", query.omit_artists.as_deref())?;

    let total_items = songs::count_songs(&state.db).await?;
    let rows = songs::list_songs(&state.db, request.limit(), request.offset()).await?;

    let songs = if omit_artists {
        rows.into_iter()
            .map(|song| SongResponse { song, artists: None })
            .collect()
    } else {
        with_artists(&state, rows).await?
    };

    Ok(Json(SongList {
        songs,
        page: request.totals(total_items),
    }))
}

/// POST /api/songs/add
pub async fn add_song(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<NewSongBody>,
) -> ApiResult<Json<SongResponse>> {
    let mut new = NewSong {
        title: required_text("title", &body.title)?,
        link: optional_text(body.link),
        genre: optional_text(body.genre),
        collection: optional_text(body.collection),
        cover: optional_text(body.cover),
        artist_ids: unique_ids(body.artists),
    };

    if let Some(catalog) = &state.catalog {
        if new.genre.is_none() || new.collection.is_none() || new.cover.is_none() {
            // Unknown artists fail the request before any outbound lookup
            let linked = artists::get_artists(&state.db, &new.artist_ids).await?;
            if let Some(missing) = new
                .artist_ids
                .iter()
                .find(|id| !linked.iter().any(|a| a.id == **id))
            {
                return Err(ApiError::NotFound(format!(
                    "{} (id {})",
                    ARTIST_NOT_FOUND, missing
                )));
            }
            enrich(catalog.as_ref(), &mut new, linked.first()).await;
        }
    }

    let song = songs::insert_song(&state.db, &new).await?;
    info!(song_id = song.id, title = %song.title, artists = new.artist_ids.len(), "Created song");

    let artists = songs::artists_for_song(&state.db, song.id).await?;
    Ok(Json(SongResponse {
        song,
        artists: Some(artists),
    }))
}

/// PUT /api/songs/update/:id
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<SongUpdateBody>,
) -> ApiResult<Json<SongResponse>> {
    let id = parse_id(&id, "song")?;

    let changes = SongChanges {
        title: body
            .title
            .as_deref()
            .map(|title| required_text("title", title))
            .transpose()?,
        link: clearable_text(body.link),
        genre: clearable_text(body.genre),
        collection: clearable_text(body.collection),
        cover: clearable_text(body.cover),
        artist_ids: body.artists.map(unique_ids),
    };

    let song = songs::update_song(&state.db, id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    info!(song_id = id, "Updated song");

    let artists = songs::artists_for_song(&state.db, id).await?;
    Ok(Json(SongResponse {
        song,
        artists: Some(artists),
    }))
}

/// Attach each song's artists, fetched in one query
pub(crate) async fn with_artists(state: &AppState, rows: Vec<Song>) -> ApiResult<Vec<SongResponse>> {
    let ids: Vec<i64> = rows.iter().map(|s| s.id).collect();
    let mut artists = songs::artists_for_songs(&state.db, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|song| {
            let linked = artists.remove(&song.id).unwrap_or_default();
            SongResponse {
                song,
                artists: Some(linked),
            }
        })
        .collect())
}

/// Fill missing metadata from the catalog; lookup failures are only logged
async fn enrich(catalog: &dyn CatalogLookup, new: &mut NewSong, first_artist: Option<&Artist>) {
    let term = search_term(&new.title, first_artist.map(|a| a.name.as_str()));

    match catalog.search(&term).await {
        Ok(Some(found)) => {
            debug!(term = %term, "Catalog match found");
            apply_match(new, found);
        }
        Ok(None) => debug!(term = %term, "No catalog match"),
        Err(e) => warn!(term = %term, "Catalog lookup failed: {}", e),
    }
}
