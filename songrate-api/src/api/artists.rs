//! Artist endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use songrate_common::api::Page;
use songrate_common::db::{Artist, Song};
use tracing::{debug, info};

use super::extract::{
    clearable_text, optional_text, parse_flag, parse_id, required_text, unique_ids, ListQuery,
    ValidJson, ValidQuery,
};
use crate::db::artists::{self, ArtistChanges, NewArtist};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const NOT_FOUND: &str = "Artist not found!";

/// Artist, optionally with its songs
#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    #[serde(flatten)]
    pub artist: Artist,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub songs: Option<Vec<Song>>,
}

#[derive(Debug, Serialize)]
pub struct ArtistList {
    pub artists: Vec<ArtistResponse>,
    #[serde(flatten)]
    pub page: Page,
}

/// Body of POST /api/artists/add
#[derive(Debug, Deserialize)]
pub struct NewArtistBody {
    #[serde(default)]
    pub name: String,
    pub link: Option<String>,
    /// Song ids
    #[serde(default)]
    pub songs: Vec<i64>,
}

/// Body of PUT /api/artists/update/:id
#[derive(Debug, Deserialize)]
pub struct ArtistUpdateBody {
    pub name: Option<String>,
    pub link: Option<String>,
    pub songs: Option<Vec<i64>>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/artists/get/:id", get(get_artist))
        .route("/api/artists/getAll", get(list_artists))
        .route("/api/artists/add", post(add_artist))
        .route("/api/artists/update/:id", put(update_artist))
}

/// GET /api/artists/get/:id
pub async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ArtistResponse>> {
    let id = parse_id(&id, "artist")?;
    debug!(artist_id = id, "Fetching artist");

    let artist = artists::get_artist(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    let songs = artists::songs_for_artist(&state.db, id).await?;

    Ok(Json(ArtistResponse {
        artist,
        songs: Some(songs),
    }))
}

/// GET /api/artists/getAll?size=&page=&omitSongs=
pub async fn list_artists(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> ApiResult<Json<ArtistList>> {
    let request = query.page_request()?;
    let omit_songs = parse_flag("omitSongs", query.omit_songs.as_deref())?;

    let total_items = artists::count_artists(&state.db).await?;
    let rows = artists::list_artists(&state.db, request.limit(), request.offset()).await?;

    let mut songs = if omit_songs {
        Default::default()
    } else {
        let ids: Vec<i64> = rows.iter().map(|a| a.id).collect();
        artists::songs_for_artists(&state.db, &ids).await?
    };

    let artists = rows
        .into_iter()
        .map(|artist| {
            let linked = if omit_songs {
                None
            } else {
                Some(songs.remove(&artist.id).unwrap_or_default())
            };
            ArtistResponse {
                artist,
                songs: linked,
            }
        })
        .collect();

    Ok(Json(ArtistList {
        artists,
        page: request.totals(total_items),
    }))
}

/// POST /api/artists/add
pub async fn add_artist(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<NewArtistBody>,
) -> ApiResult<Json<ArtistResponse>> {
    let new = NewArtist {
        name: required_text("name", &body.name)?,
        link: optional_text(body.link),
        song_ids: unique_ids(body.songs),
    };

    let artist = artists::insert_artist(&state.db, &new).await?;
    info!(artist_id = artist.id, name = %artist.name, songs = new.song_ids.len(), "Created artist");

    let songs = artists::songs_for_artist(&state.db, artist.id).await?;
    Ok(Json(ArtistResponse {
        artist,
        songs: Some(songs),
    }))
}

/// PUT /api/artists/update/:id
pub async fn update_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<ArtistUpdateBody>,
) -> ApiResult<Json<ArtistResponse>> {
    let id = parse_id(&id, "artist")?;

    let changes = ArtistChanges {
        name: body
            .name
            .as_deref()
            .map(|name| required_text("name", name))
            .transpose()?,
        link: clearable_text(body.link),
        song_ids: body.songs.map(unique_ids),
    };

    let artist = artists::update_artist(&state.db, id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    info!(artist_id = id, "Updated artist");

    let songs = artists::songs_for_artist(&state.db, id).await?;
    Ok(Json(ArtistResponse {
        artist,
        songs: Some(songs),
    }))
}
