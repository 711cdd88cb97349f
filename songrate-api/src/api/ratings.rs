//! Rating endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use songrate_common::api::{Page, UserResponse};
use songrate_common::db::RatingRecord;
use tracing::{debug, info};

use super::auth::AuthUser;
use super::extract::{parse_id, unique_ids, ListQuery, ValidJson, ValidQuery};
use super::songs::{with_artists, SongResponse};
use crate::db::{ratings, songs, users};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Inclusive bounds of a rating value
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 10;

const NOT_FOUND: &str = "Rating not found!";

/// Rating with its user and song, when loaded
#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub id: i64,
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song: Option<SongResponse>,
}

#[derive(Debug, Serialize)]
pub struct RatingList {
    pub ratings: Vec<RatingResponse>,
    #[serde(flatten)]
    pub page: Page,
}

/// Body of POST /api/ratings/add
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRatingBody {
    pub value: Option<i64>,
    pub song_id: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/ratings/get/:id", get(get_rating))
        .route("/api/ratings/getAll", get(list_my_ratings))
        .route("/api/ratings/getBySong/:id", get(values_for_song))
        .route("/api/ratings/add", post(add_rating))
}

/// Check a submitted rating value
pub fn validate_value(value: i64) -> Result<i64, ApiError> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(format!(
            "Rating value must be between {} and {}",
            MIN_RATING, MAX_RATING
        )))
    }
}

/// GET /api/ratings/get/:id
pub async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RatingResponse>> {
    let id = parse_id(&id, "rating")?;
    debug!(rating_id = id, "Fetching rating");

    let rating = ratings::get_rating(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    Ok(Json(expand(&state, rating).await?))
}

/// GET /api/ratings/getAll?size=&page=
///
/// Only the caller's own ratings are listed.
pub async fn list_my_ratings(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> ApiResult<Json<RatingList>> {
    let request = query.page_request()?;

    let total_items = ratings::count_ratings_for_user(&state.db, auth.id).await?;
    let rows =
        ratings::list_ratings_for_user(&state.db, auth.id, request.limit(), request.offset())
            .await?;

    let song_ids = unique_ids(rows.iter().map(|r| r.song_id).collect());
    let linked: HashMap<i64, SongResponse> =
        with_artists(&state, songs::get_songs(&state.db, &song_ids).await?)
            .await?
            .into_iter()
            .map(|s| (s.song.id, s))
            .collect();

    // A song can carry several of the caller's ratings
    let ratings = rows
        .into_iter()
        .map(|rating| RatingResponse {
            id: rating.id,
            value: rating.value,
            user: None,
            song: linked.get(&rating.song_id).cloned(),
        })
        .collect();

    Ok(Json(RatingList {
        ratings,
        page: request.totals(total_items),
    }))
}

/// GET /api/ratings/getBySong/:id
pub async fn values_for_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<i64>>> {
    let id = parse_id(&id, "song")?;
    Ok(Json(ratings::rating_values_for_song(&state.db, id).await?))
}

/// POST /api/ratings/add
pub async fn add_rating(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(body): ValidJson<NewRatingBody>,
) -> ApiResult<Json<RatingResponse>> {
    let value = body
        .value
        .ok_or_else(|| ApiError::BadRequest("Missing required field: value".to_string()))
        .and_then(validate_value)?;
    let song_id = body
        .song_id
        .ok_or_else(|| ApiError::BadRequest("Missing required field: songId".to_string()))?;

    let rating = ratings::insert_rating(&state.db, value, auth.id, song_id).await?;
    info!(rating_id = rating.id, user_id = auth.id, song_id, value, "Created rating");

    Ok(Json(expand(&state, rating).await?))
}

/// Load the user and song (with artists) a rating refers to
async fn expand(state: &AppState, rating: RatingRecord) -> ApiResult<RatingResponse> {
    let user = users::find_user_by_id(&state.db, rating.user_id)
        .await?
        .map(|u| u.public());

    let song = match songs::get_song(&state.db, rating.song_id).await? {
        Some(song) => with_artists(state, vec![song]).await?.pop(),
        None => None,
    };

    Ok(RatingResponse {
        id: rating.id,
        value: rating.value,
        user,
        song,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_value_bounds() {
        assert_eq!(validate_value(1).unwrap(), 1);
        assert_eq!(validate_value(10).unwrap(), 10);
        for bad in [0, 11, -5, 100] {
            assert!(matches!(validate_value(bad), Err(ApiError::BadRequest(_))));
        }
    }
}
