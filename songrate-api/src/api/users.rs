//! User registration, login and lookup

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use songrate_common::api::{check_password_length, hash_password, verify_password, UserResponse};
use tracing::{debug, info};

use super::auth::{AuthUser, AUTH_TOKEN_HEADER};
use super::extract::{parse_id, required_text, ValidJson};
use crate::db::{is_unique_violation, users};
use crate::error::{ApiError, ApiResult, UNKNOWN_USER};
use crate::AppState;

const NAME_TAKEN: &str = "User already registered!";
const BAD_CREDENTIALS: &str = "Incorrect Password or Username!";

/// Registration and login body
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

/// Routes that issue tokens (no auth)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/add", post(register))
        .route("/api/users/login", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/get/:id", get(get_user))
        .route("/api/users/me", get(get_me))
}

/// POST /api/users/add
pub async fn register(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<Credentials>,
) -> ApiResult<Response> {
    let name = required_text("name", &body.name)?;
    required_text("password", &body.password)?;
    check_password_length(&body.password)?;

    if users::find_user_by_name(&state.db, &name).await?.is_some() {
        return Err(ApiError::Conflict(NAME_TAKEN.to_string()));
    }

    let password = body.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Hashing task failed: {}", e)))??;

    // A concurrent registration can still win the race to the UNIQUE index
    let user = match users::insert_user(&state.db, &name, &hash).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => return Err(ApiError::Conflict(NAME_TAKEN.to_string())),
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, name = %user.name, "Registered user");

    token_response(&state, user.public())
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<Credentials>,
) -> ApiResult<Response> {
    let name = required_text("name", &body.name)?;
    required_text("password", &body.password)?;

    let Some(user) = users::find_user_by_name(&state.db, &name).await? else {
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };

    let password = body.password;
    let stored_hash = user.password.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Hashing task failed: {}", e)))??;

    if !matches {
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    info!(user_id = user.id, "User logged in");

    token_response(&state, user.public())
}

/// GET /api/users/get/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let id = parse_id(&id, "user")?;
    lookup(&state, id).await
}

/// GET /api/users/me
pub async fn get_me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserResponse>> {
    lookup(&state, auth.id).await
}

async fn lookup(state: &AppState, id: i64) -> ApiResult<Json<UserResponse>> {
    debug!(user_id = id, "Looking up user");

    match users::find_user_by_id(&state.db, id).await? {
        Some(user) => Ok(Json(user.public())),
        None => Err(ApiError::Unauthorized(UNKNOWN_USER.to_string())),
    }
}

/// `{id, name}` body with a fresh token in the `x-auth-token` header
fn token_response(state: &AppState, user: UserResponse) -> ApiResult<Response> {
    let token = state.tokens.issue(user.id)?;
    Ok(([(AUTH_TOKEN_HEADER, token)], Json(user)).into_response())
}
