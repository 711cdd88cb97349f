//! Token verification middleware
//!
//! Protected routes require a signed access token in the `x-access-token`
//! header; `Authorization: Bearer <token>` is accepted as a fallback. A valid
//! token's user id is attached to the request as an [`AuthUser`].

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::{ApiError, ACCESS_DENIED};
use crate::AppState;

/// Request header carrying the access token
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Response header carrying a freshly issued token
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Identity decoded from a verified access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
}

/// Authentication middleware
///
/// Returns 401 Unauthorized if the token is absent, malformed, signed with
/// another secret, or expired.
///
/// **Note:** This is applied to protected routes only. Registration, login
/// and `/health` do NOT use this middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized(ACCESS_DENIED.to_string()))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        debug!("Token rejected: {}", e);
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(AuthUser { id: claims.id });

    Ok(next.run(request).await)
}

/// Find the token in the request headers
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(ACCESS_TOKEN_HEADER) {
        return value.to_str().ok().map(str::trim).filter(|t| !t.is_empty());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| ApiError::Unauthorized(ACCESS_DENIED.to_string()))
    }
}
