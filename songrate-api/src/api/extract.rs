//! Request extractors and input parsing shared by all route groups
//!
//! Every malformed input is turned into a Bad-Request before a handler
//! touches the database.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::error::ApiError;
use crate::pagination::PageRequest;

/// JSON body whose rejection is reported as a Bad-Request `ApiError`
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                Err(ApiError::BadRequest(format!(
                    "Invalid request data: {}",
                    rejection.body_text()
                )))
            }
        }
    }
}

/// Query string whose rejection is reported as a Bad-Request `ApiError`
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest(format!(
                "Invalid query parameters: {}",
                rejection.body_text()
            ))),
        }
    }
}

/// Raw query of the paginated list endpoints
///
/// Values stay strings so a bad number is reported by [`ListQuery::page_request`]
/// with the parameter's name.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub size: Option<String>,
    /// Alias for `size`
    pub limit: Option<String>,
    pub page: Option<String>,
    pub omit_songs: Option<String>,
    pub omit_artists: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self) -> Result<PageRequest, ApiError> {
        let size = self.size.as_deref().or(self.limit.as_deref());
        PageRequest::parse(size, self.page.as_deref()).map_err(ApiError::BadRequest)
    }
}

/// Parse a numeric path id, naming the entity in the error message
pub fn parse_id(raw: &str, entity: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} id!", entity)))
}

/// Parse an optional boolean query flag; only `true`/`false` are accepted
pub fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool, ApiError> {
    match raw.map(str::trim) {
        None | Some("") | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(ApiError::BadRequest(format!(
            "Invalid query parameter {}: {:?}",
            name, other
        ))),
    }
}

/// Reject missing or whitespace-only required strings; returns the trimmed value
pub fn required_text(field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("Missing required field: {}", field)));
    }
    Ok(trimmed.to_string())
}

/// Normalize optional text: blank strings become `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Optional text of an update body
///
/// Absent or `null` leaves the field unchanged (`None`); a blank string
/// clears it (`Some(None)`).
pub fn clearable_text(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| Some(v.trim().to_string()).filter(|v| !v.is_empty()))
}

/// Sort and deduplicate an id list
pub fn unique_ids(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "song").unwrap(), 42);
        let err = parse_id("abc", "rating").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Invalid rating id!"));
        assert!(parse_id("", "song").is_err());
        assert!(parse_id("4.2", "song").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag("omitSongs", None).unwrap());
        assert!(!parse_flag("omitSongs", Some("false")).unwrap());
        assert!(parse_flag("omitSongs", Some("true")).unwrap());
        assert!(parse_flag("omitSongs", Some("yes")).is_err());
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", "  Bjork ").unwrap(), "Bjork");
        assert!(required_text("name", "   ").is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some(" rock ".into())), Some("rock".into()));
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_clearable_text() {
        assert_eq!(clearable_text(None), None);
        assert_eq!(clearable_text(Some(" ".into())), Some(None));
        assert_eq!(clearable_text(Some(" pop ".into())), Some(Some("pop".into())));
    }

    #[test]
    fn test_list_query_limit_alias() {
        let query = ListQuery {
            limit: Some("5".into()),
            page: Some("2".into()),
            ..Default::default()
        };
        let page = query.page_request().unwrap();
        assert_eq!(page.limit(), 5);
        assert_eq!(page.offset(), 5);

        let both = ListQuery {
            size: Some("7".into()),
            limit: Some("5".into()),
            ..Default::default()
        };
        assert_eq!(both.page_request().unwrap().limit(), 7);

        let bad = ListQuery {
            page: Some("-1".into()),
            ..Default::default()
        };
        assert!(matches!(bad.page_request(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_unique_ids() {
        assert_eq!(unique_ids(vec![3, 1, 3, 2, 1]), vec![1, 2, 3]);
        assert!(unique_ids(vec![]).is_empty());
    }
}
