//! Shared API request/response types

use serde::{Deserialize, Serialize};

/// Error body emitted for every failed request
///
/// # Examples
///
/// ```
/// use songrate_common::api::types::ErrorResponse;
///
/// let body = ErrorResponse::new(404, "Song not found!");
/// let json = serde_json::to_value(&body).unwrap();
/// assert_eq!(json["status"], 404);
/// assert_eq!(json["message"], "Song not found!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    /// HTTP status code
    pub status: u16,
    /// Human-readable message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
}

/// Totals attached to every paginated list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub total_items: i64,
    pub total_pages: i64,
}
