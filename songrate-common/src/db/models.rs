//! Database models

use serde::{Deserialize, Serialize};

use crate::api::types::UserResponse;

/// Stored user row, including the password hash
///
/// Deliberately not `Serialize`: convert with [`UserRecord::public`] before
/// returning it to a client.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub password: String,
}

impl UserRecord {
    pub fn public(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub link: Option<String>,
    pub genre: Option<String>,
    pub collection: Option<String>,
    pub cover: Option<String>,
}

/// Stored rating row with raw foreign keys
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RatingRecord {
    pub id: i64,
    pub value: i64,
    pub user_id: i64,
    pub song_id: i64,
}
