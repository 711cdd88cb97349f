//! Database access layer for songrate-api
//!
//! One module per entity, each a set of free functions over a `SqlitePool`
//! (or a transaction's connection for multi-statement writes). Schema creation
//! lives in `songrate_common::db`.

use songrate_common::{Error, Result};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

pub mod artists;
pub mod ratings;
pub mod songs;
pub mod users;

pub use songrate_common::db::init_database;

/// Most ids bound into one `IN (...)` list
///
/// Id lists from request bodies longer than this are rejected; internal
/// lookups over larger sets are split into chunks of this size.
pub const MAX_BOUND_IDS: usize = 500;

/// Tables that other rows can reference by id list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linked {
    Artists,
    Songs,
}

impl Linked {
    fn table(self) -> &'static str {
        match self {
            Linked::Artists => "artists",
            Linked::Songs => "songs",
        }
    }

    fn not_found(self) -> &'static str {
        match self {
            Linked::Artists => "Artist not found!",
            Linked::Songs => "Song not found!",
        }
    }
}

/// Fail with `InvalidInput` if a client-supplied id list is too long to bind
pub fn check_id_count(ids: &[i64]) -> Result<()> {
    if ids.len() > MAX_BOUND_IDS {
        return Err(Error::InvalidInput(format!(
            "Too many linked ids: {} given, at most {} allowed",
            ids.len(),
            MAX_BOUND_IDS
        )));
    }
    Ok(())
}

/// Fail with `NotFound` unless every id exists in `linked`
///
/// `ids` must already be deduplicated.
pub async fn ensure_ids_exist(
    conn: &mut SqliteConnection,
    linked: Linked,
    ids: &[i64],
) -> Result<()> {
    check_id_count(ids)?;
    if ids.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT id FROM {} WHERE id IN (", linked.table()));
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let found: Vec<i64> = qb.build_query_scalar().fetch_all(&mut *conn).await?;

    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(Error::NotFound(format!(
            "{} (id {})",
            linked.not_found(),
            missing
        ))),
        None => Ok(()),
    }
}

/// True when `err` is a UNIQUE constraint failure
pub fn is_unique_violation(err: &Error) -> bool {
    match err {
        Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}
