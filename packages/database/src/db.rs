//! Database connection utilities.

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::DbError;

/// Location of the store when `DATABASE_PATH` is not set.
pub const DEFAULT_DATABASE_PATH: &str = "data/restaurant_safety.db";

/// Opens the `SQLite` store at the path in the `DATABASE_PATH` environment
/// variable, falling back to [`DEFAULT_DATABASE_PATH`].
///
/// # Errors
///
/// Returns [`DbError`] if the file is missing or cannot be opened.
pub async fn connect_from_env() -> Result<Box<dyn Database>, DbError> {
    let path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());

    connect(Path::new(&path)).await
}

/// Opens the `SQLite` store at `path` in query-only mode.
///
/// The store is produced by the ingestion pipeline, so a missing file is
/// an error rather than an empty database.
///
/// # Errors
///
/// Returns [`DbError`] if the file is missing or cannot be opened.
pub async fn connect(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if !path.is_file() {
        return Err(DbError::Connection {
            message: format!("database file not found: {}", path.display()),
        });
    }

    log::debug!("Opening SQLite store at {}", path.display());

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Connection {
        message: e.to_string(),
    })?;

    // Nothing in this service writes; refuse it at the connection level.
    db.exec_raw("PRAGMA query_only = ON").await?;

    Ok(db)
}
