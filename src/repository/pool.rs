//! Connection pool and schema setup for the SQLite store.

use std::path::Path;
use std::time::Duration;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

use crate::error::{MonitorError, Result};

/// Connection pool for SQLite using r2d2.
pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Open (creating if necessary) the site database and apply schema.
pub fn open_pool(db_path: &Path) -> Result<SqlitePool> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path.display().to_string());

    let pool = Pool::builder()
        .max_size(10)
        .connection_timeout(Duration::from_secs(30))
        .build(manager)?;

    let mut conn = pool.get().map_err(|e| {
        MonitorError::Database(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::Unknown,
            Box::new(e.to_string()),
        ))
    })?;
    init_connection_pragmas(&mut conn)?;
    apply_schema(&mut conn)?;

    Ok(pool)
}

/// Initialize SQLite pragmas for a connection.
fn init_connection_pragmas(conn: &mut SqliteConnection) -> QueryResult<()> {
    diesel::sql_query("PRAGMA journal_mode = WAL").execute(conn)?;
    diesel::sql_query("PRAGMA synchronous = NORMAL").execute(conn)?;
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(conn)?;
    diesel::sql_query("PRAGMA busy_timeout = 5000").execute(conn)?;
    Ok(())
}

/// Create the sites table if it does not exist.
fn apply_schema(conn: &mut SqliteConnection) -> QueryResult<()> {
    diesel::sql_query(
        r#"CREATE TABLE IF NOT EXISTS sites (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL UNIQUE,
            content TEXT,
            ai_analysis TEXT,
            sentiment TEXT,
            keywords TEXT NOT NULL DEFAULT '[]',
            entities TEXT NOT NULL DEFAULT '[]',
            acknowledged INTEGER NOT NULL DEFAULT 0,
            timestamp TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )"#,
    )
    .execute(conn)?;
    Ok(())
}

/// Run a blocking Diesel operation asynchronously.
///
/// Wraps a sync closure in `spawn_blocking` so Diesel operations can be
/// used from async contexts without blocking the runtime.
pub async fn run_blocking<F, T>(pool: SqlitePool, f: F) -> Result<T>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| {
            MonitorError::Database(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::Unknown,
                Box::new(e.to_string()),
            ))
        })?;
        f(&mut conn)
    })
    .await
    .map_err(|e| {
        MonitorError::Database(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::Unknown,
            Box::new(e.to_string()),
        ))
    })?
}
