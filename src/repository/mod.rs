//! Persistence layer for tracked sites.
//!
//! SQLite via sync Diesel wrapped in `spawn_blocking`, since diesel-async
//! only supports Postgres/MySQL. A single r2d2 pool serializes access for
//! both the monitoring loop and the dashboard handlers.

mod pool;
mod records;
mod sites;

pub use pool::{open_pool, run_blocking, SqlitePool};
pub use sites::SiteRepository;

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp stored as text, falling back to now.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
