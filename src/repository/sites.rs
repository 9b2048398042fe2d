//! Site repository: all reads and writes for the sites table.

use chrono::Utc;
use diesel::prelude::*;

use super::pool::{run_blocking, SqlitePool};
use super::records::{NewSite, SiteRow};
use crate::error::{MonitorError, Result};
use crate::models::{Analysis, Entity, Sentiment, Site};
use crate::schema::sites;

/// Repository for tracked sites with compile-time checked queries.
#[derive(Clone)]
pub struct SiteRepository {
    pool: SqlitePool,
}

impl SiteRepository {
    /// Create a new site repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a newly discovered URL.
    ///
    /// A duplicate is a no-op, not an error; returns whether a row was
    /// actually inserted.
    pub async fn upsert_url(&self, url: &str) -> Result<bool> {
        let url = url.to_string();
        let now = Utc::now().to_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            let rows = diesel::insert_or_ignore_into(sites::table)
                .values(&NewSite {
                    url: &url,
                    keywords: "[]",
                    entities: "[]",
                    timestamp: &now,
                })
                .execute(conn)?;
            Ok(rows > 0)
        })
        .await
    }

    /// All known URLs, in insertion order.
    pub async fn list_urls(&self) -> Result<Vec<String>> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            Ok(sites::table
                .select(sites::url)
                .order(sites::id.asc())
                .load::<String>(conn)?)
        })
        .await
    }

    /// Overwrite the fetch/analysis state for an existing URL.
    ///
    /// Fails with `NotFound` (and leaves the store unchanged) if the URL
    /// was never discovered.
    pub async fn update_result(
        &self,
        url: &str,
        content: &str,
        analysis: &Analysis,
        sentiment: Sentiment,
        keywords: &[String],
        entities: &[Entity],
    ) -> Result<()> {
        let url = url.to_string();
        let content = content.to_string();
        let analysis_json = serde_json::to_string(analysis)?;
        let keywords_json = serde_json::to_string(keywords)?;
        let entities_json = serde_json::to_string(entities)?;
        let sentiment_str = sentiment.as_str();
        let now = Utc::now().to_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            let rows = diesel::update(sites::table.filter(sites::url.eq(&url)))
                .set((
                    sites::content.eq(Some(&content)),
                    sites::ai_analysis.eq(Some(&analysis_json)),
                    sites::sentiment.eq(Some(sentiment_str)),
                    sites::keywords.eq(&keywords_json),
                    sites::entities.eq(&entities_json),
                    sites::timestamp.eq(&now),
                ))
                .execute(conn)?;
            if rows == 0 {
                Err(MonitorError::NotFound(url.clone()))
            } else {
                Ok(())
            }
        })
        .await
    }

    /// Mark an alert as acknowledged by the operator.
    ///
    /// Idempotent: acknowledging an already-acknowledged record succeeds
    /// and leaves the flag set. The flag is never reset by the system.
    pub async fn acknowledge(&self, id: i32) -> Result<()> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            let rows = diesel::update(sites::table.find(id))
                .set(sites::acknowledged.eq(1))
                .execute(conn)?;
            if rows == 0 {
                Err(MonitorError::NotFound(format!("site {id}")))
            } else {
                Ok(())
            }
        })
        .await
    }

    /// Operator correction of a stored classification.
    ///
    /// Writes a well-formed analysis carrying the operator label and
    /// re-derives sentiment, so the sentiment/analysis consistency
    /// invariant holds across overrides too.
    pub async fn override_analysis(&self, id: i32, label: &str) -> Result<()> {
        let analysis = Analysis::operator_override(label);
        let sentiment_str = analysis.sentiment().as_str();
        let analysis_json = serde_json::to_string(&analysis)?;
        let now = Utc::now().to_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            let rows = diesel::update(sites::table.find(id))
                .set((
                    sites::ai_analysis.eq(Some(&analysis_json)),
                    sites::sentiment.eq(Some(sentiment_str)),
                    sites::timestamp.eq(&now),
                ))
                .execute(conn)?;
            if rows == 0 {
                Err(MonitorError::NotFound(format!("site {id}")))
            } else {
                Ok(())
            }
        })
        .await
    }

    /// Get a site by ID.
    pub async fn get(&self, id: i32) -> Result<Option<Site>> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            Ok(sites::table.find(id).first::<SiteRow>(conn).optional()?)
        })
        .await
        .map(|opt| opt.map(Site::from))
    }

    /// Get a site by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Site>> {
        let url = url.to_string();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            Ok(sites::table
                .filter(sites::url.eq(&url))
                .first::<SiteRow>(conn)
                .optional()?)
        })
        .await
        .map(|opt| opt.map(Site::from))
    }

    /// All sites, in insertion order.
    pub async fn get_all(&self) -> Result<Vec<Site>> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            Ok(sites::table
                .order(sites::id.asc())
                .load::<SiteRow>(conn)?)
        })
        .await
        .map(|rows| rows.into_iter().map(Site::from).collect())
    }
}
