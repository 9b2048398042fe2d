//! Diesel row types for the sites table.

use diesel::prelude::*;

use super::parse_datetime;
use crate::models::{Analysis, Entity, Sentiment, Site};
use crate::schema;

/// Site record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::sites)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SiteRow {
    pub id: i32,
    pub url: String,
    pub content: Option<String>,
    pub ai_analysis: Option<String>,
    pub sentiment: Option<String>,
    pub keywords: String,
    pub entities: String,
    pub acknowledged: i32,
    pub timestamp: String,
}

/// New site for insertion (url only; analysis fields arrive later).
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::sites)]
pub struct NewSite<'a> {
    pub url: &'a str,
    pub keywords: &'a str,
    pub entities: &'a str,
    pub timestamp: &'a str,
}

/// Convert a database record to a domain model.
///
/// Malformed JSON in the derived columns degrades to empty collections
/// rather than failing the read; the analysis blob is authoritative.
impl From<SiteRow> for Site {
    fn from(row: SiteRow) -> Self {
        let analysis: Option<Analysis> = row
            .ai_analysis
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());
        let keywords: Vec<String> = serde_json::from_str(&row.keywords).unwrap_or_default();
        let entities: Vec<Entity> = serde_json::from_str(&row.entities).unwrap_or_default();

        Site {
            id: row.id,
            url: row.url,
            content: row.content,
            sentiment: row.sentiment.as_deref().and_then(Sentiment::from_str),
            analysis,
            keywords,
            entities,
            acknowledged: row.acknowledged != 0,
            last_updated: parse_datetime(&row.timestamp),
        }
    }
}
