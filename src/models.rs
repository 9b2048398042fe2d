//! Domain models for tracked sites and their analysis state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentiment classification of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Sentiment::Negative)
    }
}

/// Structured classification result.
///
/// Persisted as JSON in the `analysis` column so operator overrides and
/// schema evolution never require parsing a stringified blob. `model`
/// records which model (or override path) produced the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub label: String,
    pub confidence: f64,
    pub model: String,
}

impl Analysis {
    /// Model name recorded when an operator overrides the stored analysis.
    pub const OVERRIDE_MODEL: &'static str = "operator-override";

    pub fn new(label: impl Into<String>, confidence: f64, model: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            confidence,
            model: model.into(),
        }
    }

    /// Build the analysis recorded for an operator correction.
    pub fn operator_override(label: impl Into<String>) -> Self {
        Self::new(label, 1.0, Self::OVERRIDE_MODEL)
    }

    /// Derive sentiment from the classifier label.
    ///
    /// Negative iff the top label is the negative class. Every other
    /// label, recognized or not (POSITIVE, NEUTRAL, ...), collapses to
    /// positive.
    pub fn sentiment(&self) -> Sentiment {
        if self.label.eq_ignore_ascii_case("negative") {
            Sentiment::Negative
        } else {
            Sentiment::Positive
        }
    }

    /// One-line summary used in alert payloads and reports.
    pub fn summary(&self) -> String {
        format!(
            "{} (confidence {:.2}, model {})",
            self.label, self.confidence, self.model
        )
    }
}

/// A named entity span extracted from page text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub category: String,
}

/// One tracked URL plus its latest fetch/analysis state.
#[derive(Debug, Clone)]
pub struct Site {
    pub id: i32,
    pub url: String,
    pub content: Option<String>,
    pub analysis: Option<Analysis>,
    pub sentiment: Option<Sentiment>,
    pub keywords: Vec<String>,
    pub entities: Vec<Entity>,
    pub acknowledged: bool,
    pub last_updated: DateTime<Utc>,
}

/// Outcome of fetching a single URL.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(String),
    Failed(String),
}

impl FetchOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched(_))
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            FetchOutcome::Fetched(text) => Some(text),
            FetchOutcome::Failed(_) => None,
        }
    }
}
