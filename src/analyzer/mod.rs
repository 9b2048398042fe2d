//! Page text analysis: sentiment classification, keyword extraction,
//! and named entity recognition.

mod inference;
mod keywords;

pub use inference::{InferenceClient, InferenceConfig};
pub use keywords::{extract_keywords, MAX_KEYWORDS};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Analysis, Entity};

/// Maximum characters of page text submitted to the classifier and the
/// entity extractor.
///
/// Longer pages are truncated, not rejected. This silently drops
/// information past the prefix for long pages; it is a deliberate
/// precision/cost tradeoff of the underlying model, kept as an explicit
/// policy constant.
pub const MODEL_INPUT_LIMIT: usize = 512;

/// Truncate text to the model input limit on a character boundary.
pub fn truncate_for_model(text: &str) -> &str {
    match text.char_indices().nth(MODEL_INPUT_LIMIT) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Content analysis boundary.
///
/// Classification and entity extraction go to the inference API; keyword
/// extraction is local and therefore a provided method. The monitoring
/// loop only sees this trait, so tests inject deterministic analyzers.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Classify the (truncated) text, returning the top label.
    async fn classify(&self, text: &str) -> Result<Analysis>;

    /// Extract grouped named-entity spans from the (truncated) text.
    async fn extract_entities(&self, text: &str) -> Result<Vec<Entity>>;

    /// Extract the top keywords from the full text.
    fn extract_keywords(&self, text: &str) -> Vec<String> {
        keywords::extract_keywords(text)
    }
}
