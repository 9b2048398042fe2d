//! Term-frequency keyword extraction with a fixed stop-word list.

use std::collections::HashMap;

/// Maximum number of keywords returned per document.
pub const MAX_KEYWORDS: usize = 10;

/// Common English stop words excluded from keyword extraction.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him",
    "his", "how", "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most",
    "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other",
    "our", "ours", "out", "over", "own", "same", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "theirs", "them", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
    "yours",
];

fn is_stop_word(term: &str) -> bool {
    STOP_WORDS.binary_search(&term).is_ok()
}

/// Extract the top terms from a single document by term frequency.
///
/// Terms are lower-cased, at least two characters long, and never stop
/// words. Ties break alphabetically so output is deterministic.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut frequencies: HashMap<String, usize> = HashMap::new();

    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
    {
        let term = token.to_lowercase();
        if is_stop_word(&term) {
            continue;
        }
        *frequencies.entry(term).or_default() += 1;
    }

    let mut terms: Vec<(String, usize)> = frequencies.into_iter().collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    terms.truncate(MAX_KEYWORDS);
    terms.into_iter().map(|(term, _)| term).collect()
}
