//! Text analysis: tokenization and keyword extraction for student queries.

use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

/// Maximum number of keywords reported per query.
pub const MAX_KEYWORDS: usize = 5;

/// Tokens that carry no topical content in tutoring queries. Covers common
/// English function words plus the filler phrases students append
/// ("keep it simple", "in depth detail").
const STOPWORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "can", "clarify", "define", "depth", "detail", "do", "does",
    "explain", "example", "for", "give", "help", "how", "in", "is", "it", "keep", "me", "my", "of",
    "on", "please", "show", "simple", "tell", "the", "to", "what", "why", "with",
];

/// Split text into lowercase word tokens on Unicode word boundaries.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

/// Extract up to [`MAX_KEYWORDS`] content-bearing keywords from a query.
///
/// Tokens are lowercased, deduplicated in first-appearance order, and
/// filtered against the stopword list; tokens of two characters or fewer
/// are dropped. The result is deterministic for a given query.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for token in tokenize(text) {
        if token.chars().count() <= 2 || STOPWORDS.contains(&token.as_str()) {
            continue;
        }
        if seen.insert(token.clone()) {
            keywords.push(token);
        }
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }

    keywords
}
