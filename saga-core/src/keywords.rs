//! Keyword extraction for trigger and leverage matching.
//!
//! Free text from the narrator or player is normalized into a set of
//! matchable tokens: lowercased, split on non-alphanumeric characters,
//! with stopwords and very short tokens discarded. Extraction is pure and
//! deterministic; it runs once at entity creation (to cache trigger and
//! leverage keyword sets) and again on each player utterance at query time.

use std::collections::HashSet;

/// Tokens shorter than this never contribute to a match.
pub const MIN_TOKEN_LEN: usize = 3;

/// How many keywords are cached per entity at creation time.
///
/// Keeps matching cheap and precision reasonable for long trigger text.
pub const MAX_CACHED_KEYWORDS: usize = 10;

/// Minimum overlapping keywords for a match to be reported at all.
///
/// A single common-word overlap is too weak a signal; both the dormant
/// thread registry and the leverage engine share this floor.
pub const MIN_KEYWORD_OVERLAP: usize = 2;

lazy_static::lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = [
        "the", "and", "for", "are", "but", "not", "you", "all", "can",
        "had", "her", "was", "one", "our", "out", "has", "have", "him",
        "his", "how", "its", "may", "now", "own", "say", "she", "too",
        "use", "way", "who", "will", "with", "this", "that", "they",
        "them", "then", "than", "from", "into", "your", "what", "when",
        "where", "which", "while", "would", "could", "should", "there",
        "their", "about", "after", "before", "because", "been", "being",
        "does", "doing", "each", "just", "like", "more", "most", "only",
        "other", "over", "some", "such", "very", "were", "also", "any",
        "between", "both", "during", "under", "upon", "against", "through",
    ]
    .into_iter()
    .collect();
}

/// Extract the matchable token set from free text.
///
/// Order-independent: duplicates and ordering collapse into the set.
pub fn extract(text: &str) -> HashSet<String> {
    tokens(text).collect()
}

/// Extract up to `cap` distinct keywords in order of first appearance.
///
/// Used to cache an entity's keyword set once at creation.
pub fn extract_capped(text: &str, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for token in tokens(text) {
        if out.len() >= cap {
            break;
        }
        if seen.insert(token.clone()) {
            out.push(token);
        }
    }
    out
}

/// Intersect a cached keyword list with an extracted token set.
///
/// Returns the matched keywords in cache order.
pub fn overlap(cached: &[String], extracted: &HashSet<String>) -> Vec<String> {
    cached
        .iter()
        .filter(|k| extracted.contains(k.as_str()))
        .cloned()
        .collect()
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|t| t.to_lowercase())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .filter(|t| !STOPWORDS.contains(t.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_strips_stopwords_and_short_tokens() {
        let tokens = extract("The convoy reaches the checkpoint at dawn");
        assert!(tokens.contains("convoy"));
        assert!(tokens.contains("reaches"));
        assert!(tokens.contains("checkpoint"));
        assert!(tokens.contains("dawn"));
        assert!(!tokens.contains("the"));
        assert!(!tokens.contains("at"));
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        let tokens = extract("CONVOY Convoy convoy");
        assert_eq!(tokens.len(), 1);
        assert!(tokens.contains("convoy"));
    }

    #[test]
    fn test_extract_splits_on_punctuation() {
        let tokens = extract("smuggler's cache, hidden under the docks!");
        assert!(tokens.contains("smuggler"));
        assert!(tokens.contains("cache"));
        assert!(tokens.contains("hidden"));
        assert!(tokens.contains("docks"));
    }

    #[test]
    fn test_extract_capped_preserves_order_and_dedupes() {
        let keywords = extract_capped("convoy convoy checkpoint convoy bridge", 10);
        assert_eq!(keywords, vec!["convoy", "checkpoint", "bridge"]);
    }

    #[test]
    fn test_extract_capped_respects_cap() {
        let keywords = extract_capped(
            "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima",
            MAX_CACHED_KEYWORDS,
        );
        assert_eq!(keywords.len(), MAX_CACHED_KEYWORDS);
        assert_eq!(keywords[0], "alpha");
    }

    #[test]
    fn test_overlap_returns_matches_in_cache_order() {
        let cached: Vec<String> = ["convoy", "checkpoint", "bridge"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let extracted = extract("the bridge convoy was late");
        assert_eq!(overlap(&cached, &extracted), vec!["convoy", "bridge"]);
    }

    #[test]
    fn test_extract_empty_text() {
        assert!(extract("").is_empty());
        assert!(extract("a an to of").is_empty());
    }
}
