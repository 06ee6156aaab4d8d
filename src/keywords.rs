use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"));

pub const STOPWORDS: &[&str] = &[
    "the", "is", "in", "at", "of", "a", "an", "and", "or", "to", "for", "with", "on", "by", "as",
    "from", "using", "how", "do", "i", "you", "it", "this", "that", "what", "when", "where",
    "which", "be", "are", "was", "were", "can", "should", "could", "would", "will", "may",
    "might",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());

pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}

/// Extract search keywords from a prompt.
///
/// Words are lowercased, stopwords and tokens of two characters or fewer are dropped,
/// and the remaining words are deduplicated keeping their first position.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for word in WORD.find_iter(&lowered).map(|m| m.as_str()) {
        if word.chars().count() <= 2 || is_stopword(word) {
            continue;
        }
        if seen.insert(word) {
            keywords.push(word.to_string());
        }
    }

    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords() {
        let keywords = extract_keywords("How do I implement a REST API in Python using Flask?");
        assert_eq!(keywords, vec!["implement", "rest", "api", "python", "flask"]);
        assert!(!keywords.contains(&"how".to_string()));
    }

    #[test]
    fn test_keywords_are_deduplicated_in_first_occurrence_order() {
        let keywords = extract_keywords("Rust async, rust TRAITS and Async runtimes");
        assert_eq!(keywords, vec!["rust", "async", "traits", "runtimes"]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let prompt = "Compare tokio and async-std for building a web crawler";
        assert_eq!(extract_keywords(prompt), extract_keywords(prompt));
    }

    #[test]
    fn test_no_stopwords_or_short_tokens() {
        let prompts = [
            "What is the best way to do it?",
            "an ox at my db is ok",
            "Which database should I use for time series data",
            "",
        ];
        for prompt in prompts {
            for keyword in extract_keywords(prompt) {
                assert!(!is_stopword(&keyword), "stopword leaked: {}", keyword);
                assert!(keyword.chars().count() > 2, "short token leaked: {}", keyword);
            }
        }
    }

    #[test]
    fn test_all_stopwords_yields_nothing() {
        assert!(extract_keywords("How do you do this, and what can it be?").is_empty());
        assert!(extract_keywords("   ").is_empty());
    }

    #[test]
    fn test_unicode_length_counts_characters() {
        // "día" is three characters but four bytes
        assert_eq!(extract_keywords("día xy"), vec!["día"]);
    }
}
