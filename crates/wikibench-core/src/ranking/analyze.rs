//! Query and document analysis.
//!
//! One [`Analyzer`] value is built per index and applied to both document
//! text and query text, so term matching stays consistent: a stemmed index
//! queried with unstemmed terms (or vice versa) would silently match
//! nothing.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use porter_stemmer::stem;

use crate::config::CollectionConfig;

/// Standard English stop words.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "d", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "ll", "m", "ma", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "o", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "re", "s", "same", "she", "should", "so", "some", "such", "t", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "ve", "very", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "y", "you", "your",
    "yours", "yourself", "yourselves",
];

static STOP_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Whitespace tokenization with optional stop-word removal and Porter
/// stemming. Input is expected to be already lowercased (corpus cleaning
/// guarantees this); query text is lowercased here so raw queries behave
/// identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analyzer {
    remove_stopwords: bool,
    stem: bool,
}

impl Analyzer {
    /// Creates an analyzer with explicit settings.
    pub fn new(remove_stopwords: bool, stem: bool) -> Self {
        Self {
            remove_stopwords,
            stem,
        }
    }

    /// Analyzer settings from a collection config.
    pub fn from_config(config: &CollectionConfig) -> Self {
        Self::new(config.remove_stopwords, config.stem)
    }

    /// Tokenizes `text` into index/query terms.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(str::to_lowercase)
            .filter(|token| !self.remove_stopwords || !STOP_SET.contains(token.as_str()))
            .map(|token| if self.stem { stem(&token) } else { token })
            .collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(true, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokenization() {
        let analyzer = Analyzer::new(false, false);
        assert_eq!(
            analyzer.analyze("quick brown fox"),
            vec!["quick", "brown", "fox"]
        );
    }

    #[test]
    fn test_stopword_removal() {
        let analyzer = Analyzer::new(true, false);
        assert_eq!(
            analyzer.analyze("the fox and the hound"),
            vec!["fox", "hound"]
        );
    }

    #[test]
    fn test_stemming_normalizes_affixes() {
        let analyzer = Analyzer::new(false, true);
        let terms = analyzer.analyze("running runs");
        assert_eq!(terms[0], terms[1]);
    }

    #[test]
    fn test_query_lowercased_like_documents() {
        let analyzer = Analyzer::new(false, false);
        assert_eq!(analyzer.analyze("Quick FOX"), analyzer.analyze("quick fox"));
    }

    #[test]
    fn test_empty_text_yields_no_terms() {
        let analyzer = Analyzer::default();
        assert!(analyzer.analyze("").is_empty());
        assert!(analyzer.analyze("   ").is_empty());
    }

    #[test]
    fn test_all_stopwords_yields_no_terms() {
        let analyzer = Analyzer::new(true, false);
        assert!(analyzer.analyze("the of and").is_empty());
    }
}
