//! Corpus store and document cleaning.
//!
//! The store owns every document for the lifetime of a build. It is
//! populated once by [`ingest`], queried by the judgment builder while the
//! raw markup is still present, and then turned into its final immutable
//! snapshot by [`CorpusStore::clean`], which strips markup, normalizes text,
//! derives query text, and drops documents that clean to (near) nothing.
//!
//! Cleaning never mutates in place: it produces a new snapshot plus the set
//! of removed ids, so the dependent removal cascade over judgments can be
//! applied as explicit set differences (see `RelevanceSet::cascade_removals`).

pub mod ingest;

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::config::{CollectionConfig, QuerySource};
use crate::types::{DocId, Document};

pub use ingest::{ingest_jsonl, IngestStats};

/// HTML/XML tags left over from the dump extractor.
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// In-memory corpus: documents in insertion order plus the title lookup
/// used during judgment construction.
#[derive(Debug, Default)]
pub struct CorpusStore {
    documents: Vec<Document>,
    title_to_id: HashMap<String, DocId>,
    /// Query text per document id, derived during cleaning. Absent for
    /// documents whose query text cleaned to empty.
    queries: BTreeMap<DocId, String>,
}

impl CorpusStore {
    /// Builds a store from pre-assembled documents. Ids must be dense and
    /// match each document's position.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        debug_assert!(documents
            .iter()
            .enumerate()
            .all(|(i, d)| d.id.as_u32() as usize == i));
        let title_to_id = documents
            .iter()
            .map(|d| (d.title.clone(), d.id))
            .collect();
        Self {
            documents,
            title_to_id,
            queries: BTreeMap::new(),
        }
    }

    /// All documents in insertion order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Looks up a document by id.
    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Resolves a title to its document id.
    pub fn resolve_title(&self, title: &str) -> Option<DocId> {
        self.title_to_id.get(title).copied()
    }

    /// The title -> id mapping, passed explicitly to the judgment builder.
    pub fn title_map(&self) -> &HashMap<String, DocId> {
        &self.title_to_id
    }

    /// Query text for a document id, if one was derived.
    pub fn query_text(&self, id: DocId) -> Option<&str> {
        self.queries.get(&id).map(String::as_str)
    }

    /// All (id, query text) pairs in id order.
    pub fn queries(&self) -> impl Iterator<Item = (DocId, &str)> {
        self.queries.iter().map(|(id, q)| (*id, q.as_str()))
    }

    /// Number of documents currently held.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Cleans every document and produces the final snapshot.
    ///
    /// Per document: strip tags, drop the leading title line, replace
    /// non-alphabetic characters with spaces, lowercase, collapse runs of
    /// whitespace, truncate to `max_doc_tokens`. Query text comes from the
    /// configured source and is truncated to `max_query_tokens`.
    ///
    /// Documents with fewer than `min_doc_tokens` cleaned tokens are removed
    /// from the snapshot. The returned vector lists the removed ids so the
    /// caller can cascade the removal through its relevance set.
    pub fn clean(self, config: &CollectionConfig) -> (CorpusStore, Vec<DocId>) {
        let mut kept = Vec::with_capacity(self.documents.len());
        let mut removed = Vec::new();
        let mut queries = BTreeMap::new();

        for doc in self.documents {
            let stripped = TAG_RE.replace_all(&doc.raw, "");
            let body = strip_title_line(&stripped);
            let first_sentence = first_sentence_of(body);

            let text = normalize(body, config.max_doc_tokens);
            if text.split(' ').filter(|t| !t.is_empty()).count() < config.min_doc_tokens {
                removed.push(doc.id);
                continue;
            }

            let query_raw = match config.query_source {
                QuerySource::Title => doc.title.as_str(),
                QuerySource::FirstSentence => first_sentence,
            };
            let query = normalize(query_raw, config.max_query_tokens);
            if !query.is_empty() {
                queries.insert(doc.id, query);
            }

            kept.push(Document {
                id: doc.id,
                title: doc.title,
                raw: String::new(),
                text,
            });
        }

        info!(
            kept = kept.len(),
            removed = removed.len(),
            "cleaned corpus"
        );

        let title_to_id = kept.iter().map(|d| (d.title.clone(), d.id)).collect();
        (
            CorpusStore {
                documents: kept,
                title_to_id,
                queries,
            },
            removed,
        )
    }
}

/// Drops everything up to and including the first newline. The dump
/// extractor repeats the article title as the first line of the text.
pub(crate) fn strip_title_line(text: &str) -> &str {
    match text.find('\n') {
        Some(pos) => &text[pos + 1..],
        None => text,
    }
}

/// The text up to the first sentence boundary.
pub(crate) fn first_sentence_of(text: &str) -> &str {
    match text.find('.') {
        Some(pos) => &text[..pos],
        None => text,
    }
}

/// Lowercases, replaces non-ASCII-alphabetic characters with spaces,
/// collapses whitespace, and keeps at most `max_tokens` tokens.
pub(crate) fn normalize(text: &str, max_tokens: usize) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_ascii_alphabetic() { c.to_ascii_lowercase() } else { ' ' })
        .collect();
    let tokens: Vec<&str> = replaced.split_whitespace().take(max_tokens).collect();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectionConfig;

    fn doc(id: u32, title: &str, raw: &str) -> Document {
        Document {
            id: DocId::from_u32(id),
            title: title.to_string(),
            raw: raw.to_string(),
            text: String::new(),
        }
    }

    fn permissive_config() -> CollectionConfig {
        CollectionConfig {
            min_doc_tokens: 1,
            ..CollectionConfig::default()
        }
    }

    #[test]
    fn test_normalize_strips_non_alpha() {
        assert_eq!(normalize("Hello, World! 42 times", 200), "hello world times");
    }

    #[test]
    fn test_normalize_truncates() {
        assert_eq!(normalize("a b c d e", 3), "a b c");
    }

    #[test]
    fn test_strip_title_line() {
        assert_eq!(strip_title_line("Title\nbody text"), "body text");
        assert_eq!(strip_title_line("no newline"), "no newline");
    }

    #[test]
    fn test_first_sentence() {
        assert_eq!(first_sentence_of("First sentence. Second."), "First sentence");
        assert_eq!(first_sentence_of("no period"), "no period");
    }

    #[test]
    fn test_clean_strips_tags_and_title() {
        let store = CorpusStore::from_documents(vec![doc(
            0,
            "Anarchism",
            "Anarchism\nAnarchism is a <a href=\"Political%20philosophy\">political philosophy</a>. It has a long history.",
        )]);
        let (cleaned, removed) = store.clean(&permissive_config());

        assert!(removed.is_empty());
        let text = &cleaned.documents()[0].text;
        assert!(!text.contains('<'));
        assert!(!text.contains("anarchism\n"));
        assert!(text.starts_with("anarchism is a political philosophy"));
    }

    #[test]
    fn test_clean_drops_short_documents() {
        let config = CollectionConfig {
            min_doc_tokens: 5,
            ..CollectionConfig::default()
        };
        let store = CorpusStore::from_documents(vec![
            doc(0, "Long", "Long\none two three four five six seven."),
            doc(1, "Short", "Short\ntiny."),
        ]);
        let (cleaned, removed) = store.clean(&config);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(removed, vec![DocId::from_u32(1)]);
        assert!(cleaned.resolve_title("Short").is_none());
    }

    #[test]
    fn test_title_queries() {
        let store = CorpusStore::from_documents(vec![doc(
            0,
            "Political Philosophy",
            "Political Philosophy\nSome body text that is long enough here.",
        )]);
        let (cleaned, _) = store.clean(&permissive_config());

        assert_eq!(
            cleaned.query_text(DocId::from_u32(0)),
            Some("political philosophy")
        );
    }

    #[test]
    fn test_first_sentence_queries() {
        let config = CollectionConfig {
            query_source: QuerySource::FirstSentence,
            min_doc_tokens: 1,
            ..CollectionConfig::default()
        };
        let store = CorpusStore::from_documents(vec![doc(
            0,
            "A",
            "A\nThe opening sentence here. And the rest of the body follows.",
        )]);
        let (cleaned, _) = store.clean(&config);

        assert_eq!(
            cleaned.query_text(DocId::from_u32(0)),
            Some("the opening sentence here")
        );
    }
}
