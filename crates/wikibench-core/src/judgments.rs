//! Hyperlink-derived relevance judgments.
//!
//! Judgment construction inverts the link graph: a document becomes a judged
//! query when at least `min_rel_docs` other documents link to it with a
//! resolvable title, and each inbound link contributes one level-1 judgment
//! pointing at the linking document. Every surviving query additionally
//! carries a level-2 self-judgment as its first entry, since a query is a
//! view over its own source document.
//!
//! Relevance levels:
//! - 2: the query's own source document
//! - 1: a document linking to the query's source
//! - 0: an explicitly sampled non-relevant document (only materialized by
//!   [`RelevanceSet::sample_negatives`])

use std::collections::{BTreeMap, BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::config::{CollectionConfig, LinkScope};
use crate::corpus::{first_sentence_of, strip_title_line, CorpusStore};
use crate::rng::LcgRng;
use crate::types::{DocId, QueryId};

/// Hyperlink targets as emitted by the dump extractor.
static HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:href=")([^"]+)"#).expect("valid href regex"));

/// A single relevance judgment: one document graded for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Judgment {
    /// The document being judged.
    pub doc_id: DocId,
    /// Relevance level (0 = sampled non-relevant, 1 = linking, 2 = self).
    pub level: u8,
}

impl Judgment {
    /// Level-2 judgment for a query's own source document.
    pub fn source(doc_id: DocId) -> Self {
        Self { doc_id, level: 2 }
    }

    /// Level-1 judgment for a document linking to the query's source.
    pub fn linked(doc_id: DocId) -> Self {
        Self { doc_id, level: 1 }
    }

    /// Level-0 judgment for a sampled non-relevant document.
    pub fn sampled(doc_id: DocId) -> Self {
        Self { doc_id, level: 0 }
    }

    /// Returns true if the document counts as relevant (level >= 1).
    pub fn is_relevant(&self) -> bool {
        self.level > 0
    }
}

/// Mapping from query id to its ordered judgment list.
///
/// Each query holds at most one judgment per document id, with the level-2
/// self-judgment first. Iteration order is ascending query id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelevanceSet {
    map: BTreeMap<QueryId, Vec<Judgment>>,
}

impl RelevanceSet {
    /// Derives judgments from the corpus hyperlink structure.
    ///
    /// The scan region per linking document is chosen by
    /// `config.link_scope`; targets are percent-decoded and resolved against
    /// the store's title map. Unresolved targets, self-links, and
    /// undecodable escapes are non-matches, never errors.
    pub fn build(store: &CorpusStore, config: &CollectionConfig) -> Self {
        let title_map = store.title_map();
        let mut inbound: BTreeMap<QueryId, BTreeSet<DocId>> = BTreeMap::new();

        for doc in store.documents() {
            let region = match config.link_scope {
                LinkScope::FullDocument => doc.raw.as_str(),
                LinkScope::FirstSentence => first_sentence_of(strip_title_line(&doc.raw)),
            };

            let mut targets = HashSet::new();
            for cap in HREF_RE.captures_iter(region) {
                if let Some(decoded) = percent_decode(&cap[1]) {
                    targets.insert(decoded);
                }
            }

            for target in targets {
                if let Some(&target_id) = title_map.get(&target) {
                    if target_id != doc.id {
                        inbound.entry(target_id).or_default().insert(doc.id);
                    }
                }
            }
        }

        let mut map = BTreeMap::new();
        for (query_id, sources) in inbound {
            if sources.len() < config.min_rel_docs {
                continue;
            }
            let mut judgments = Vec::with_capacity(sources.len() + 1);
            judgments.push(Judgment::source(query_id));
            judgments.extend(sources.into_iter().map(Judgment::linked));
            map.insert(query_id, judgments);
        }

        info!(queries = map.len(), "built relevance judgments");
        Self { map }
    }

    /// Builds a relevance set from (query, document, level) triples, e.g.
    /// parsed from a qrel file. Triples for the same (query, document) pair
    /// keep the last level seen; entry order within a query is preserved.
    pub fn from_triples(triples: impl IntoIterator<Item = (QueryId, DocId, u8)>) -> Self {
        let mut map: BTreeMap<QueryId, Vec<Judgment>> = BTreeMap::new();
        for (query_id, doc_id, level) in triples {
            let judgments = map.entry(query_id).or_default();
            match judgments.iter_mut().find(|j| j.doc_id == doc_id) {
                Some(existing) => existing.level = level,
                None => judgments.push(Judgment { doc_id, level }),
            }
        }
        Self { map }
    }

    /// Applies a document-removal cascade, producing a new consistent set.
    ///
    /// Three explicit passes over the current snapshot: queries whose source
    /// document was removed are dropped; judgments referencing removed
    /// documents are dropped; queries left with fewer than `min_rel_docs`
    /// level-1 judgments are dropped entirely.
    pub fn cascade_removals(
        &self,
        removed_docs: &HashSet<DocId>,
        min_rel_docs: usize,
    ) -> RelevanceSet {
        let surviving_queries: BTreeSet<QueryId> = self
            .map
            .keys()
            .filter(|q| !removed_docs.contains(q))
            .copied()
            .collect();

        let mut map = BTreeMap::new();
        for query_id in surviving_queries {
            let judgments: Vec<Judgment> = self.map[&query_id]
                .iter()
                .filter(|j| !removed_docs.contains(&j.doc_id))
                .copied()
                .collect();

            let linked = judgments.iter().filter(|j| j.level == 1).count();
            if linked >= min_rel_docs {
                map.insert(query_id, judgments);
            }
        }

        RelevanceSet { map }
    }

    /// Keeps only queries matching the predicate. Used to drop queries whose
    /// text cleaned to empty.
    pub fn retain_queries(mut self, mut keep: impl FnMut(QueryId) -> bool) -> RelevanceSet {
        self.map.retain(|q, _| keep(*q));
        self
    }

    /// Appends `per_query` level-0 judgments to every query, drawn uniformly
    /// from `candidates` minus the documents already judged for that query.
    /// Deterministic for a fixed generator state.
    pub fn sample_negatives(
        &mut self,
        candidates: &[DocId],
        per_query: usize,
        rng: &mut LcgRng,
    ) {
        for (query_id, judgments) in self.map.iter_mut() {
            let judged: HashSet<DocId> = judgments.iter().map(|j| j.doc_id).collect();
            let mut pool: Vec<DocId> = candidates
                .iter()
                .filter(|id| **id != *query_id && !judged.contains(id))
                .copied()
                .collect();

            let take = per_query.min(pool.len());
            for i in 0..take {
                let j = i + rng.next_usize(pool.len() - i);
                pool.swap(i, j);
            }
            judgments.extend(pool[..take].iter().copied().map(Judgment::sampled));
        }
    }

    /// Judgments for one query, self-judgment first.
    pub fn judgments(&self, query_id: QueryId) -> Option<&[Judgment]> {
        self.map.get(&query_id).map(Vec::as_slice)
    }

    /// All judged query ids in ascending order.
    pub fn query_ids(&self) -> Vec<QueryId> {
        self.map.keys().copied().collect()
    }

    /// Iterates (query id, judgments) in ascending query order.
    pub fn iter(&self) -> impl Iterator<Item = (QueryId, &[Judgment])> {
        self.map.iter().map(|(q, j)| (*q, j.as_slice()))
    }

    /// Number of judged queries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no queries are judged.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total number of judgment entries across all queries.
    pub fn judgment_count(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }
}

/// Decodes %XX escapes. Returns None for truncated or non-hex escapes and
/// for byte sequences that do not form valid UTF-8; callers treat both as
/// non-matching link targets.
fn percent_decode(input: &str) -> Option<String> {
    if !input.contains('%') {
        return Some(input.to_string());
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = char::from(*bytes.get(i + 1)?).to_digit(16)?;
            let lo = char::from(*bytes.get(i + 2)?).to_digit(16)?;
            out.push((hi * 16 + lo) as u8);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Document;

    fn doc(id: u32, title: &str, raw: &str) -> Document {
        Document {
            id: DocId::from_u32(id),
            title: title.to_string(),
            raw: raw.to_string(),
            text: String::new(),
        }
    }

    fn id(n: u32) -> DocId {
        DocId::from_u32(n)
    }

    fn config(min_rel_docs: usize) -> CollectionConfig {
        CollectionConfig {
            min_rel_docs,
            ..CollectionConfig::default()
        }
    }

    fn linked_corpus() -> CorpusStore {
        // A links to B; C links to A; B links to nothing.
        CorpusStore::from_documents(vec![
            doc(0, "A", "A\nSee <a href=\"B\">B</a>. More text."),
            doc(1, "B", "B\nNo links here."),
            doc(2, "C", "C\nAbout <a href=\"A\">A</a>. Tail."),
        ])
    }

    #[test]
    fn test_inbound_direction() {
        let rels = RelevanceSet::build(&linked_corpus(), &config(1));

        // A is linked from C, B is linked from A; C has no inbound links.
        assert_eq!(rels.query_ids(), vec![id(0), id(1)]);
        assert_eq!(
            rels.judgments(id(0)).unwrap(),
            &[Judgment::source(id(0)), Judgment::linked(id(2))]
        );
        assert_eq!(
            rels.judgments(id(1)).unwrap(),
            &[Judgment::source(id(1)), Judgment::linked(id(0))]
        );
        assert!(rels.judgments(id(2)).is_none());
    }

    #[test]
    fn test_self_judgment_is_first() {
        let rels = RelevanceSet::build(&linked_corpus(), &config(1));
        for (query_id, judgments) in rels.iter() {
            assert_eq!(judgments[0], Judgment::source(query_id));
            assert_eq!(judgments.iter().filter(|j| j.level == 2).count(), 1);
        }
    }

    #[test]
    fn test_min_rel_docs_threshold() {
        // Both A and B have exactly one inbound link.
        let rels = RelevanceSet::build(&linked_corpus(), &config(2));
        assert!(rels.is_empty());
    }

    #[test]
    fn test_self_links_dropped() {
        let store = CorpusStore::from_documents(vec![doc(
            0,
            "A",
            "A\nRecursive <a href=\"A\">self reference</a>.",
        )]);
        let rels = RelevanceSet::build(&store, &config(1));
        assert!(rels.is_empty());
    }

    #[test]
    fn test_unresolved_links_are_non_matches() {
        let store = CorpusStore::from_documents(vec![
            doc(0, "A", "A\n<a href=\"Missing%20Page\">gone</a> and <a href=\"%GG\">bad escape</a>."),
            doc(1, "B", "B\ntext."),
        ]);
        let rels = RelevanceSet::build(&store, &config(1));
        assert!(rels.is_empty());
    }

    #[test]
    fn test_percent_decoded_resolution() {
        let store = CorpusStore::from_documents(vec![
            doc(0, "Political philosophy", "Political philosophy\nbody."),
            doc(1, "B", "B\n<a href=\"Political%20philosophy\">link</a>."),
        ]);
        let rels = RelevanceSet::build(&store, &config(1));

        assert_eq!(rels.query_ids(), vec![id(0)]);
        assert_eq!(
            rels.judgments(id(0)).unwrap(),
            &[Judgment::source(id(0)), Judgment::linked(id(1))]
        );
    }

    #[test]
    fn test_duplicate_links_collapse() {
        let store = CorpusStore::from_documents(vec![
            doc(0, "A", "A\n<a href=\"B\">one</a> <a href=\"B\">two</a>."),
            doc(1, "B", "B\ntext."),
        ]);
        let rels = RelevanceSet::build(&store, &config(1));
        assert_eq!(rels.judgments(id(1)).unwrap().len(), 2);
    }

    #[test]
    fn test_first_sentence_scope() {
        let cfg = CollectionConfig {
            min_rel_docs: 1,
            link_scope: LinkScope::FirstSentence,
            ..CollectionConfig::default()
        };
        let store = CorpusStore::from_documents(vec![
            doc(0, "A", "A\nEarly <a href=\"B\">link</a>. Late <a href=\"C\">link</a>."),
            doc(1, "B", "B\ntext."),
            doc(2, "C", "C\ntext."),
        ]);
        let rels = RelevanceSet::build(&store, &cfg);

        // Only the link before the first sentence boundary counts.
        assert_eq!(rels.query_ids(), vec![id(1)]);
    }

    #[test]
    fn test_cascade_removes_dependent_judgments() {
        let rels = RelevanceSet::build(&linked_corpus(), &config(1));

        // Removing C removes A's only level-1 judgment, which removes query A.
        let removed: HashSet<DocId> = [id(2)].into_iter().collect();
        let cascaded = rels.cascade_removals(&removed, 1);

        assert_eq!(cascaded.query_ids(), vec![id(1)]);
    }

    #[test]
    fn test_cascade_removes_query_of_removed_doc() {
        let rels = RelevanceSet::build(&linked_corpus(), &config(1));

        let removed: HashSet<DocId> = [id(1)].into_iter().collect();
        let cascaded = rels.cascade_removals(&removed, 1);

        assert_eq!(cascaded.query_ids(), vec![id(0)]);
    }

    #[test]
    fn test_sample_negatives_avoids_judged() {
        let mut rels = RelevanceSet::build(&linked_corpus(), &config(1));
        let candidates: Vec<DocId> = (0..3).map(id).collect();
        let mut rng = LcgRng::new(42);
        rels.sample_negatives(&candidates, 5, &mut rng);

        for (query_id, judgments) in rels.iter() {
            let mut seen = HashSet::new();
            for j in judgments {
                assert!(seen.insert(j.doc_id), "duplicate judgment for {query_id}");
                if j.level == 0 {
                    assert_ne!(j.doc_id, query_id);
                }
            }
        }
    }

    #[test]
    fn test_sample_negatives_reproducible() {
        let candidates: Vec<DocId> = (0..3).map(id).collect();

        let mut a = RelevanceSet::build(&linked_corpus(), &config(1));
        let mut b = a.clone();
        a.sample_negatives(&candidates, 1, &mut LcgRng::new(7));
        b.sample_negatives(&candidates, 1, &mut LcgRng::new(7));

        assert_eq!(a, b);
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("plain"), Some("plain".to_string()));
        assert_eq!(percent_decode("a%20b"), Some("a b".to_string()));
        assert_eq!(percent_decode("%41"), Some("A".to_string()));
        assert_eq!(percent_decode("bad%2"), None);
        assert_eq!(percent_decode("bad%GG"), None);
        assert_eq!(percent_decode("%ff%fe"), None); // not UTF-8
    }

    #[test]
    fn test_from_triples_round_trip_shape() {
        let rels = RelevanceSet::from_triples(vec![
            (id(3), id(3), 2),
            (id(3), id(7), 1),
            (id(5), id(5), 2),
        ]);
        assert_eq!(rels.len(), 2);
        assert_eq!(rels.judgments(id(3)).unwrap().len(), 2);
    }
}
