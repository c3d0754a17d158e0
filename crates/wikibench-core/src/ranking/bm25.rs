//! BM25 term-frequency ranking index.
//!
//! The index is a pure function of the final corpus snapshot: per-term
//! postings with raw term frequencies, per-document lengths, and the
//! corpus-average document length. It is rebuilt from scratch whenever the
//! document set changes and never mutated incrementally.
//!
//! Scoring uses the standard formulation
//!
//! ```text
//! idf(t)     = ln(1 + (N - df + 0.5) / (df + 0.5))
//! score(q,d) = Σ_t idf(t) · f(t,d)·(k1+1) / (f(t,d) + k1·(1 - b + b·|d|/avgdl))
//! ```
//!
//! with defaults k1 = 1.5, b = 0.75. Only documents containing at least one
//! query term are scored, so a query that analyzes to nothing produces an
//! empty result list. Ties are broken by ascending document id, i.e. corpus
//! insertion order, which keeps ranked output deterministic.

use std::collections::HashMap;

use tracing::info;

use crate::config::{DEFAULT_BM25_B, DEFAULT_BM25_K1};
use crate::corpus::CorpusStore;
use crate::error::ConfigError;
use crate::types::{DocId, RankedList};

use super::{Analyzer, Ranker};

/// BM25 free parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation. Must be non-negative.
    pub k1: f32,
    /// Length normalization in [0, 1].
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: DEFAULT_BM25_K1,
            b: DEFAULT_BM25_B,
        }
    }
}

impl Bm25Params {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(ConfigError::InvalidBm25Param {
                name: "k1",
                value: self.k1,
            });
        }
        if !self.b.is_finite() || !(0.0..=1.0).contains(&self.b) {
            return Err(ConfigError::InvalidBm25Param {
                name: "b",
                value: self.b,
            });
        }
        Ok(())
    }
}

/// Inverted index with BM25 scoring over a corpus snapshot.
#[derive(Debug)]
pub struct Bm25Index {
    /// term -> (doc, term frequency), docs in insertion order.
    postings: HashMap<String, Vec<(DocId, u32)>>,
    /// doc -> analyzed token count.
    doc_len: HashMap<DocId, u32>,
    avg_doc_len: f32,
    doc_count: usize,
    params: Bm25Params,
    analyzer: Analyzer,
}

impl Bm25Index {
    /// Builds the index over every document in the store.
    ///
    /// The analyzer is stored and reapplied to queries at ranking time so
    /// document and query tokenization cannot drift apart.
    pub fn build(
        store: &CorpusStore,
        analyzer: Analyzer,
        params: Bm25Params,
    ) -> Result<Self, ConfigError> {
        params.validate()?;

        let mut postings: HashMap<String, Vec<(DocId, u32)>> = HashMap::new();
        let mut doc_len = HashMap::with_capacity(store.len());
        let mut total_len: u64 = 0;

        for doc in store.documents() {
            let terms = analyzer.analyze(&doc.text);
            total_len += terms.len() as u64;
            doc_len.insert(doc.id, terms.len() as u32);

            let mut tf: HashMap<String, u32> = HashMap::new();
            for term in terms {
                *tf.entry(term).or_insert(0) += 1;
            }
            for (term, count) in tf {
                postings.entry(term).or_default().push((doc.id, count));
            }
        }

        let doc_count = store.len();
        let avg_doc_len = if doc_count == 0 {
            0.0
        } else {
            total_len as f32 / doc_count as f32
        };

        info!(
            documents = doc_count,
            terms = postings.len(),
            avg_doc_len,
            "built ranking index"
        );

        Ok(Self {
            postings,
            doc_len,
            avg_doc_len,
            doc_count,
            params,
            analyzer,
        })
    }

    /// Inverse document frequency for a document frequency.
    fn idf(&self, df: usize) -> f32 {
        let n = self.doc_count as f32;
        let df = df as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Number of distinct index terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Number of indexed documents.
    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    /// Average analyzed document length.
    pub fn avg_doc_len(&self) -> f32 {
        self.avg_doc_len
    }

    /// Document frequency of a raw term (after analysis).
    pub fn doc_freq(&self, term: &str) -> usize {
        let analyzed = self.analyzer.analyze(term);
        analyzed
            .first()
            .and_then(|t| self.postings.get(t))
            .map_or(0, Vec::len)
    }
}

impl Ranker for Bm25Index {
    fn rank(&self, query: &str, k: usize) -> RankedList {
        let terms = self.analyzer.analyze(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let Bm25Params { k1, b } = self.params;
        let mut scores: HashMap<DocId, f32> = HashMap::new();

        for term in &terms {
            let Some(posting) = self.postings.get(term) else {
                continue;
            };
            let idf = self.idf(posting.len());
            for &(doc_id, tf) in posting {
                let tf = tf as f32;
                let len = self.doc_len[&doc_id] as f32;
                let norm = k1 * (1.0 - b + b * len / self.avg_doc_len);
                *scores.entry(doc_id).or_insert(0.0) += idf * tf * (k1 + 1.0) / (tf + norm);
            }
        }

        let mut ranked: Vec<(DocId, f32)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(k);
        ranked
    }
}
