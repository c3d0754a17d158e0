//! Collection-building configuration.
//!
//! This module contains the knobs that control benchmark construction and
//! their production defaults. The defaults reproduce the reference
//! collection: 200-token documents, inbound-link threshold of 5, seed 27355.

use serde::{Deserialize, Serialize};

// =============================================================================
// Defaults
// =============================================================================

/// Default seed for the partition shuffle and negative sampling.
pub const DEFAULT_SEED: u64 = 27355;

/// Maximum tokens kept per cleaned document.
pub const DEFAULT_MAX_DOC_TOKENS: usize = 200;

/// Maximum tokens kept per query.
pub const DEFAULT_MAX_QUERY_TOKENS: usize = 200;

/// Documents with fewer cleaned tokens than this are dropped.
pub const DEFAULT_MIN_DOC_TOKENS: usize = 10;

/// Minimum number of inbound-link judgments for a query to survive.
pub const DEFAULT_MIN_REL_DOCS: usize = 5;

/// Default BM25 k1 (term-frequency saturation).
pub const DEFAULT_BM25_K1: f32 = 1.5;

/// Default BM25 b (length normalization).
pub const DEFAULT_BM25_B: f32 = 0.75;

// =============================================================================
// Policies
// =============================================================================

/// Which region of a document is scanned for hyperlink targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkScope {
    /// The entire (truncated) document.
    FullDocument,
    /// Only the text preceding the first sentence boundary.
    FirstSentence,
}

/// Where a query's text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuerySource {
    /// The document title.
    Title,
    /// The first sentence of the document body.
    FirstSentence,
}

// =============================================================================
// CollectionConfig
// =============================================================================

/// Everything that shapes a benchmark collection build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Stop ingesting after this many documents (None = whole dump).
    pub max_docs: Option<usize>,
    /// Truncate cleaned documents to this many tokens.
    pub max_doc_tokens: usize,
    /// Truncate queries to this many tokens.
    pub max_query_tokens: usize,
    /// Drop documents with fewer cleaned tokens than this.
    pub min_doc_tokens: usize,
    /// Drop candidate queries with fewer inbound-link judgments than this.
    pub min_rel_docs: usize,
    /// Region scanned for links.
    pub link_scope: LinkScope,
    /// Source of query text.
    pub query_source: QuerySource,
    /// Remove stop words during indexing.
    pub remove_stopwords: bool,
    /// Apply Porter stemming during indexing.
    pub stem: bool,
    /// Seed for the partition shuffle and negative sampling.
    pub seed: u64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            max_docs: None,
            max_doc_tokens: DEFAULT_MAX_DOC_TOKENS,
            max_query_tokens: DEFAULT_MAX_QUERY_TOKENS,
            min_doc_tokens: DEFAULT_MIN_DOC_TOKENS,
            min_rel_docs: DEFAULT_MIN_REL_DOCS,
            link_scope: LinkScope::FullDocument,
            query_source: QuerySource::Title,
            remove_stopwords: true,
            stem: true,
            seed: DEFAULT_SEED,
        }
    }
}
