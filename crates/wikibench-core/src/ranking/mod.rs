//! Ranking models.
//!
//! The [`Ranker`] trait is the integration point between retrieval models
//! and the evaluation engine: anything that can turn a query into an ordered
//! (document, score) list can be evaluated. [`Bm25Index`] is the reference
//! implementation and the collection baseline.

pub mod analyze;
pub mod bm25;

pub use analyze::Analyzer;
pub use bm25::{Bm25Index, Bm25Params};

use rayon::prelude::*;

use crate::types::{QueryId, RankedList};

/// A ranking model: given query text, produce the top-k documents with
/// scores, best first.
pub trait Ranker {
    /// Ranks up to `k` documents for the query. Scores are only meaningful
    /// for ordering. A query with no recognizable terms yields an empty
    /// list.
    fn rank(&self, query: &str, k: usize) -> RankedList;
}

/// Ranks a batch of queries in parallel.
///
/// Per-query ranking is independent, so the query set is fanned out across
/// the rayon pool; the ranker is shared immutably. Result order matches the
/// input order.
pub fn rank_all<R: Ranker + Sync>(
    ranker: &R,
    queries: &[(QueryId, String)],
    k: usize,
) -> Vec<(QueryId, RankedList)> {
    queries
        .par_iter()
        .map(|(query_id, text)| (*query_id, ranker.rank(text, k)))
        .collect()
}
