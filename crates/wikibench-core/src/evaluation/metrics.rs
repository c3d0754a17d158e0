//! Per-query retrieval metrics.
//!
//! Binary relevance (level >= 1) drives precision, recall, and average
//! precision; NDCG uses the raw graded level as gain. All functions take a
//! ranked result list (best first) and the query's judgment list.
//!
//! # References
//!
//! - Järvelin & Kekäläinen (2002). "Cumulated gain-based evaluation of IR techniques"
//! - Voorhees & Harman (2005). "TREC: Experiment and Evaluation in Information Retrieval"

use std::collections::{HashMap, HashSet};

use crate::judgments::Judgment;
use crate::types::DocId;

/// Computes Precision@k: the fraction of the top k results that are
/// relevant.
pub fn precision_at_k(results: &[(DocId, f32)], judgments: &[Judgment], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let rel_set = relevant_set(judgments);
    let hits = results
        .iter()
        .take(k)
        .filter(|(id, _)| rel_set.contains(id))
        .count();
    hits as f64 / k as f64
}

/// Computes Recall@k: the fraction of all relevant documents found in the
/// top k results. Returns 0.0 when the query has no relevant judgments;
/// aggregation excludes such queries instead of averaging the zero in.
pub fn recall_at_k(results: &[(DocId, f32)], judgments: &[Judgment], k: usize) -> f64 {
    let rel_set = relevant_set(judgments);
    if rel_set.is_empty() {
        return 0.0;
    }
    let hits = results
        .iter()
        .take(k)
        .filter(|(id, _)| rel_set.contains(id))
        .count();
    hits as f64 / rel_set.len() as f64
}

/// Computes Average Precision: the mean of Precision@i over every rank i
/// holding a relevant document, divided by the total relevant count.
/// Returns 0.0 when the query has no relevant judgments.
pub fn average_precision(results: &[(DocId, f32)], judgments: &[Judgment]) -> f64 {
    let rel_set = relevant_set(judgments);
    if rel_set.is_empty() {
        return 0.0;
    }

    let mut precision_sum = 0.0;
    let mut relevant_found = 0usize;
    for (i, (doc_id, _)) in results.iter().enumerate() {
        if rel_set.contains(doc_id) {
            relevant_found += 1;
            precision_sum += relevant_found as f64 / (i + 1) as f64;
        }
    }

    precision_sum / rel_set.len() as f64
}

/// Computes NDCG@k with exponential gain (2^level - 1) and log2 discount.
///
/// The ideal DCG comes from the judgment levels sorted descending. Returns
/// 0.0 when nothing in the judgment set carries gain; aggregation excludes
/// such queries.
pub fn ndcg_at_k(results: &[(DocId, f32)], judgments: &[Judgment], k: usize) -> f64 {
    let level_map: HashMap<DocId, u8> =
        judgments.iter().map(|j| (j.doc_id, j.level)).collect();

    let dcg: f64 = results
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, (doc_id, _))| {
            let level = level_map.get(doc_id).copied().unwrap_or(0);
            gain(level) / discount(i + 1)
        })
        .sum();

    let mut ideal_levels: Vec<u8> = judgments.iter().map(|j| j.level).collect();
    ideal_levels.sort_by(|a, b| b.cmp(a));
    let idcg: f64 = ideal_levels
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, &level)| gain(level) / discount(i + 1))
        .sum();

    if idcg == 0.0 {
        0.0
    } else {
        dcg / idcg
    }
}

/// Exponential gain: level 0 -> 0, level 1 -> 1, level 2 -> 3.
#[inline]
fn gain(level: u8) -> f64 {
    (1u32 << level) as f64 - 1.0
}

/// Logarithmic discount for a 1-indexed rank.
#[inline]
fn discount(rank: usize) -> f64 {
    (rank as f64 + 1.0).log2()
}

fn relevant_set(judgments: &[Judgment]) -> HashSet<DocId> {
    judgments
        .iter()
        .filter(|j| j.is_relevant())
        .map(|j| j.doc_id)
        .collect()
}
