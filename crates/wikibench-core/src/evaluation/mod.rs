//! Evaluation engine: ranked results vs. relevance judgments.
//!
//! Per-query metrics live in [`metrics`]; statistical comparison helpers in
//! [`stats`]. This module aggregates per-query values into a
//! [`MetricReport`]: the unweighted mean of each metric over every query
//! that (a) appears in both the ranked results and the judgment set and
//! (b) has at least one relevant judgment. Queries failing either condition
//! are excluded from the averages, never scored as zero.

pub mod metrics;
pub mod stats;

pub use metrics::{average_precision, ndcg_at_k, precision_at_k, recall_at_k};
pub use stats::{bootstrap_ci, paired_ttest, BootstrapResult, TTestResult};

use std::collections::BTreeMap;

use serde::Serialize;

use crate::judgments::RelevanceSet;
use crate::types::{QueryId, RankedList};

/// Rank cutoffs reported by default.
pub const DEFAULT_CUTOFFS: &[usize] = &[5, 10, 20, 100];

/// Aggregated metric values keyed by TREC-eval style names
/// (`P_10`, `recall_20`, `ndcg_cut_5`, `map`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricReport {
    values: BTreeMap<String, f64>,
    /// Number of queries contributing to the averages.
    query_count: usize,
}

impl MetricReport {
    /// Value for a metric name, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// (name, value) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of queries that entered the averages.
    pub fn query_count(&self) -> usize {
        self.query_count
    }

    /// Returns true when no query could be evaluated.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Computes every metric for a single query's ranked list.
fn query_metrics(
    ranked: &RankedList,
    judgments: &[crate::judgments::Judgment],
    cutoffs: &[usize],
) -> BTreeMap<String, f64> {
    let mut values = BTreeMap::new();
    for &k in cutoffs {
        values.insert(format!("P_{k}"), precision_at_k(ranked, judgments, k));
        values.insert(format!("recall_{k}"), recall_at_k(ranked, judgments, k));
        values.insert(format!("ndcg_cut_{k}"), ndcg_at_k(ranked, judgments, k));
    }
    values.insert("map".to_string(), average_precision(ranked, judgments));
    values
}

/// Per-query metric table for every evaluated query.
///
/// Only queries present in both the results and the judgment set, with at
/// least one relevant judgment, are included. The outer map is keyed by
/// query id, the inner by metric name.
pub fn evaluate_per_query(
    results: &[(QueryId, RankedList)],
    qrels: &RelevanceSet,
    cutoffs: &[usize],
) -> BTreeMap<QueryId, BTreeMap<String, f64>> {
    let mut table = BTreeMap::new();
    for (query_id, ranked) in results {
        let Some(judgments) = qrels.judgments(*query_id) else {
            continue;
        };
        if !judgments.iter().any(|j| j.is_relevant()) {
            continue;
        }
        table.insert(*query_id, query_metrics(ranked, judgments, cutoffs));
    }
    table
}

/// Aggregates ranked results against judgments into a [`MetricReport`].
///
/// An empty judgment set (or a run sharing no queries with it) yields an
/// empty report.
pub fn evaluate(
    results: &[(QueryId, RankedList)],
    qrels: &RelevanceSet,
    cutoffs: &[usize],
) -> MetricReport {
    let per_query = evaluate_per_query(results, qrels, cutoffs);
    let query_count = per_query.len();
    if query_count == 0 {
        return MetricReport::default();
    }

    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for metrics in per_query.values() {
        for (name, value) in metrics {
            *sums.entry(name.clone()).or_insert(0.0) += value;
        }
    }

    let values = sums
        .into_iter()
        .map(|(name, sum)| (name, sum / query_count as f64))
        .collect();

    MetricReport {
        values,
        query_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgments::RelevanceSet;
    use crate::types::DocId;

    fn id(n: u32) -> DocId {
        DocId::from_u32(n)
    }

    fn qrels() -> RelevanceSet {
        RelevanceSet::from_triples(vec![
            (id(1), id(1), 2),
            (id(1), id(5), 1),
            (id(2), id(2), 2),
        ])
    }

    #[test]
    fn test_evaluate_aggregates_mean() {
        let results = vec![
            (id(1), vec![(id(1), 2.0f32), (id(5), 1.0)]),
            (id(2), vec![(id(9), 2.0f32), (id(2), 1.0)]),
        ];
        let report = evaluate(&results, &qrels(), &[5]);

        assert_eq!(report.query_count(), 2);
        // Query 1: P@5 = 2/5; query 2: P@5 = 1/5.
        assert!((report.get("P_5").unwrap() - 0.3).abs() < 1e-9);
        assert!(report.get("map").is_some());
        assert!(report.get("ndcg_cut_5").is_some());
        assert!(report.get("recall_5").is_some());
    }

    #[test]
    fn test_queries_missing_from_run_are_excluded() {
        let results = vec![(id(1), vec![(id(1), 1.0f32)])];
        let report = evaluate(&results, &qrels(), &[5]);

        assert_eq!(report.query_count(), 1);
        // Perfect single hit of the top judgment: recall@5 = 1/2 for query 1 only.
        assert!((report.get("recall_5").unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_queries_missing_from_qrels_are_excluded() {
        let results = vec![
            (id(1), vec![(id(1), 1.0f32)]),
            (id(99), vec![(id(1), 1.0f32)]),
        ];
        let report = evaluate(&results, &qrels(), &[5]);
        assert_eq!(report.query_count(), 1);
    }

    #[test]
    fn test_zero_relevant_query_excluded() {
        let qrels = RelevanceSet::from_triples(vec![
            (id(1), id(1), 2),
            (id(3), id(7), 0), // only a sampled negative
        ]);
        let results = vec![
            (id(1), vec![(id(1), 1.0f32)]),
            (id(3), vec![(id(7), 1.0f32)]),
        ];
        let report = evaluate(&results, &qrels, &[5]);

        assert_eq!(report.query_count(), 1);
        assert!((report.get("P_5").unwrap() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_empty_qrels_yield_empty_report() {
        let results = vec![(id(1), vec![(id(1), 1.0f32)])];
        let report = evaluate(&results, &RelevanceSet::default(), &[5]);

        assert!(report.is_empty());
        assert_eq!(report.query_count(), 0);
    }

    #[test]
    fn test_per_query_table_keys() {
        let results = vec![(id(1), vec![(id(1), 1.0f32)])];
        let table = evaluate_per_query(&results, &qrels(), &[5, 10]);

        let metrics = &table[&id(1)];
        assert!(metrics.contains_key("P_5"));
        assert!(metrics.contains_key("P_10"));
        assert!(metrics.contains_key("ndcg_cut_10"));
        assert!(metrics.contains_key("recall_10"));
        assert!(metrics.contains_key("map"));
    }
}
