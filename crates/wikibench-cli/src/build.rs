//! The `build` subcommand: dump in, labeled collection out.
//!
//! Pipeline: ingest -> link-derived judgments -> clean + removal cascade ->
//! partition -> write documents/queries/qrels, then optionally produce BM25
//! baseline runs and metrics for the validation and test splits.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use wikibench_core::{
    evaluate, ingest_jsonl, partition, trec, Analyzer, Bm25Index, Bm25Params, CollectionConfig,
    CorpusStore, DocId, LcgRng, LinkScope, QueryId, QuerySource, Ranker, RelevanceSet, SplitSpec,
    DEFAULT_CUTOFFS,
};

use crate::output;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// JSON-lines dump with one {"title", "text"} article per line
    #[arg(long)]
    input: PathBuf,

    /// Directory the collection is written to (created if missing)
    #[arg(long)]
    output_dir: PathBuf,

    /// Seed for the partition shuffle and negative sampling
    #[arg(long, default_value_t = wikibench_core::config::DEFAULT_SEED)]
    seed: u64,

    /// Stop after ingesting this many documents
    #[arg(long)]
    max_docs: Option<usize>,

    /// Truncate cleaned documents to this many tokens
    #[arg(long, default_value_t = wikibench_core::config::DEFAULT_MAX_DOC_TOKENS)]
    max_doc_tokens: usize,

    /// Truncate queries to this many tokens
    #[arg(long, default_value_t = wikibench_core::config::DEFAULT_MAX_QUERY_TOKENS)]
    max_query_tokens: usize,

    /// Drop documents with fewer cleaned tokens than this
    #[arg(long, default_value_t = wikibench_core::config::DEFAULT_MIN_DOC_TOKENS)]
    min_doc_tokens: usize,

    /// Minimum inbound-link judgments for a query to survive
    #[arg(long, default_value_t = wikibench_core::config::DEFAULT_MIN_REL_DOCS)]
    min_rel_docs: usize,

    /// Only count links appearing before the first sentence boundary
    #[arg(long)]
    first_sentence_links: bool,

    /// Derive query text from the first sentence instead of the title
    #[arg(long)]
    first_sentence_queries: bool,

    /// Keep stop words when indexing
    #[arg(long)]
    keep_stopwords: bool,

    /// Skip Porter stemming when indexing
    #[arg(long)]
    no_stem: bool,

    /// Fraction of judged queries assigned to train
    #[arg(long, default_value_t = 0.8, conflicts_with_all = ["validation_queries", "test_queries"])]
    train_part: f64,

    /// Fraction of judged queries assigned to validation
    #[arg(long, default_value_t = 0.1, conflicts_with_all = ["validation_queries", "test_queries"])]
    validation_part: f64,

    /// Fraction of judged queries assigned to test
    #[arg(long, default_value_t = 0.1, conflicts_with_all = ["validation_queries", "test_queries"])]
    test_part: f64,

    /// Exact validation size (remainder after test becomes train)
    #[arg(long, requires = "test_queries")]
    validation_queries: Option<usize>,

    /// Exact test size (remainder after validation becomes train)
    #[arg(long, requires = "validation_queries")]
    test_queries: Option<usize>,

    /// Sampled level-0 judgments appended per query (0 = none)
    #[arg(long, default_value_t = 0)]
    negatives: usize,

    /// Produce BM25 baseline runs and metrics for validation and test
    #[arg(long)]
    bm25: bool,

    /// Result-list depth for BM25 runs
    #[arg(long, default_value_t = 100)]
    run_depth: usize,

    /// BM25 k1
    #[arg(long, default_value_t = wikibench_core::config::DEFAULT_BM25_K1)]
    k1: f32,

    /// BM25 b
    #[arg(long, default_value_t = wikibench_core::config::DEFAULT_BM25_B)]
    b: f32,
}

impl BuildArgs {
    fn collection_config(&self) -> CollectionConfig {
        CollectionConfig {
            max_docs: self.max_docs,
            max_doc_tokens: self.max_doc_tokens,
            max_query_tokens: self.max_query_tokens,
            min_doc_tokens: self.min_doc_tokens,
            min_rel_docs: self.min_rel_docs,
            link_scope: if self.first_sentence_links {
                LinkScope::FirstSentence
            } else {
                LinkScope::FullDocument
            },
            query_source: if self.first_sentence_queries {
                QuerySource::FirstSentence
            } else {
                QuerySource::Title
            },
            remove_stopwords: !self.keep_stopwords,
            stem: !self.no_stem,
            seed: self.seed,
        }
    }

    fn split_spec(&self) -> SplitSpec {
        match (self.validation_queries, self.test_queries) {
            (Some(validation), Some(test)) => SplitSpec::Counts { validation, test },
            _ => SplitSpec::Proportions {
                train: self.train_part,
                validation: self.validation_part,
                test: self.test_part,
            },
        }
    }
}

#[derive(Serialize)]
struct QueryRecord<'a> {
    id: QueryId,
    text: &'a str,
}

pub fn run(args: BuildArgs) -> Result<()> {
    let config = args.collection_config();
    let spec = args.split_spec();

    eprintln!("Reading {}...", args.input.display());
    let (store, stats) = ingest_jsonl(&args.input, &config)
        .with_context(|| format!("ingesting {}", args.input.display()))?;
    if stats.skipped > 0 {
        eprintln!("  skipped {} malformed records", stats.skipped);
    }

    eprintln!("Extracting links and building qrels...");
    let rels = RelevanceSet::build(&store, &config);

    eprintln!("Cleaning documents and building queries...");
    let (store, removed) = store.clean(&config);
    let removed: HashSet<DocId> = removed.into_iter().collect();
    let mut rels = rels
        .cascade_removals(&removed, config.min_rel_docs)
        .retain_queries(|q| store.query_text(q).is_some());

    if args.negatives > 0 {
        let candidates: Vec<DocId> = store.documents().iter().map(|d| d.id).collect();
        let mut rng = LcgRng::new(config.seed);
        rels.sample_negatives(&candidates, args.negatives, &mut rng);
    }

    // Validated before anything is written.
    let partitions = partition(&rels.query_ids(), &spec, config.seed)?;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    eprintln!("Saving documents...");
    write_documents(&args.output_dir, &store)?;

    for (name, ids) in partitions.named() {
        write_queries(&args.output_dir, name, ids, &store)?;
        write_split_qrels(&args.output_dir, name, ids, &rels)?;
    }

    eprintln!(
        "Collection: {} documents, {} judged queries ({} train / {} validation / {} test)",
        store.len(),
        rels.len(),
        partitions.train.len(),
        partitions.validation.len(),
        partitions.test.len(),
    );

    if args.bm25 {
        let analyzer = Analyzer::from_config(&config);
        let params = Bm25Params {
            k1: args.k1,
            b: args.b,
        };
        let index = Bm25Index::build(&store, analyzer, params)?;
        eprintln!(
            "BM25 index: {} terms over {} documents (avgdl {:.1})",
            index.term_count(),
            index.doc_count(),
            index.avg_doc_len(),
        );

        // Baseline runs for the held-out splits only; train queries are
        // consumed by downstream model training, not ranked here.
        for (name, ids) in &partitions.named()[1..] {
            run_bm25_split(&args.output_dir, name, ids, &store, &index, &rels, args.run_depth)?;
        }
    }

    Ok(())
}

fn write_documents(dir: &Path, store: &CorpusStore) -> Result<()> {
    let path = dir.join("documents.json");
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), store.documents())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn write_queries(dir: &Path, split: &str, ids: &[QueryId], store: &CorpusStore) -> Result<()> {
    let records: Vec<QueryRecord> = ids
        .iter()
        .filter_map(|&id| store.query_text(id).map(|text| QueryRecord { id, text }))
        .collect();

    let path = dir.join(format!("{split}.queries.json"));
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &records)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn write_split_qrels(dir: &Path, split: &str, ids: &[QueryId], rels: &RelevanceSet) -> Result<()> {
    let subset = split_qrels(ids, rels);
    let path = dir.join(format!("{split}.qrel"));
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    trec::write_qrels(BufWriter::new(file), &subset)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// The relevance subset for one partition.
fn split_qrels(ids: &[QueryId], rels: &RelevanceSet) -> RelevanceSet {
    RelevanceSet::from_triples(ids.iter().flat_map(|&query_id| {
        rels.judgments(query_id)
            .unwrap_or_default()
            .iter()
            .map(move |j| (query_id, j.doc_id, j.level))
    }))
}

#[allow(clippy::too_many_arguments)]
fn run_bm25_split(
    dir: &Path,
    split: &str,
    ids: &[QueryId],
    store: &CorpusStore,
    index: &Bm25Index,
    rels: &RelevanceSet,
    depth: usize,
) -> Result<()> {
    let queries: Vec<(QueryId, &str)> = ids
        .iter()
        .filter_map(|&id| store.query_text(id).map(|text| (id, text)))
        .collect();

    let pb = ProgressBar::new(queries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")
            .expect("valid progress template"),
    );
    pb.set_message(format!("Ranking {split}"));

    let results: Vec<(QueryId, Vec<(DocId, f32)>)> = queries
        .par_iter()
        .map(|(query_id, text)| {
            let ranked = index.rank(text, depth);
            pb.inc(1);
            (*query_id, ranked)
        })
        .collect();
    pb.finish();

    let run_path = dir.join(format!("{split}.bm25.run"));
    let file =
        File::create(&run_path).with_context(|| format!("creating {}", run_path.display()))?;
    trec::write_run(BufWriter::new(file), &results, "bm25")
        .with_context(|| format!("writing {}", run_path.display()))?;

    let subset = split_qrels(ids, rels);
    let report = evaluate(&results, &subset, DEFAULT_CUTOFFS);

    let metrics_path = dir.join(format!("{split}.bm25.metrics.json"));
    let file = File::create(&metrics_path)
        .with_context(|| format!("creating {}", metrics_path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report)
        .with_context(|| format!("writing {}", metrics_path.display()))?;
    writer.flush()?;

    eprintln!("BM25 on {split}:");
    output::print_report(&report);
    Ok(())
}
