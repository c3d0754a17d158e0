//! # wikibench-core
//!
//! Library for building information-retrieval benchmark collections from
//! encyclopedic JSON-lines dumps and evaluating ranking models against them.
//!
//! The pipeline runs leaf-first over immutable snapshots:
//!
//! 1. [`corpus`] — ingest the dump, clean document text, derive query text.
//! 2. [`judgments`] — invert the hyperlink graph into graded relevance
//!    judgments and cascade cleaning removals through them.
//! 3. [`split`] — seeded, reproducible train/validation/test partitions.
//! 4. [`ranking`] — the BM25 baseline index behind the [`ranking::Ranker`]
//!    trait any scorer can implement.
//! 5. [`evaluation`] — TREC-style effectiveness metrics plus statistical
//!    comparison helpers.
//!
//! [`trec`] reproduces the TREC run/qrel wire formats for interop with
//! third-party evaluation tools. Randomness (partition shuffle, negative
//! sampling, bootstrap) always flows through the explicit seeded generator
//! in [`rng`].

pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod judgments;
pub mod ranking;
pub mod rng;
pub mod split;
pub mod trec;
pub mod types;

pub use config::{CollectionConfig, LinkScope, QuerySource};
pub use corpus::{ingest_jsonl, CorpusStore};
pub use error::{ConfigError, FormatError, IngestError};
pub use evaluation::{evaluate, MetricReport, DEFAULT_CUTOFFS};
pub use judgments::{Judgment, RelevanceSet};
pub use ranking::{rank_all, Analyzer, Bm25Index, Bm25Params, Ranker};
pub use rng::LcgRng;
pub use split::{partition, Partitions, SplitSpec};
pub use types::{DocId, Document, QueryId, RankedList};
