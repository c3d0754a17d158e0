//! Error types for wikibench-core.
//!
//! Three families cover the pipeline: configuration errors (fatal before any
//! work starts), ingestion errors, and format errors for qrel/run files.
//! Unresolved links and cleaning removals are not errors; they are documented
//! non-match/removal cases handled by the judgment builder and the corpus
//! cleaning cascade.

use thiserror::Error;

/// Errors raised while validating configuration, before any file is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A split proportion is outside [0, 1]
    #[error("Split proportion out of range: {name} = {value}")]
    ProportionOutOfRange { name: &'static str, value: f64 },
    /// Split proportions sum to more than 1.0
    #[error("Split proportions sum to {0}, which exceeds 1.0")]
    ProportionsExceedOne(f64),
    /// Fixed split counts exceed the number of judged queries
    #[error("Split counts need {required} queries but only {available} are judged")]
    CountsExceedQueries { required: usize, available: usize },
    /// BM25 parameters must be non-negative
    #[error("Invalid BM25 parameter: {name} = {value}")]
    InvalidBm25Param { name: &'static str, value: f32 },
}

/// Errors raised while ingesting a JSON-lines corpus dump.
#[derive(Debug, Error)]
pub enum IngestError {
    /// I/O failure reading the dump
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A line that is not valid JSON
    #[error("{path}:{line}: invalid JSON record: {source}")]
    Json {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while parsing or writing qrel and run files.
#[derive(Debug, Error)]
pub enum FormatError {
    /// I/O failure on the file
    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A line with the wrong number of fields
    #[error("{path}:{line}: expected {expected} fields, got {got}")]
    FieldCount {
        path: String,
        line: usize,
        expected: usize,
        got: usize,
    },
    /// A field that does not parse as the expected type
    #[error("{path}:{line}: invalid {field} value '{value}'")]
    FieldValue {
        path: String,
        line: usize,
        field: &'static str,
        value: String,
    },
}
