//! JSON-lines corpus ingestion.
//!
//! The dump format is one JSON object per line with `title` and `text`
//! string fields, already deduplicated by title. Line order establishes the
//! dense id assignment. Records missing either field are skipped and
//! counted; lines that are not valid JSON abort ingestion with the line
//! number.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::CollectionConfig;
use crate::error::IngestError;
use crate::types::{DocId, Document};

use super::CorpusStore;

#[derive(Debug, Deserialize)]
struct ArticleRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Counters reported after ingestion.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestStats {
    /// Documents accepted into the store.
    pub ingested: usize,
    /// Records skipped for missing fields or duplicate titles.
    pub skipped: usize,
}

/// Reads a JSON-lines dump into a [`CorpusStore`].
///
/// Stops early once `config.max_docs` documents have been accepted.
pub fn ingest_jsonl(
    path: &Path,
    config: &CollectionConfig,
) -> Result<(CorpusStore, IngestStats), IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut documents = Vec::new();
    let mut seen_titles = std::collections::HashSet::new();
    let mut stats = IngestStats::default();

    for (line_idx, line) in reader.lines().enumerate() {
        if let Some(max) = config.max_docs {
            if documents.len() >= max {
                break;
            }
        }

        let line = line.map_err(|source| IngestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let record: ArticleRecord =
            serde_json::from_str(&line).map_err(|source| IngestError::Json {
                path: path.display().to_string(),
                line: line_idx + 1,
                source,
            })?;

        let (title, text) = match (record.title, record.text) {
            (Some(title), Some(text)) if !title.is_empty() => (title, text),
            _ => {
                warn!(line = line_idx + 1, "skipping record with missing fields");
                stats.skipped += 1;
                continue;
            }
        };

        if !seen_titles.insert(title.clone()) {
            warn!(line = line_idx + 1, title = %title, "skipping duplicate title");
            stats.skipped += 1;
            continue;
        }

        let id = DocId::from_u32(documents.len() as u32);
        documents.push(Document {
            id,
            title,
            raw: text,
            text: String::new(),
        });
    }

    stats.ingested = documents.len();
    info!(
        ingested = stats.ingested,
        skipped = stats.skipped,
        "ingested corpus dump"
    );

    Ok((CorpusStore::from_documents(documents), stats))
}
