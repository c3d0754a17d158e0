//! TREC run and qrel file formats.
//!
//! These two line shapes are de facto external protocol, reproduced exactly
//! for compatibility with third-party evaluation tools:
//!
//! ```text
//! run:  <query_id> Q0 <doc_id> <rank> <score> <run_tag>
//! qrel: <query_id> 0 <doc_id> <relevance_level>
//! ```
//!
//! Writing then re-parsing reproduces the underlying triples; the literal
//! `Q0`/`0` columns carry no information. Parsers accept any whitespace
//! separation and report the offending line on malformed input.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::error::FormatError;
use crate::judgments::RelevanceSet;
use crate::types::{DocId, QueryId, RankedList};

/// Writes ranked results as TREC run lines, ranks starting at 1.
pub fn write_run<W: Write>(
    mut w: W,
    results: &[(QueryId, RankedList)],
    run_tag: &str,
) -> io::Result<()> {
    for (query_id, ranked) in results {
        for (rank, (doc_id, score)) in ranked.iter().enumerate() {
            writeln!(w, "{query_id} Q0 {doc_id} {} {score} {run_tag}", rank + 1)?;
        }
    }
    Ok(())
}

/// Reads a TREC run file, grouping lines by query.
///
/// Within each query the entries are ordered by their rank column, so an
/// unsorted run file still evaluates correctly. Queries come back in
/// ascending id order.
pub fn read_run(path: &Path) -> Result<Vec<(QueryId, RankedList)>, FormatError> {
    let file = File::open(path).map_err(|source| FormatError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut by_query: std::collections::BTreeMap<QueryId, Vec<(u32, DocId, f32)>> =
        std::collections::BTreeMap::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| FormatError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FormatError::FieldCount {
                path: path.display().to_string(),
                line: line_idx + 1,
                expected: 6,
                got: fields.len(),
            });
        }

        let query_id = parse_field::<u32>(fields[0], "query id", path, line_idx)?;
        let doc_id = parse_field::<u32>(fields[2], "doc id", path, line_idx)?;
        let rank = parse_field::<u32>(fields[3], "rank", path, line_idx)?;
        let score = parse_field::<f32>(fields[4], "score", path, line_idx)?;

        by_query
            .entry(DocId::from_u32(query_id))
            .or_default()
            .push((rank, DocId::from_u32(doc_id), score));
    }

    Ok(by_query
        .into_iter()
        .map(|(query_id, mut entries)| {
            entries.sort_by_key(|(rank, _, _)| *rank);
            let ranked = entries
                .into_iter()
                .map(|(_, doc_id, score)| (doc_id, score))
                .collect();
            (query_id, ranked)
        })
        .collect())
}

/// Writes a relevance set as tab-separated TREC qrel lines.
pub fn write_qrels<W: Write>(mut w: W, qrels: &RelevanceSet) -> io::Result<()> {
    for (query_id, judgments) in qrels.iter() {
        for judgment in judgments {
            writeln!(w, "{query_id}\t0\t{}\t{}", judgment.doc_id, judgment.level)?;
        }
    }
    Ok(())
}

/// Reads a TREC qrel file into a relevance set.
pub fn read_qrels(path: &Path) -> Result<RelevanceSet, FormatError> {
    let file = File::open(path).map_err(|source| FormatError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut triples = Vec::new();
    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| FormatError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(FormatError::FieldCount {
                path: path.display().to_string(),
                line: line_idx + 1,
                expected: 4,
                got: fields.len(),
            });
        }

        let query_id = parse_field::<u32>(fields[0], "query id", path, line_idx)?;
        let doc_id = parse_field::<u32>(fields[2], "doc id", path, line_idx)?;
        let level = parse_field::<u8>(fields[3], "relevance level", path, line_idx)?;

        triples.push((DocId::from_u32(query_id), DocId::from_u32(doc_id), level));
    }

    Ok(RelevanceSet::from_triples(triples))
}

fn parse_field<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    path: &Path,
    line_idx: usize,
) -> Result<T, FormatError> {
    value.parse().map_err(|_| FormatError::FieldValue {
        path: path.display().to_string(),
        line: line_idx + 1,
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn id(n: u32) -> DocId {
        DocId::from_u32(n)
    }

    #[test]
    fn test_run_round_trip() {
        let results = vec![
            (id(1), vec![(id(10), 2.5f32), (id(11), 1.25)]),
            (id(2), vec![(id(12), 0.5f32)]),
        ];

        let mut buf = Vec::new();
        write_run(&mut buf, &results, "bm25").unwrap();

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&buf).unwrap();
        let parsed = read_run(file.path()).unwrap();

        assert_eq!(parsed, results);
    }

    #[test]
    fn test_run_line_shape() {
        let results = vec![(id(3), vec![(id(7), 1.5f32)])];
        let mut buf = Vec::new();
        write_run(&mut buf, &results, "bm25").unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "3 Q0 7 1 1.5 bm25\n");
    }

    #[test]
    fn test_run_ranks_sorted_on_read() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1 Q0 20 2 0.5 tag").unwrap();
        writeln!(file, "1 Q0 10 1 0.9 tag").unwrap();

        let parsed = read_run(file.path()).unwrap();
        assert_eq!(parsed[0].1[0].0, id(10));
        assert_eq!(parsed[0].1[1].0, id(20));
    }

    #[test]
    fn test_qrel_round_trip() {
        let qrels = RelevanceSet::from_triples(vec![
            (id(1), id(1), 2),
            (id(1), id(4), 1),
            (id(6), id(6), 2),
            (id(6), id(9), 0),
        ]);

        let mut buf = Vec::new();
        write_qrels(&mut buf, &qrels).unwrap();

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&buf).unwrap();
        let parsed = read_qrels(file.path()).unwrap();

        assert_eq!(parsed, qrels);
    }

    #[test]
    fn test_qrel_line_shape() {
        let qrels = RelevanceSet::from_triples(vec![(id(5), id(5), 2)]);
        let mut buf = Vec::new();
        write_qrels(&mut buf, &qrels).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "5\t0\t5\t2\n");
    }

    #[test]
    fn test_short_line_rejected_with_line_number() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1 0 2 1").unwrap();
        writeln!(file, "1 0 3").unwrap();

        let err = read_qrels(file.path()).unwrap_err();
        match err {
            FormatError::FieldCount { line, got, .. } => {
                assert_eq!(line, 2);
                assert_eq!(got, 3);
            }
            other => panic!("expected FieldCount, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_level_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1 0 2 high").unwrap();

        let err = read_qrels(file.path()).unwrap_err();
        assert!(matches!(
            err,
            FormatError::FieldValue {
                field: "relevance level",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_score_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1 Q0 2 1 abc tag").unwrap();

        let err = read_run(file.path()).unwrap_err();
        assert!(matches!(err, FormatError::FieldValue { field: "score", .. }));
    }

    #[test]
    fn test_empty_qrel_file() {
        let file = NamedTempFile::new().unwrap();
        let parsed = read_qrels(file.path()).unwrap();
        assert!(parsed.is_empty());
    }
}
