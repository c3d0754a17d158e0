use serde::{Deserialize, Serialize};

/// Unique document identifier.
///
/// Ids are dense and assigned in corpus ingestion order, so the id doubles
/// as the document's insertion rank. Queries share this id space: a query is
/// always derived from the document with the same id.
///
/// # Examples
///
/// ```ignore
/// let id = DocId::from_u32(7);
/// assert_eq!(id.as_u32(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(u32);

impl DocId {
    /// Creates a DocId from a raw u32 value.
    pub fn from_u32(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw u32 value of this id.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Query identifier. Queries and documents share one id space.
pub type QueryId = DocId;

/// A document after ingestion.
///
/// `raw` keeps the original markup until judgment extraction has run (links
/// live in the markup); `text` holds the cleaned, lowercased, token-joined
/// body used for indexing. Immutable once cleaning has produced the final
/// corpus snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Dense id assigned at ingestion.
    pub id: DocId,
    /// Article title, unique within the corpus.
    pub title: String,
    /// Original text including markup. Emptied after cleaning.
    #[serde(skip)]
    pub raw: String,
    /// Cleaned text: lowercase alphabetic tokens joined by single spaces.
    pub text: String,
}

impl Document {
    /// Number of whitespace tokens in the cleaned text.
    pub fn token_count(&self) -> usize {
        if self.text.is_empty() {
            0
        } else {
            self.text.split(' ').count()
        }
    }
}

/// A ranked result list for one query: (document, score) pairs in
/// descending score order, ties broken by ascending document id.
pub type RankedList = Vec<(DocId, f32)>;
